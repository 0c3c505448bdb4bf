use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db::DbPool,
    error::AppError,
    models::trip::{Trip, TripOutput},
};

/// Stored shape of a car, one row in the `car` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: i64,
    pub size: String,
    pub fuel: String,
    pub door: i64,
    pub transmission: String,
}

/// Fields a client supplies when creating or replacing a car.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarInput {
    pub size: String,
    #[serde(default = "default_fuel")]
    pub fuel: String,
    pub door: i64,
    #[serde(default = "default_transmission")]
    pub transmission: String,
}

fn default_fuel() -> String {
    "electric".to_string()
}

fn default_transmission() -> String {
    "auto".to_string()
}

/// API shape of a car: the stored fields plus its trips.
#[derive(Debug, Clone, Serialize)]
pub struct CarOutput {
    pub id: i64,
    pub size: String,
    pub fuel: String,
    pub door: i64,
    pub transmission: String,
    pub trips: Vec<TripOutput>,
}

/// Optional list filters; `door` is a lower bound, `size` an exact match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilter {
    pub size: Option<String>,
    pub door: Option<i64>,
}

impl Car {
    pub async fn list(pool: &DbPool, filter: &CarFilter) -> Result<Vec<Car>, AppError> {
        let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, size, fuel, door, transmission FROM car",
        );
        let mut joined = false;
        if let Some(size) = &filter.size {
            query.push(" WHERE size = ").push_bind(size.clone());
            joined = true;
        }
        if let Some(door) = filter.door {
            query.push(if joined { " AND " } else { " WHERE " });
            query.push("door >= ").push_bind(door);
        }
        query.push(" ORDER BY id");
        let cars = query.build_query_as::<Car>().fetch_all(pool).await?;
        Ok(cars)
    }

    pub async fn find(pool: &DbPool, id: i64) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "SELECT id, size, fuel, door, transmission FROM car WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(car)
    }

    pub async fn create(pool: &DbPool, input: &CarInput) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "INSERT INTO car (size, fuel, door, transmission) VALUES (?, ?, ?, ?) \
             RETURNING id, size, fuel, door, transmission",
        )
        .bind(&input.size)
        .bind(&input.fuel)
        .bind(input.door)
        .bind(&input.transmission)
        .fetch_one(pool)
        .await?;
        Ok(car)
    }

    /// Full replace of the four client-writable fields; id and trips stay put.
    pub async fn update(pool: &DbPool, id: i64, input: &CarInput) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "UPDATE car SET fuel = ?, transmission = ?, door = ?, size = ? WHERE id = ? \
             RETURNING id, size, fuel, door, transmission",
        )
        .bind(&input.fuel)
        .bind(&input.transmission)
        .bind(input.door)
        .bind(&input.size)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(car)
    }

    /// Deletes the car; its trips go with it via ON DELETE CASCADE.
    /// Returns false when no car had that id.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM car WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn into_output(self, pool: &DbPool) -> Result<CarOutput, AppError> {
        let trips = Trip::for_car(pool, self.id).await?;
        Ok(CarOutput {
            id: self.id,
            size: self.size,
            fuel: self.fuel,
            door: self.door,
            transmission: self.transmission,
            trips,
        })
    }
}
