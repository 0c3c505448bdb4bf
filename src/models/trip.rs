use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{db::DbPool, error::AppError};

/// Stored shape of a trip. `car_id` is set by the server from the request
/// path, never taken from the client body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub description: String,
    pub car_id: i64,
}

/// Fields a client supplies when adding a trip to a car. Any `car_id` in the
/// body is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripInput {
    pub start: i64,
    pub end: i64,
    pub description: String,
}

/// Trip as nested under a car; the owning car is implied by context.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripOutput {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub description: String,
}

impl From<Trip> for TripOutput {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            start: trip.start,
            end: trip.end,
            description: trip.description,
        }
    }
}

impl Trip {
    pub async fn create(pool: &DbPool, car_id: i64, input: &TripInput) -> Result<Trip, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            "INSERT INTO trip (start, \"end\", description, car_id) VALUES (?, ?, ?, ?) \
             RETURNING id, start, \"end\", description, car_id",
        )
        .bind(input.start)
        .bind(input.end)
        .bind(&input.description)
        .bind(car_id)
        .fetch_one(pool)
        .await?;
        Ok(trip)
    }

    pub async fn for_car(pool: &DbPool, car_id: i64) -> Result<Vec<TripOutput>, AppError> {
        let trips = sqlx::query_as::<_, TripOutput>(
            "SELECT id, start, \"end\", description FROM trip WHERE car_id = ? ORDER BY id",
        )
        .bind(car_id)
        .fetch_all(pool)
        .await?;
        Ok(trips)
    }
}
