use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        car::{Car, CarFilter, CarInput, CarOutput},
        trip::{Trip, TripInput},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/:id", get(get_car).delete(delete_car).put(update_car))
        .route("/:car_id/trips", post(add_trip))
}

async fn list_cars(
    State(state): State<AppState>,
    Query(filter): Query<CarFilter>,
) -> Result<Json<Vec<CarOutput>>, AppError> {
    let cars = Car::list(&state.db, &filter).await?;
    let mut output = Vec::with_capacity(cars.len());
    for car in cars {
        output.push(car.into_output(&state.db).await?);
    }
    Ok(Json(output))
}

async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CarOutput>, AppError> {
    let car = Car::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no car with id={id}")))?;
    Ok(Json(car.into_output(&state.db).await?))
}

async fn create_car(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<CarInput>,
) -> Result<Json<Car>, AppError> {
    let car = Car::create(&state.db, &input).await?;
    info!(car_id = car.id, user = %current.0.username, "car created");
    Ok(Json(car))
}

async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if Car::delete(&state.db, id).await? {
        info!(car_id = id, "car deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no car with id={id}")))
    }
}

async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CarInput>,
) -> Result<Json<Car>, AppError> {
    let car = Car::update(&state.db, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no car with id={id}")))?;
    Ok(Json(car))
}

async fn add_trip(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    Json(input): Json<TripInput>,
) -> Result<Json<Trip>, AppError> {
    // The parent must exist; the trip's car_id always comes from the path.
    Car::find(&state.db, car_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no car with id={car_id}")))?;
    let trip = Trip::create(&state.db, car_id, &input).await?;
    Ok(Json(trip))
}
