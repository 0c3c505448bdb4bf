use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::car::{Car, CarFilter, CarOutput},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/search", post(search))
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate;

async fn home() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(HomeTemplate)
}

#[derive(Deserialize)]
struct SearchForm {
    size: String,
    doors: i64,
}

#[derive(Template)]
#[template(path = "search_results.html")]
struct SearchResultsTemplate {
    cars: Vec<CarOutput>,
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, AppError> {
    let filter = CarFilter {
        size: Some(form.size),
        door: Some(form.doors),
    };
    let cars = Car::list(&state.db, &filter).await?;
    let mut rows = Vec::with_capacity(cars.len());
    for car in cars {
        rows.push(car.into_output(&state.db).await?);
    }
    Ok(AskamaTemplateResponse::into_response(
        SearchResultsTemplate { cars: rows },
    ))
}
