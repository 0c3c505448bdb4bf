pub mod auth;
pub mod cars;
pub mod web;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(web::router())
        .nest("/api/cars/", cars::router())
        .nest("/auth", auth::router())
        .with_state(state)
}
