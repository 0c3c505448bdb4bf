use axum::extract::FromRef;

use crate::{config::AppConfig, db::DbPool};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        Self { config, db }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> DbPool {
        state.db.clone()
    }
}
