use axum::{extract::State, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{auth, error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/token", post(login))
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = auth::authenticate_user(&state.db, &form.username, &form.password).await?;
    Ok(Json(TokenResponse {
        access_token: user.username,
        token_type: "bearer".to_string(),
    }))
}
