use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.db.health_check().await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
