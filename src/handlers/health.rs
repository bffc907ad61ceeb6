//! Health check route

use axum::extract::State;
use axum::Json;

use crate::database;
use crate::utils::errors::Result;

use super::AppState;

/// GET /health — liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    database::health_check(&state.pool).await?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    })))
}
