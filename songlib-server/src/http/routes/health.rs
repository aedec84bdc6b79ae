//! Liveness and database readiness

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    /// `up`, `down`, or `detached` when the catalogue runs without Postgres
    pub database: &'static str,
}

/// GET /health - 503 while Postgres does not answer
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let database = match state.database() {
        None => "detached",
        Some(db) => match db.ping().await {
            Ok(()) => "up",
            Err(err) => {
                tracing::warn!(error = %err, "health check: database unreachable");
                "down"
            }
        },
    };

    let (code, status) = if database == "down" {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        code,
        Json(HealthReport {
            service: "songlib",
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
