/// Liveness and readiness probes
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::AppState;

/// GET /api/v1/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// GET /api/v1/health/ready - the store must answer
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    match state.repo.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(err) => {
            tracing::warn!("readiness check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "error": err.to_string(),
            }))
        }
    }
}
