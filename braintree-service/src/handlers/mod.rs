//! HTTP handlers for braintree-service.

pub mod customers;
pub mod transactions;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::facade::FacadeError;
use crate::gateway::GatewayError;
use crate::services::get_metrics;
use crate::AppState;

/// Health check endpoint for liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": state.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Prometheus metrics endpoint.
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

impl From<FacadeError> for AppError {
    fn from(err: FacadeError) -> Self {
        match err {
            FacadeError::Client(client) => {
                AppError::UnprocessableEntity(client.user_message.unwrap_or(client.message))
            }
            FacadeError::NotImplemented(message) => AppError::NotImplemented(message.to_string()),
            err @ FacadeError::MissingPaymentSource(_) => {
                AppError::UnprocessableEntity(err.to_string())
            }
            FacadeError::Gateway(err @ GatewayError::NotFound { .. }) => {
                AppError::NotFound(anyhow::Error::new(err))
            }
            FacadeError::Gateway(GatewayError::Validation(message)) => {
                AppError::BadRequest(anyhow::anyhow!(message))
            }
            FacadeError::Gateway(err) => AppError::BadGateway(err.to_string()),
        }
    }
}
