//! Customer handlers: lifecycle and client tokens.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::gateway::CustomerRequest;
use crate::models::DeletedObject;
use crate::AppState;

/// Request to create a gateway customer.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    /// External id; becomes the gateway customer id.
    #[validate(length(min = 1, max = 36))]
    pub id: Option<String>,
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub phone: Option<String>,
}

impl From<CreateCustomerRequest> for CustomerRequest {
    fn from(request: CreateCustomerRequest) -> Self {
        CustomerRequest {
            id: request.id,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub customer_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClientTokenResponse {
    pub client_token: String,
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    payload.validate()?;

    let customer_id = state.facade.create_customer(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(CustomerResponse { customer_id })))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer_id = state
        .facade
        .retrieve_customer(&customer_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Customer {} not found", customer_id))
        })?;

    Ok(Json(CustomerResponse { customer_id }))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<DeletedObject>, AppError> {
    let deleted = state.facade.delete_customer(&customer_id).await?;
    Ok(Json(deleted))
}

pub async fn issue_client_token(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<ClientTokenResponse>, AppError> {
    let client_token = state.facade.issue_client_token(&customer_id).await?;
    Ok(Json(ClientTokenResponse { client_token }))
}
