//! Sale, refund and payment-source handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::gateway::{SaleRequest, TransactionSource};
use crate::models::{Currency, Money, PaypalPaymentInfo, RefundRequest};
use crate::AppState;

/// Request to charge a payment method.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    /// Amount in major units, e.g. "100.00".
    pub amount: Decimal,
    /// Selects the merchant account.
    pub currency: Currency,
    /// Vaulted payment method to charge.
    pub payment_method_token: Option<String>,
    /// One-time tokenized payment method.
    pub payment_method_nonce: Option<String>,
    pub customer_id: Option<String>,
    /// Orders are charged at most once per id.
    #[validate(length(min = 1, max = 255))]
    pub order_id: Option<String>,
    pub device_data: Option<serde_json::Value>,
    #[serde(default)]
    pub submit_for_settlement: bool,
    #[serde(default)]
    pub store_in_vault_on_success: bool,
    pub transaction_source: Option<TransactionSource>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: String,
}

/// Request to refund a transaction; no amount refunds it in full.
#[derive(Debug, Default, Deserialize)]
pub struct RefundPayload {
    pub amount: Option<Decimal>,
    /// Order total the refund relates to.
    pub reference_amount: Option<Money>,
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    payload.validate()?;

    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Amount must be positive"
        )));
    }

    let merchant_account = state
        .merchant_accounts
        .for_currency(payload.currency)
        .ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "No merchant account configured for {}",
                payload.currency
            ))
        })?;

    tracing::info!(
        amount = %payload.amount,
        currency = %payload.currency,
        order_id = ?payload.order_id,
        "Creating sale"
    );

    let mut sale = SaleRequest::new(payload.amount)
        .merchant_account_id(merchant_account)
        .submit_for_settlement(payload.submit_for_settlement)
        .store_in_vault_on_success(payload.store_in_vault_on_success);
    sale.order_id = payload.order_id;
    sale.customer_id = payload.customer_id;
    sale.payment_method_nonce = payload.payment_method_nonce;
    sale.device_data = payload.device_data;
    sale.transaction_source = payload.transaction_source;

    let transaction_id = state
        .facade
        .create_sale(payload.payment_method_token.as_deref(), sale)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse { transaction_id }),
    ))
}

pub async fn refund(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    body: Bytes,
) -> Result<Json<TransactionResponse>, AppError> {
    // An empty body is a full refund.
    let payload: RefundPayload = if body.is_empty() {
        RefundPayload::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.into()))?
    };

    if payload.amount.is_some_and(|amount| amount <= Decimal::ZERO) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Refund amount must be positive"
        )));
    }

    let request = RefundRequest {
        transaction_id,
        amount: payload.amount,
    };
    let transaction_id = state
        .facade
        .refund(&request, payload.reference_amount.as_ref())
        .await?;

    Ok(Json(TransactionResponse { transaction_id }))
}

pub async fn payment_source(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<PaypalPaymentInfo>, AppError> {
    let info = state
        .facade
        .get_payment_source_info(&transaction_id)
        .await?;
    Ok(Json(info))
}
