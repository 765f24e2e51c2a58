//! Gateway resources and request shapes.

use crate::models::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity fields sent when creating a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRequest {
    /// Caller-chosen id; the gateway assigns one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Customer record as stored by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    RecurringFirst,
    Recurring,
    Moto,
    Merchant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_for_settlement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_in_vault_on_success: Option<bool>,
}

/// Parameters of a sale (charge) request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SaleRequest {
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_data: Option<serde_json::Value>,
    #[serde(default)]
    pub options: SaleOptions,
    /// Order identifier; the gateway rejects a second sale with the same one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_source: Option<TransactionSource>,
}

impl SaleRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            ..Default::default()
        }
    }

    pub fn customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn merchant_account_id(mut self, merchant_account_id: impl Into<String>) -> Self {
        self.merchant_account_id = Some(merchant_account_id.into());
        self
    }

    pub fn payment_method_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.payment_method_nonce = Some(nonce.into());
        self
    }

    pub fn payment_method_token(mut self, token: impl Into<String>) -> Self {
        self.payment_method_token = Some(token.into());
        self
    }

    pub fn device_data(mut self, device_data: serde_json::Value) -> Self {
        self.device_data = Some(device_data);
        self
    }

    pub fn submit_for_settlement(mut self, submit: bool) -> Self {
        self.options.submit_for_settlement = Some(submit);
        self
    }

    pub fn store_in_vault_on_success(mut self, store: bool) -> Self {
        self.options.store_in_vault_on_success = Some(store);
        self
    }

    pub fn transaction_source(mut self, source: TransactionSource) -> Self {
        self.transaction_source = Some(source);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Authorizing,
    Authorized,
    AuthorizationExpired,
    SubmittedForSettlement,
    SettlementPending,
    Settling,
    Settled,
    SettlementConfirmed,
    SettlementDeclined,
    Voided,
    ProcessorDeclined,
    GatewayRejected,
    Failed,
    #[serde(other)]
    Unrecognized,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Authorizing => "authorizing",
            TransactionStatus::Authorized => "authorized",
            TransactionStatus::AuthorizationExpired => "authorization_expired",
            TransactionStatus::SubmittedForSettlement => "submitted_for_settlement",
            TransactionStatus::SettlementPending => "settlement_pending",
            TransactionStatus::Settling => "settling",
            TransactionStatus::Settled => "settled",
            TransactionStatus::SettlementConfirmed => "settlement_confirmed",
            TransactionStatus::SettlementDeclined => "settlement_declined",
            TransactionStatus::Voided => "voided",
            TransactionStatus::ProcessorDeclined => "processor_declined",
            TransactionStatus::GatewayRejected => "gateway_rejected",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Unrecognized => "unrecognized",
        }
    }

    /// Money has moved; only these can be refunded.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Settled
                | TransactionStatus::Settling
                | TransactionStatus::SettlementConfirmed
        )
    }

    /// Authorized but not yet settled; these can only be voided.
    pub fn is_voidable(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Authorized
                | TransactionStatus::SubmittedForSettlement
                | TransactionStatus::SettlementPending
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Sale,
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    pub id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaypalDetails {
    pub payer_email: Option<String>,
    pub payer_first_name: Option<String>,
    pub payer_last_name: Option<String>,
}

/// Transaction record as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub status: TransactionStatus,
    #[serde(rename = "type", default)]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency_iso_code: String,
    pub order_id: Option<String>,
    pub merchant_account_id: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub paypal_details: Option<PaypalDetails>,
    pub processor_response_code: Option<String>,
    pub processor_response_text: Option<String>,
    pub gateway_rejection_reason: Option<String>,
    pub refunded_transaction_id: Option<String>,
}

impl Transaction {
    /// Amount and currency, `None` for a currency without a merchant account.
    pub fn money(&self) -> Option<Money> {
        self.currency_iso_code
            .parse::<Currency>()
            .ok()
            .map(|currency| Money::new(self.amount, currency))
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.id.as_deref())
    }
}

/// Search criteria for transactions; unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl TransactionSearch {
    pub fn by_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let customer_matches = self
            .customer_id
            .as_deref()
            .map_or(true, |id| transaction.customer_id() == Some(id));
        let order_matches = self
            .order_id
            .as_deref()
            .map_or(true, |id| transaction.order_id.as_deref() == Some(id));
        customer_matches && order_matches
    }
}

/// One validation error inside a non-success result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub attribute: Option<String>,
    pub message: String,
}

/// Non-success result of a gateway call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    #[serde(default)]
    pub transaction: Option<Transaction>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
            transaction: None,
        }
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.push(ApiError {
            code: code.into(),
            attribute: None,
            message: message.into(),
        });
        self
    }

    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// Code of the first (deepest) validation error.
    pub fn first_error_code(&self) -> Option<&str> {
        self.errors.first().map(|error| error.code.as_str())
    }
}
