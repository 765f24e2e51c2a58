use crate::gateway::{ErrorResponse, GatewayError};
use thiserror::Error;

/// A gateway call completed with a non-success result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PaymentClientError {
    /// Gateway message, verbatim.
    pub message: String,
    /// Text that can be shown to the payer, when the gateway supplied one.
    pub user_message: Option<String>,
}

impl PaymentClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_message: None,
        }
    }

    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = Some(user_message.into());
        self
    }
}

impl From<ErrorResponse> for PaymentClientError {
    fn from(response: ErrorResponse) -> Self {
        let user_message = response
            .transaction
            .as_ref()
            .and_then(|transaction| transaction.processor_response_text.clone());
        Self {
            message: response.message,
            user_message,
        }
    }
}

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error(transparent)]
    Client(#[from] PaymentClientError),

    /// The gateway error, re-raised unchanged.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    NotImplemented(&'static str),

    #[error("Transaction {0} has no PayPal payment details")]
    MissingPaymentSource(String),
}

impl FacadeError {
    /// Non-success results become [`PaymentClientError`]s, anything else is re-raised.
    pub fn from_gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(response) => FacadeError::Client(response.into()),
            other => FacadeError::Gateway(other),
        }
    }
}
