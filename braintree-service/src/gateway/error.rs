use super::types::ErrorResponse;
use thiserror::Error;

/// Gateway error codes the facade acts on.
pub mod codes {
    /// Refund not allowed: the transaction has not settled yet.
    pub const REFUND_NOT_ALLOWED_PRE_SETTLEMENT: &str = "91506";
    /// Void not allowed in the transaction's current status.
    pub const VOID_NOT_ALLOWED: &str = "91504";
    pub const CUSTOMER_ID_TAKEN: &str = "91609";
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Invalid arguments, raised before any result object exists.
    #[error("{0}")]
    Validation(String),

    /// The gateway processed the request and answered with a non-success result.
    #[error("{}", .0.message)]
    Rejected(ErrorResponse),

    #[error("Gateway authentication failed")]
    Authentication,

    #[error("Gateway authorization failed")]
    Authorization,

    #[error("Unexpected gateway response ({status}): {body}")]
    Unexpected { status: u16, body: String },

    #[error("Gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    /// First validation code of a rejected result.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected(response) => response.first_error_code(),
            _ => None,
        }
    }
}
