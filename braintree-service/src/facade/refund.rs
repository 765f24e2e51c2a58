use crate::gateway::{codes, GatewayError, GatewayResult, Transaction};

/// Classified result of a refund attempt.
#[derive(Debug)]
pub enum RefundOutcome {
    /// Id of the refund (credit) transaction.
    Refunded(String),
    /// The transaction has not settled; it can only be voided.
    DisallowedPreSettlement,
    Failed(GatewayError),
}

impl From<GatewayResult<Transaction>> for RefundOutcome {
    fn from(result: GatewayResult<Transaction>) -> Self {
        match result {
            Ok(transaction) => RefundOutcome::Refunded(transaction.id),
            Err(err) if err.error_code() == Some(codes::REFUND_NOT_ALLOWED_PRE_SETTLEMENT) => {
                RefundOutcome::DisallowedPreSettlement
            }
            Err(err) => RefundOutcome::Failed(err),
        }
    }
}
