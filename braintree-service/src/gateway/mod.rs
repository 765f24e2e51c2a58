//! Payment gateway seam.
//!
//! [`PaymentGateway`] is the surface the facade drives. [`BraintreeGateway`]
//! implements it over HTTP; tests substitute an in-memory implementation.

pub mod braintree;
pub mod error;
pub mod types;

pub use braintree::BraintreeGateway;
pub use error::{codes, GatewayError, GatewayResult};
pub use types::{
    ApiError, Customer, CustomerDetails, CustomerRequest, ErrorResponse, PaypalDetails,
    SaleOptions, SaleRequest, Transaction, TransactionSearch, TransactionSource,
    TransactionStatus, TransactionType,
};

use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short-lived client-side token, scoped to a customer when one is given.
    async fn generate_client_token(&self, customer_id: Option<&str>) -> GatewayResult<String>;

    async fn create_customer(&self, request: &CustomerRequest) -> GatewayResult<Customer>;

    async fn find_customer(&self, customer_id: &str) -> GatewayResult<Customer>;

    async fn delete_customer(&self, customer_id: &str) -> GatewayResult<()>;

    async fn sale(&self, request: &SaleRequest) -> GatewayResult<Transaction>;

    /// Refund a settled transaction; `None` refunds the full amount.
    async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<Decimal>,
    ) -> GatewayResult<Transaction>;

    async fn void(&self, transaction_id: &str) -> GatewayResult<Transaction>;

    async fn find_transaction(&self, transaction_id: &str) -> GatewayResult<Transaction>;

    /// Matching transactions, newest first.
    async fn search_transactions(
        &self,
        search: &TransactionSearch,
    ) -> GatewayResult<Vec<Transaction>>;
}
