//! Payment facade.
//!
//! A narrow surface over the gateway: customer lifecycle, client tokens,
//! sales, refunds and payment-source lookups. The facade holds no state of
//! its own beyond the gateway handle. Every failure is logged here before it
//! is returned, so callers only decide what to show.

mod error;
mod refund;

pub use error::{FacadeError, PaymentClientError};
pub use refund::RefundOutcome;

use crate::gateway::{CustomerRequest, GatewayError, PaymentGateway, SaleRequest};
use crate::models::{DeletedObject, Money, PaypalPaymentInfo, RefundRequest};
use crate::services::metrics::record_operation;
use std::sync::Arc;

pub type FacadeResult<T> = Result<T, FacadeError>;

#[derive(Clone)]
pub struct PaymentFacade {
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentFacade {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// The underlying gateway, for lookups the facade does not wrap.
    pub fn gateway(&self) -> &Arc<dyn PaymentGateway> {
        &self.gateway
    }

    /// Issue a client token scoped to `customer_id`.
    ///
    /// An unknown customer is reported by the gateway as a validation error,
    /// which is re-raised unchanged.
    pub async fn issue_client_token(&self, customer_id: &str) -> FacadeResult<String> {
        match self.gateway.generate_client_token(Some(customer_id)).await {
            Ok(token) => {
                record_operation("client_token", "success");
                Ok(token)
            }
            Err(err) => {
                tracing::error!(customer_id, details = ?err, "Error getting token: {}", err);
                record_operation("client_token", "failure");
                Err(err.into())
            }
        }
    }

    /// Create a customer and return the gateway-assigned id.
    ///
    /// When `request.id` is set the gateway uses it verbatim.
    pub async fn create_customer(&self, request: CustomerRequest) -> FacadeResult<String> {
        match self.gateway.create_customer(&request).await {
            Ok(customer) => {
                record_operation("create_customer", "success");
                Ok(customer.id)
            }
            Err(err) => {
                tracing::error!(
                    customer_id = ?request.id,
                    details = ?err,
                    "Error creating customer: {}",
                    err
                );
                record_operation("create_customer", "failure");
                Err(FacadeError::from_gateway(err))
            }
        }
    }

    /// Look up a customer.
    ///
    /// An unknown id is not an error: it is logged at warning level and
    /// yields `None`. Any other failure is returned.
    pub async fn retrieve_customer(&self, customer_id: &str) -> FacadeResult<Option<String>> {
        match self.gateway.find_customer(customer_id).await {
            Ok(customer) => {
                record_operation("retrieve_customer", "success");
                Ok(Some(customer.id))
            }
            Err(err @ GatewayError::NotFound { .. }) => {
                tracing::warn!(customer_id, details = ?err, "Error retrieving customer: {}", err);
                record_operation("retrieve_customer", "absent");
                Ok(None)
            }
            Err(err) => {
                tracing::error!(customer_id, details = ?err, "Error retrieving customer: {}", err);
                record_operation("retrieve_customer", "failure");
                Err(err.into())
            }
        }
    }

    /// Delete a customer.
    ///
    /// A non-success result is acknowledged with `deleted: false`; errors
    /// (unknown customer, transport) are returned.
    pub async fn delete_customer(&self, customer_id: &str) -> FacadeResult<DeletedObject> {
        let deleted = match self.gateway.delete_customer(customer_id).await {
            Ok(()) => true,
            Err(GatewayError::Rejected(response)) => {
                tracing::warn!(
                    customer_id,
                    details = ?response,
                    "Customer deletion not accepted: {}",
                    response.message
                );
                false
            }
            Err(err) => {
                tracing::error!(customer_id, details = ?err, "Error deleting customer: {}", err);
                record_operation("delete_customer", "failure");
                return Err(err.into());
            }
        };

        record_operation("delete_customer", if deleted { "success" } else { "failure" });
        Ok(DeletedObject {
            id: customer_id.to_string(),
            deleted,
            object: "customer".to_string(),
        })
    }

    /// Submit a sale and return the new transaction id.
    ///
    /// `payment_method_reference` is charged as a vaulted payment method
    /// unless `sale` already names one. Declines and gateway rejections are
    /// returned as [`PaymentClientError`] carrying the gateway's message.
    pub async fn create_sale(
        &self,
        payment_method_reference: Option<&str>,
        mut sale: SaleRequest,
    ) -> FacadeResult<String> {
        if sale.payment_method_token.is_none() {
            sale.payment_method_token = payment_method_reference.map(str::to_string);
        }

        match self.gateway.sale(&sale).await {
            Ok(transaction) => {
                record_operation("sale", "success");
                Ok(transaction.id)
            }
            Err(err) => {
                tracing::error!(
                    order_id = ?sale.order_id,
                    customer_id = ?sale.customer_id,
                    details = ?err,
                    "Error creating sale: {}",
                    err
                );
                record_operation("sale", "failure");
                Err(FacadeError::from_gateway(err))
            }
        }
    }

    /// Refund a transaction, voiding it instead when it has not settled.
    ///
    /// Only a full refund of an unsettled transaction is voided. A partial
    /// amount on an unsettled transaction is rejected with
    /// [`FacadeError::NotImplemented`]. `reference_amount` is the order total
    /// the refund relates to and is only logged.
    pub async fn refund(
        &self,
        request: &RefundRequest,
        reference_amount: Option<&Money>,
    ) -> FacadeResult<String> {
        let outcome = RefundOutcome::from(
            self.gateway
                .refund(&request.transaction_id, request.amount)
                .await,
        );

        let result = match outcome {
            RefundOutcome::Refunded(refund_id) => {
                record_operation("refund", "success");
                Ok(refund_id)
            }
            RefundOutcome::DisallowedPreSettlement => self.void_unsettled(request).await,
            RefundOutcome::Failed(err) => Err(FacadeError::from_gateway(err)),
        };

        if let Err(err) = &result {
            tracing::error!(
                transaction_id = %request.transaction_id,
                amount = ?request.amount,
                reference_amount = ?reference_amount,
                details = ?err,
                "Error refunding payment: {}",
                err
            );
            record_operation("refund", "failure");
        }

        result
    }

    async fn void_unsettled(&self, request: &RefundRequest) -> FacadeResult<String> {
        if request.is_partial() {
            tracing::error!(
                transaction_id = %request.transaction_id,
                "Trying to refund a partial amount for an authorized or submitted for settlement transaction"
            );
            return Err(FacadeError::NotImplemented(
                "Refund for authorized and submitted for settlement transactions is not supported",
            ));
        }

        let voided = self
            .gateway
            .void(&request.transaction_id)
            .await
            .map_err(FacadeError::from_gateway)?;

        tracing::info!(
            transaction_id = %voided.id,
            "Full refund of unsettled transaction voided instead"
        );
        record_operation("refund", "voided");
        Ok(voided.id)
    }

    /// Payer email and name of a PayPal-funded transaction.
    ///
    /// Lookup errors are returned as-is, without logging.
    pub async fn get_payment_source_info(
        &self,
        transaction_id: &str,
    ) -> FacadeResult<PaypalPaymentInfo> {
        let transaction = self.gateway.find_transaction(transaction_id).await?;
        let paypal = transaction
            .paypal_details
            .ok_or_else(|| FacadeError::MissingPaymentSource(transaction_id.to_string()))?;

        let name = match (paypal.payer_first_name, paypal.payer_last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        };

        Ok(PaypalPaymentInfo {
            email: paypal.payer_email,
            name,
        })
    }
}
