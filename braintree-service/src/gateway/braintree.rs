//! Braintree gateway client.
//!
//! Talks JSON to the merchant-scoped resources of the gateway API and
//! authenticates every call with the public/private key pair.

use super::error::{GatewayError, GatewayResult};
use super::types::{
    Customer, CustomerRequest, ErrorResponse, SaleRequest, Transaction, TransactionSearch,
    TransactionType,
};
use super::PaymentGateway;
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::borrow::Cow;

const API_VERSION_HEADER: &str = "X-ApiVersion";
const API_VERSION: &str = "6";
const CLIENT_TOKEN_VERSION: u8 = 2;

/// Braintree client for interacting with the gateway API.
#[derive(Clone)]
pub struct BraintreeGateway {
    client: Client,
    config: GatewayConfig,
}

#[derive(Serialize)]
struct CustomerBody<'a> {
    customer: &'a CustomerRequest,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: Customer,
}

#[derive(Serialize)]
struct ClientTokenBody<'a> {
    client_token: ClientTokenParams<'a>,
}

#[derive(Serialize)]
struct ClientTokenParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
    version: u8,
}

#[derive(Deserialize)]
struct ClientTokenEnvelope {
    client_token: ClientTokenValue,
}

#[derive(Deserialize)]
struct ClientTokenValue {
    value: String,
}

#[derive(Serialize)]
struct SaleBody<'a> {
    transaction: SaleParams<'a>,
}

#[derive(Serialize)]
struct SaleParams<'a> {
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(flatten)]
    sale: &'a SaleRequest,
}

#[derive(Serialize)]
struct RefundBody {
    transaction: RefundParams,
}

#[derive(Serialize)]
struct RefundParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Decimal>,
}

#[derive(Deserialize)]
struct TransactionEnvelope {
    transaction: Transaction,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    search: SearchCriteria<'a>,
}

#[derive(Serialize)]
struct SearchCriteria<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<Is<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<Is<'a>>,
}

#[derive(Serialize)]
struct Is<'a> {
    is: &'a str,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    api_error_response: ErrorResponse,
}

impl BraintreeGateway {
    /// Create a new gateway client.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Check if the gateway credentials are set.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn merchant_id(&self) -> &str {
        &self.config.merchant_id
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/merchants/{}/{}",
            self.config.base_url(),
            self.config.merchant_id,
            path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .basic_auth(
                self.config.public_key.expose_secret(),
                Some(self.config.private_key.expose_secret()),
            )
            .header(API_VERSION_HEADER, API_VERSION)
            .header(header::ACCEPT, "application/json")
    }

    /// Send the request and map the status to a body or a [`GatewayError`].
    ///
    /// `resource` and `id` only feed the not-found error.
    async fn execute(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> GatewayResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, resource, "Braintree response");

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::NOT_FOUND => Err(GatewayError::not_found(resource, id)),
            StatusCode::UNAUTHORIZED => Err(GatewayError::Authentication),
            StatusCode::FORBIDDEN => Err(GatewayError::Authorization),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let envelope: ErrorEnvelope = serde_json::from_str(&body)?;
                Err(GatewayError::Rejected(envelope.api_error_response))
            }
            _ => Err(GatewayError::Unexpected {
                status: status.as_u16(),
                body,
            }),
        }
    }

    /// Percent-encoded path segment for `id`.
    ///
    /// Blank ids are reported as not found without a request.
    fn id_segment<'a>(resource: &'static str, id: &'a str) -> GatewayResult<Cow<'a, str>> {
        if id.trim().is_empty() {
            return Err(GatewayError::not_found(resource, id));
        }
        Ok(urlencoding::encode(id))
    }

    fn decode<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
        Ok(serde_json::from_str(body)?)
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    async fn generate_client_token(&self, customer_id: Option<&str>) -> GatewayResult<String> {
        let body = ClientTokenBody {
            client_token: ClientTokenParams {
                customer_id,
                version: CLIENT_TOKEN_VERSION,
            },
        };
        let request = self.request(Method::POST, "client_token").json(&body);

        // A rejected token request is an argument problem, not a result object.
        let body = self
            .execute(request, "client_token", customer_id.unwrap_or_default())
            .await
            .map_err(|err| match err {
                GatewayError::Rejected(response) => GatewayError::Validation(response.message),
                other => other,
            })?;

        let envelope: ClientTokenEnvelope = Self::decode(&body)?;
        Ok(envelope.client_token.value)
    }

    async fn create_customer(&self, request: &CustomerRequest) -> GatewayResult<Customer> {
        let builder = self
            .request(Method::POST, "customers")
            .json(&CustomerBody { customer: request });
        let body = self
            .execute(builder, "customer", request.id.as_deref().unwrap_or_default())
            .await?;

        let envelope: CustomerEnvelope = Self::decode(&body)?;
        tracing::info!(customer_id = %envelope.customer.id, "Braintree customer created");
        Ok(envelope.customer)
    }

    async fn find_customer(&self, customer_id: &str) -> GatewayResult<Customer> {
        let builder = self.request(
            Method::GET,
            &format!("customers/{}", Self::id_segment("customer", customer_id)?),
        );
        let body = self.execute(builder, "customer", customer_id).await?;

        let envelope: CustomerEnvelope = Self::decode(&body)?;
        Ok(envelope.customer)
    }

    async fn delete_customer(&self, customer_id: &str) -> GatewayResult<()> {
        let builder = self.request(
            Method::DELETE,
            &format!("customers/{}", Self::id_segment("customer", customer_id)?),
        );
        self.execute(builder, "customer", customer_id).await?;
        Ok(())
    }

    async fn sale(&self, request: &SaleRequest) -> GatewayResult<Transaction> {
        let body = SaleBody {
            transaction: SaleParams {
                kind: TransactionType::Sale,
                sale: request,
            },
        };
        let builder = self.request(Method::POST, "transactions").json(&body);
        let body = self
            .execute(
                builder,
                "transaction",
                request.order_id.as_deref().unwrap_or_default(),
            )
            .await?;

        let envelope: TransactionEnvelope = Self::decode(&body)?;
        tracing::info!(
            transaction_id = %envelope.transaction.id,
            amount = %envelope.transaction.amount,
            currency = %envelope.transaction.currency_iso_code,
            status = %envelope.transaction.status,
            "Braintree sale created"
        );
        Ok(envelope.transaction)
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<Decimal>,
    ) -> GatewayResult<Transaction> {
        let body = RefundBody {
            transaction: RefundParams { amount },
        };
        let builder = self
            .request(
                Method::POST,
                &format!(
                    "transactions/{}/refund",
                    Self::id_segment("transaction", transaction_id)?
                ),
            )
            .json(&body);
        let body = self.execute(builder, "transaction", transaction_id).await?;

        let envelope: TransactionEnvelope = Self::decode(&body)?;
        Ok(envelope.transaction)
    }

    async fn void(&self, transaction_id: &str) -> GatewayResult<Transaction> {
        let builder = self.request(
            Method::PUT,
            &format!(
                "transactions/{}/void",
                Self::id_segment("transaction", transaction_id)?
            ),
        );
        let body = self.execute(builder, "transaction", transaction_id).await?;

        let envelope: TransactionEnvelope = Self::decode(&body)?;
        Ok(envelope.transaction)
    }

    async fn find_transaction(&self, transaction_id: &str) -> GatewayResult<Transaction> {
        let builder = self.request(
            Method::GET,
            &format!("transactions/{}", Self::id_segment("transaction", transaction_id)?),
        );
        let body = self.execute(builder, "transaction", transaction_id).await?;

        let envelope: TransactionEnvelope = Self::decode(&body)?;
        Ok(envelope.transaction)
    }

    async fn search_transactions(
        &self,
        search: &TransactionSearch,
    ) -> GatewayResult<Vec<Transaction>> {
        let body = SearchBody {
            search: SearchCriteria {
                customer_id: search.customer_id.as_deref().map(|is| Is { is }),
                order_id: search.order_id.as_deref().map(|is| Is { is }),
            },
        };
        let builder = self
            .request(Method::POST, "transactions/advanced_search")
            .json(&body);
        let body = self.execute(builder, "transaction", "").await?;

        let envelope: SearchEnvelope = Self::decode(&body)?;
        Ok(envelope.transactions)
    }
}
