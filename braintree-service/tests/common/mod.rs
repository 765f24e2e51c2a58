//! Shared fixtures: an in-memory gateway, randomized customers, log capture
//! and a spawned HTTP application.

#![allow(dead_code)]

use async_trait::async_trait;
use braintree_service::config::{
    Config, Environment, GatewayConfig, MerchantAccounts, ServerConfig,
};
use braintree_service::facade::PaymentFacade;
use braintree_service::gateway::{
    codes, Customer, CustomerDetails, CustomerRequest, ErrorResponse, GatewayError,
    GatewayResult, PaymentGateway, PaypalDetails, SaleRequest, Transaction, TransactionSearch,
    TransactionStatus, TransactionType,
};
use braintree_service::models::{Currency, Money};
use braintree_service::Application;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use uuid::Uuid;

pub const USD_ACCOUNT: &str = "test-usd";
pub const CAD_ACCOUNT: &str = "test-cad";

pub const VALID_NONCE: &str = "fake-valid-nonce";
pub const DECLINED_NONCE: &str = "fake-processor-declined-visa-nonce";
pub const PAYPAL_NONCE: &str = "fake-paypal-one-time-nonce";

pub const INSUFFICIENT_FUNDS: &str = "Do Not Honor - Insufficient Funds: The transaction was declined due to insufficient funds in your account. Please use a different card or contact your bank.";
pub const NO_SUCH_CUSTOMER: &str = "Customer specified by customer_id does not exist";

pub fn merchant_accounts() -> MerchantAccounts {
    MerchantAccounts {
        usd: Some(USD_ACCOUNT.to_string()),
        cad: Some(CAD_ACCOUNT.to_string()),
    }
}

pub fn usd(amount: i64) -> Money {
    Money::new(Decimal::new(amount, 0), Currency::Usd)
}

#[derive(Default)]
struct Ledger {
    customers: HashMap<String, Customer>,
    transactions: Vec<Transaction>,
}

/// In-memory gateway with the settlement rules of the real one.
///
/// Sales that are submitted for settlement stay unsettled until
/// [`FakeGateway::settle`] is called, so refunds against them fail with
/// code 91506 just as in the sandbox.
#[derive(Default)]
pub struct FakeGateway {
    ledger: Mutex<Ledger>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
    reject_deletes: AtomicBool,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail with a 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Answer customer deletions with a non-success result.
    pub fn set_reject_deletes(&self, reject: bool) {
        self.reject_deletes.store(reject, Ordering::SeqCst);
    }

    pub fn settle(&self, transaction_id: &str) {
        let mut ledger = self.ledger.lock().unwrap();
        if let Some(transaction) = ledger
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == transaction_id)
        {
            transaction.status = TransactionStatus::Settled;
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.ledger.lock().unwrap().transactions.len()
    }

    fn check_available(&self) -> GatewayResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unexpected {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn next_transaction_id(&self) -> String {
        format!("txn{:06}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn currency_for(merchant_account_id: Option<&str>) -> &'static str {
        match merchant_account_id {
            Some(CAD_ACCOUNT) => "CAD",
            _ => "USD",
        }
    }

    fn record(&self, ledger: &mut Ledger, sale: &SaleRequest, status: TransactionStatus) -> Transaction {
        let customer = sale
            .customer_id
            .as_ref()
            .and_then(|id| ledger.customers.get(id));
        let transaction = Transaction {
            id: self.next_transaction_id(),
            status,
            kind: TransactionType::Sale,
            amount: sale.amount,
            currency_iso_code: Self::currency_for(sale.merchant_account_id.as_deref())
                .to_string(),
            order_id: sale.order_id.clone(),
            merchant_account_id: sale.merchant_account_id.clone(),
            customer_details: sale.customer_id.as_ref().map(|id| CustomerDetails {
                id: Some(id.clone()),
                email: customer.and_then(|customer| customer.email.clone()),
            }),
            paypal_details: (sale.payment_method_nonce.as_deref() == Some(PAYPAL_NONCE)).then(
                || PaypalDetails {
                    payer_email: Some("payer@example.com".to_string()),
                    payer_first_name: Some("Pat".to_string()),
                    payer_last_name: Some("Payer".to_string()),
                },
            ),
            processor_response_code: None,
            processor_response_text: None,
            gateway_rejection_reason: None,
            refunded_transaction_id: None,
        };
        ledger.transactions.push(transaction.clone());
        transaction
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn generate_client_token(&self, customer_id: Option<&str>) -> GatewayResult<String> {
        self.check_available()?;
        let ledger = self.ledger.lock().unwrap();
        match customer_id {
            Some(id) if !ledger.customers.contains_key(id) => {
                Err(GatewayError::Validation(NO_SUCH_CUSTOMER.to_string()))
            }
            Some(id) => Ok(format!("client-token-{}", id)),
            None => Ok("client-token".to_string()),
        }
    }

    async fn create_customer(&self, request: &CustomerRequest) -> GatewayResult<Customer> {
        self.check_available()?;
        let mut ledger = self.ledger.lock().unwrap();
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        if ledger.customers.contains_key(&id) {
            return Err(GatewayError::Rejected(
                ErrorResponse::new("Customer ID has already been taken.")
                    .with_error(codes::CUSTOMER_ID_TAKEN, "Customer ID has already been taken."),
            ));
        }
        let customer = Customer {
            id: id.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
        };
        ledger.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn find_customer(&self, customer_id: &str) -> GatewayResult<Customer> {
        self.check_available()?;
        self.ledger
            .lock()
            .unwrap()
            .customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("customer", customer_id))
    }

    async fn delete_customer(&self, customer_id: &str) -> GatewayResult<()> {
        self.check_available()?;
        if self.reject_deletes.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected(ErrorResponse::new(
                "Customer has a subscription and cannot be deleted.",
            )));
        }
        self.ledger
            .lock()
            .unwrap()
            .customers
            .remove(customer_id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::not_found("customer", customer_id))
    }

    async fn sale(&self, request: &SaleRequest) -> GatewayResult<Transaction> {
        self.check_available()?;
        let mut ledger = self.ledger.lock().unwrap();

        let duplicate = request.order_id.as_ref().is_some_and(|order_id| {
            ledger.transactions.iter().any(|transaction| {
                transaction.order_id.as_ref() == Some(order_id)
                    && transaction.status != TransactionStatus::GatewayRejected
            })
        });
        if duplicate {
            let mut rejected = self.record(&mut ledger, request, TransactionStatus::GatewayRejected);
            rejected.gateway_rejection_reason = Some("duplicate".to_string());
            return Err(GatewayError::Rejected(
                ErrorResponse::new("Gateway Rejected: duplicate").with_transaction(rejected),
            ));
        }

        if request.payment_method_nonce.as_deref() == Some(DECLINED_NONCE) {
            let mut declined =
                self.record(&mut ledger, request, TransactionStatus::ProcessorDeclined);
            declined.processor_response_code = Some("2001".to_string());
            declined.processor_response_text = Some("Insufficient Funds".to_string());
            return Err(GatewayError::Rejected(
                ErrorResponse::new(INSUFFICIENT_FUNDS).with_transaction(declined),
            ));
        }

        let status = if request.options.submit_for_settlement == Some(true) {
            TransactionStatus::SubmittedForSettlement
        } else {
            TransactionStatus::Authorized
        };
        Ok(self.record(&mut ledger, request, status))
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<Decimal>,
    ) -> GatewayResult<Transaction> {
        self.check_available()?;
        let mut ledger = self.ledger.lock().unwrap();
        let original = ledger
            .transactions
            .iter()
            .find(|transaction| transaction.id == transaction_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("transaction", transaction_id))?;

        if !original.status.is_settled() {
            return Err(GatewayError::Rejected(
                ErrorResponse::new("Cannot refund transaction unless it is settled.").with_error(
                    codes::REFUND_NOT_ALLOWED_PRE_SETTLEMENT,
                    "Cannot refund transaction unless it is settled.",
                ),
            ));
        }

        let credit = Transaction {
            id: self.next_transaction_id(),
            status: TransactionStatus::SubmittedForSettlement,
            kind: TransactionType::Credit,
            amount: -amount.unwrap_or(original.amount),
            refunded_transaction_id: Some(original.id.clone()),
            order_id: None,
            processor_response_code: None,
            processor_response_text: None,
            gateway_rejection_reason: None,
            ..original
        };
        ledger.transactions.push(credit.clone());
        Ok(credit)
    }

    async fn void(&self, transaction_id: &str) -> GatewayResult<Transaction> {
        self.check_available()?;
        let mut ledger = self.ledger.lock().unwrap();
        let transaction = ledger
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == transaction_id)
            .ok_or_else(|| GatewayError::not_found("transaction", transaction_id))?;

        if !transaction.status.is_voidable() {
            let message = "Transaction can only be voided if status is authorized, submitted_for_settlement, or - for PayPal - settlement_pending.";
            return Err(GatewayError::Rejected(
                ErrorResponse::new(message).with_error(codes::VOID_NOT_ALLOWED, message),
            ));
        }

        transaction.status = TransactionStatus::Voided;
        Ok(transaction.clone())
    }

    async fn find_transaction(&self, transaction_id: &str) -> GatewayResult<Transaction> {
        self.check_available()?;
        self.ledger
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|transaction| transaction.id == transaction_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("transaction", transaction_id))
    }

    async fn search_transactions(
        &self,
        search: &TransactionSearch,
    ) -> GatewayResult<Vec<Transaction>> {
        self.check_available()?;
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .transactions
            .iter()
            .rev()
            .filter(|transaction| search.matches(transaction))
            .cloned()
            .collect())
    }
}

/// Facade over a fresh fake gateway; the gateway is returned for inspection.
pub fn facade() -> (PaymentFacade, Arc<FakeGateway>) {
    let gateway = FakeGateway::new();
    (PaymentFacade::new(gateway.clone()), gateway)
}

/// A randomized local customer record.
#[derive(Debug, Clone)]
pub struct FakeCustomer {
    pub pubkey: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl FakeCustomer {
    pub fn build() -> Self {
        let mut rng = rand::thread_rng();
        let pubkey = Uuid::new_v4();
        let first_names = ["Alex", "Jordan", "Sam", "Robin", "Casey", "Morgan"];
        let last_names = ["Rivera", "Nguyen", "Okafor", "Larsen", "Dubois", "Tanaka"];

        Self {
            pubkey,
            username: format!("customer-{}@example.test", pubkey),
            first_name: first_names.choose(&mut rng).unwrap_or(&"Alex").to_string(),
            last_name: last_names.choose(&mut rng).unwrap_or(&"Rivera").to_string(),
            phone: format!("+1-555-{:03}-{:04}", rng.gen_range(100..1000), rng.gen_range(0..10000)),
        }
    }

    pub fn id(&self) -> String {
        self.pubkey.to_string()
    }

    pub fn creation_request(&self) -> CustomerRequest {
        CustomerRequest {
            id: Some(self.id()),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            email: Some(self.username.clone()),
            phone: Some(self.phone.clone()),
        }
    }
}

/// Build a customer and register it through the facade.
pub async fn create_customer(facade: &PaymentFacade) -> FakeCustomer {
    let customer = FakeCustomer::build();
    facade
        .create_customer(customer.creation_request())
        .await
        .expect("Failed to create customer");
    customer
}

/// The sale parameters used throughout the suite: 100 USD, recurring first.
pub fn sale_request(customer: &FakeCustomer, order_id: &str) -> SaleRequest {
    use braintree_service::gateway::TransactionSource;

    SaleRequest::new(Decimal::new(100, 0))
        .device_data(serde_json::json!({}))
        .submit_for_settlement(true)
        .store_in_vault_on_success(true)
        .order_id(order_id)
        .merchant_account_id(USD_ACCOUNT)
        .customer_id(customer.id())
        .payment_method_nonce(VALID_NONCE)
        .transaction_source(TransactionSource::RecurringFirst)
}

/// (amount, status) of the customer's transactions, newest first.
pub async fn customer_transactions(
    facade: &PaymentFacade,
    customer: &FakeCustomer,
) -> Vec<(Money, TransactionStatus)> {
    facade
        .gateway()
        .search_transactions(&TransactionSearch::by_customer(customer.id()))
        .await
        .expect("Failed to search transactions")
        .into_iter()
        .map(|transaction| {
            (
                transaction.money().expect("Unknown currency"),
                transaction.status,
            )
        })
        .collect()
}

/// Log events recorded by a capturing subscriber layer.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::layer::SubscriberExt;
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(event_level, _)| *event_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        gateway: GatewayConfig::new(Environment::Development, "test_merchant", "public", "private"),
        merchant_accounts: MerchantAccounts {
            usd: Some(USD_ACCOUNT.to_string()),
            cad: None,
        },
        service_name: "braintree-service-test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
    }
}

pub struct TestApp {
    pub address: String,
    pub gateway: Arc<FakeGateway>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let gateway = FakeGateway::new();
        let app = Application::build_with_gateway(test_config(), gateway.clone())
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            gateway,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
