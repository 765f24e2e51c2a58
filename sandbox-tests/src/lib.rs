//! Braintree sandbox integration tests library.
//!
//! Runs the payment facade against a real sandbox account. The tests are
//! ignored by default and need credentials in the environment.
//!
//! ## Usage
//!
//! ```bash
//! export BRAINTREE_SANDBOX_MERCHANT_ID=...
//! export BRAINTREE_SANDBOX_PUBLIC_KEY=...
//! export BRAINTREE_SANDBOX_PRIVATE_KEY=...
//! export BRAINTREE_SANDBOX_USD_ACCOUNT=...
//!
//! cargo test -p sandbox-tests -- --ignored
//! ```

use anyhow::{anyhow, Result};
use braintree_service::config::{Environment, GatewayConfig, MerchantAccounts};
use braintree_service::facade::PaymentFacade;
use braintree_service::gateway::BraintreeGateway;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,braintree_service=debug,sandbox_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow!("{} is not set", name))
}

/// Facade wired to the sandbox, plus the merchant accounts to charge.
pub struct SandboxContext {
    pub facade: PaymentFacade,
    pub merchant_accounts: MerchantAccounts,
}

impl SandboxContext {
    /// Build a context from `BRAINTREE_SANDBOX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        init_tracing();

        let config = GatewayConfig::new(
            Environment::Sandbox,
            required("BRAINTREE_SANDBOX_MERCHANT_ID")?,
            required("BRAINTREE_SANDBOX_PUBLIC_KEY")?,
            required("BRAINTREE_SANDBOX_PRIVATE_KEY")?,
        );
        let gateway = BraintreeGateway::new(config)
            .map_err(|e| anyhow!("Failed to build sandbox gateway: {}", e))?;

        Ok(Self {
            facade: PaymentFacade::new(Arc::new(gateway)),
            merchant_accounts: MerchantAccounts {
                usd: Some(required("BRAINTREE_SANDBOX_USD_ACCOUNT")?),
                cad: std::env::var("BRAINTREE_SANDBOX_CAD_ACCOUNT").ok(),
            },
        })
    }

    pub fn usd_account(&self) -> &str {
        self.merchant_accounts.usd.as_deref().unwrap_or_default()
    }
}
