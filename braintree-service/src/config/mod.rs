use crate::models::Currency;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub merchant_accounts: MerchantAccounts,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Target environment of the gateway.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
    Development,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api.sandbox.braintreegateway.com",
            Environment::Production => "https://api.braintreegateway.com",
            Environment::Development => "http://localhost:3000",
        }
    }
}

/// Gateway credentials and transport settings.
#[derive(Deserialize, Clone, Debug)]
pub struct GatewayConfig {
    #[serde(default)]
    pub environment: Environment,
    pub merchant_id: String,
    pub public_key: Secret<String>,
    pub private_key: Secret<String>,
    /// Overrides the environment's base URL (mock servers, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn new(
        environment: Environment,
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            merchant_id: merchant_id.into(),
            public_key: Secret::new(public_key.into()),
            private_key: Secret::new(private_key.into()),
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Check if all three credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.merchant_id.is_empty()
            && !self.public_key.expose_secret().is_empty()
            && !self.private_key.expose_secret().is_empty()
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.environment.base_url())
            .trim_end_matches('/')
    }

    /// Per-request timeout; `request_timeout_secs = 0` disables it.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Gateway-side merchant account per currency.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MerchantAccounts {
    pub usd: Option<String>,
    pub cad: Option<String>,
}

impl MerchantAccounts {
    pub fn for_currency(&self, currency: Currency) -> Option<&str> {
        match currency {
            Currency::Usd => self.usd.as_deref(),
            Currency::Cad => self.cad.as_deref(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_service_name() -> String {
    "braintree-service".to_string()
}

fn default_log_level() -> String {
    "info,braintree_service=debug".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load from `configuration.*` and `APP__`-prefixed environment variables.
    pub fn load() -> Result<Self, AppError> {
        service_core::config::load("APP")
    }
}
