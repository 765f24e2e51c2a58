//! Application startup and lifecycle management.

use crate::config::{Config, MerchantAccounts};
use crate::facade::PaymentFacade;
use crate::gateway::{BraintreeGateway, PaymentGateway};
use crate::handlers::{self, customers, transactions};
use axum::{
    http::Request,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub facade: PaymentFacade,
    pub merchant_accounts: MerchantAccounts,
    pub service_name: String,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against the configured Braintree gateway.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let gateway = BraintreeGateway::new(config.gateway.clone()).map_err(|e| {
            tracing::error!("Failed to build Braintree client: {}", e);
            AppError::ConfigError(e.into())
        })?;

        if gateway.is_configured() {
            tracing::info!(
                merchant_id = %gateway.merchant_id(),
                environment = ?config.gateway.environment,
                "Braintree client initialized"
            );
        } else {
            tracing::warn!("Braintree credentials not configured - gateway calls will fail");
        }

        Self::build_with_gateway(config, Arc::new(gateway)).await
    }

    /// Build the application around any gateway implementation.
    pub async fn build_with_gateway(
        config: Config,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            facade: PaymentFacade::new(gateway),
            merchant_accounts: config.merchant_accounts.clone(),
            service_name: config.service_name.clone(),
        };

        // Port 0 binds a random port for testing
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("{}: HTTP on port {}", config.service_name, port);

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/customers", post(customers::create_customer))
        .route(
            "/customers/:id",
            get(customers::get_customer).delete(customers::delete_customer),
        )
        .route(
            "/customers/:id/client-token",
            post(customers::issue_client_token),
        )
        .route("/sales", post(transactions::create_sale))
        .route("/transactions/:id/refund", post(transactions::refund))
        .route(
            "/transactions/:id/payment-source",
            get(transactions::payment_source),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
