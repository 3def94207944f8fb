//! Billing service entry point.
//!
//! Wires configuration, stores, payment strategies and the HTTP surface
//! together and serves the REST API.

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aluna_billing::adapters::gateway::MockSettlementClient;
use aluna_billing::adapters::http::{billing_router, BillingAppState};
use aluna_billing::adapters::memory::{InMemoryCatalog, InMemoryUserDirectory};
use aluna_billing::adapters::postgres::{PostgresPurchaseStore, PostgresTransactionStore};
use aluna_billing::adapters::strategies::default_registry;
use aluna_billing::config::AppConfig;
use aluna_billing::domain::transaction::SettlementWebhookVerifier;
use aluna_billing::ports::SettlementClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            config.server.log_level.clone(),
        ))
        .init();

    info!("Starting Aluna billing service");

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    // The catalog service and user directory are owned by other teams;
    // until their clients land, seeded in-memory views stand in.
    let catalog = Arc::new(InMemoryCatalog::new());
    let user_directory = Arc::new(InMemoryUserDirectory::new());

    // TODO: swap in an HTTP gateway client once the processor publishes
    // its charge API; the mock keeps card flows working meanwhile.
    let settlement_client: Arc<dyn SettlementClient> = Arc::new(MockSettlementClient::approving());

    let state = BillingAppState {
        transaction_store: Arc::new(PostgresTransactionStore::new(pool.clone())),
        purchase_store: Arc::new(PostgresPurchaseStore::new(pool)),
        user_directory,
        catalog,
        strategies: Arc::new(default_registry(settlement_client)),
        webhook_verifier: Arc::new(SettlementWebhookVerifier::new(
            config.payment.webhook_secret.clone(),
        )),
    };

    let cors = if config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    };

    let app = Router::new()
        .nest("/api", billing_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
