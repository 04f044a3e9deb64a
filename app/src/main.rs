// storefront_server/src/main.rs

mod config;
mod errors;
mod seed;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use storefront::payment::{MockPaymentProcessor, PaymentProcessor, StripeClient, StripeConfig};
use storefront::store::{DocumentStore, MemoryStore, PgDocumentStore};
use storefront::{CheckoutService, CheckoutSettings};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
  match &config.database_url {
    Some(url) => {
      let store = PgDocumentStore::connect(url, config.database_max_connections)
        .await
        .context("connecting to the database")?;
      store.ensure_schema().await.context("creating the documents table")?;
      tracing::info!("Successfully connected to the database.");
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL not set, documents are kept in memory only.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

fn payment_processor(config: &AppConfig) -> anyhow::Result<Arc<dyn PaymentProcessor>> {
  match &config.stripe_secret_key {
    Some(secret_key) => {
      let client = StripeClient::new(StripeConfig {
        secret_key: secret_key.clone(),
        api_base: config.stripe_api_base.clone(),
        timeout: config.payment_timeout,
      })
      .context("building the Stripe client")?;
      tracing::info!(api_base = %config.stripe_api_base, "Charging through Stripe.");
      Ok(Arc::new(client))
    }
    None => {
      tracing::warn!("STRIPE_SECRET_KEY not set, charging through the mock payment processor.");
      Ok(Arc::new(MockPaymentProcessor::new()))
    }
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);
  tracing::debug!(config = ?app_config, "Loaded configuration.");

  let store = connect_store(&app_config).await?;
  if let Some(path) = &app_config.catalog_seed_file {
    seed::seed_catalog_file(store.as_ref(), path).await?;
  }

  let checkout = CheckoutService::new(
    store.clone(),
    payment_processor(&app_config)?,
    CheckoutSettings {
      currency: app_config.checkout_currency.clone(),
    },
  );

  let app_state = AppState {
    checkout: Arc::new(checkout),
    store,
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {server_address}"))?
  .run()
  .await
  .context("running the HTTP server")
}
