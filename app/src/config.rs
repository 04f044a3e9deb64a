// storefront_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use storefront::payment::stripe::DEFAULT_API_BASE;

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Postgres URL. Without one, documents live in memory for the life of the process.
  pub database_url: Option<String>,
  pub database_max_connections: u32,

  /// Stripe secret key. Without one, charges go to the mock processor.
  pub stripe_secret_key: Option<String>,
  pub stripe_api_base: String,
  pub payment_timeout: Duration,

  pub checkout_currency: String,

  /// JSON file of `{ collection: { id: document } }` written to the store at startup.
  pub catalog_seed_file: Option<PathBuf>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let optional = |var_name: &str| env::var(var_name).ok().filter(|value| !value.trim().is_empty());

    let server_host = optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", optional("SERVER_PORT"), 4000u16)?;
    let database_url = optional("DATABASE_URL");
    let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", optional("DATABASE_MAX_CONNECTIONS"), 5u32)?;

    let stripe_secret_key = optional("STRIPE_SECRET_KEY");
    let stripe_api_base = optional("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let payment_timeout = Duration::from_secs(parse_or(
      "PAYMENT_TIMEOUT_SECS",
      optional("PAYMENT_TIMEOUT_SECS"),
      30u64,
    )?);

    let checkout_currency = optional("CHECKOUT_CURRENCY")
      .unwrap_or_else(|| "sek".to_string())
      .to_lowercase();
    if checkout_currency.len() != 3 || !checkout_currency.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(AppError::Config(format!(
        "Invalid CHECKOUT_CURRENCY '{checkout_currency}': expected a three-letter ISO code"
      )));
    }

    let catalog_seed_file = optional("CATALOG_SEED_FILE").map(PathBuf::from);

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      stripe_secret_key,
      stripe_api_base,
      payment_timeout,
      checkout_currency,
      catalog_seed_file,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {var_name} '{raw}': {e}"))),
    None => Ok(default),
  }
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("database_max_connections", &self.database_max_connections)
      .field("stripe_secret_key", &self.stripe_secret_key.as_ref().map(|_| "[REDACTED]"))
      .field("stripe_api_base", &self.stripe_api_base)
      .field("payment_timeout", &self.payment_timeout)
      .field("checkout_currency", &self.checkout_currency)
      .field("catalog_seed_file", &self.catalog_seed_file)
      .finish()
  }
}
