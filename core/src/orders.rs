// storefront/src/orders.rs

//! Mutations of orders after checkout.

use crate::store::{collections, DocumentStore, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Order {0} does not exist")]
  NotFound(String),

  #[error("Store error: {0}")]
  Store(#[from] StoreError),
}

/// Sets the status of order `order_id`. Status values are free text.
#[instrument(skip(store), err(Display))]
pub async fn update_order_status(store: &dyn DocumentStore, order_id: &str, status: &str) -> Result<(), OrderError> {
  if store.get(collections::ORDERS, order_id).await?.is_none() {
    return Err(OrderError::NotFound(order_id.to_string()));
  }
  match store.update(collections::ORDERS, order_id, json!({ "status": status })).await {
    Ok(()) => {}
    // Deleted between the lookup and the update.
    Err(StoreError::NotFound { .. }) => return Err(OrderError::NotFound(order_id.to_string())),
    Err(e) => return Err(e.into()),
  }
  info!("Order status updated.");
  Ok(())
}
