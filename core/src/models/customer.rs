// storefront/src/models/customer.rs

use super::order::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document of `customers`. A new one is written for every successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  /// Mirrors the payment processor's customer id.
  #[serde(rename = "customerID")]
  pub customer_id: String,
  pub name: String,
  pub email: String,
  pub phone: String,
  pub timestamp: DateTime<Utc>,

  pub billing_address: Address,
  pub shipping_address: Address,
}
