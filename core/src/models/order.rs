// storefront/src/models/order.rs

use super::cart::PostalAddress;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Status every order starts in. Later statuses are free text.
pub const ORDER_PLACED: &str = "Order Placed";

/// Document of `orders`, stored under its `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  /// The payment processor's payment intent id.
  #[serde(rename = "orderID")]
  pub order_id: String,
  /// The payment processor's customer id.
  #[serde(rename = "customerID")]
  pub customer_id: String,
  #[serde(rename = "productIDs")]
  pub product_ids: Vec<String>,

  pub status: String,
  pub timestamp: DateTime<Utc>,
  pub amount: Decimal,

  pub line_items: Vec<LineItem>,
  pub shipping_address: Address,
}

/// One entry of an order's receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub name: String,
  pub amount: LineAmount,
}

impl LineItem {
  pub fn amount(name: impl Into<String>, amount: Decimal) -> Self {
    Self {
      name: name.into(),
      amount: LineAmount::Amount(amount),
    }
  }

  pub fn percent_off(name: impl Into<String>, percent: Decimal) -> Self {
    Self {
      name: name.into(),
      amount: LineAmount::PercentOff(percent),
    }
  }
}

/// A signed amount, or a display-only percentage discount.
///
/// Amounts serialize as numbers, percentages as labels such as `"-10%"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAmount {
  Amount(Decimal),
  PercentOff(Decimal),
}

impl LineAmount {
  /// The monetary value, `None` for percentage labels.
  pub fn value(&self) -> Option<Decimal> {
    match self {
      LineAmount::Amount(amount) => Some(*amount),
      LineAmount::PercentOff(_) => None,
    }
  }
}

impl fmt::Display for LineAmount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LineAmount::Amount(amount) => write!(f, "{amount}"),
      LineAmount::PercentOff(percent) => write!(f, "-{percent}%"),
    }
  }
}

impl Serialize for LineAmount {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      LineAmount::Amount(amount) => Serialize::serialize(amount, serializer),
      LineAmount::PercentOff(_) => serializer.serialize_str(&self.to_string()),
    }
  }
}

impl<'de> Deserialize<'de> for LineAmount {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Amount(Decimal),
      Label(String),
    }

    match Raw::deserialize(deserializer)? {
      Raw::Amount(amount) => Ok(LineAmount::Amount(amount)),
      Raw::Label(label) => label
        .strip_prefix('-')
        .and_then(|rest| rest.strip_suffix('%'))
        .and_then(|percent| percent.parse::<Decimal>().ok())
        .map(LineAmount::PercentOff)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid line item amount '{label}'"))),
    }
  }
}

/// Fixed coordinates stamped on every shipping address; no geocoding is done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude: f64,
  pub longitude: f64,
}

impl Location {
  pub const PLACEHOLDER: Location = Location {
    latitude: 0.1,
    longitude: 0.2,
  };
}

/// An address as stored on orders and customers. `country` is the display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub line1: String,
  #[serde(default)]
  pub line2: Option<String>,
  pub postal_code: String,
  #[serde(default)]
  pub state: Option<String>,
  pub city: String,
  pub country: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<Location>,
}

impl Address {
  pub fn billing(address: &PostalAddress, country_name: &str) -> Self {
    Self {
      line1: address.line1.clone(),
      line2: address.line2.clone(),
      postal_code: address.postal_code.clone(),
      state: address.state.clone(),
      city: address.city.clone(),
      country: country_name.to_string(),
      location: None,
    }
  }

  pub fn shipping(address: &PostalAddress, country_name: &str) -> Self {
    Self {
      location: Some(Location::PLACEHOLDER),
      ..Self::billing(address, country_name)
    }
  }
}
