// storefront/src/models/catalog.rs

//! Catalog documents the checkout validates a cart against.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable variant (size) of a product, document of `prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
  pub price: Decimal,
  #[serde(default, alias = "discountedPrice")]
  pub discounted_price: Option<Decimal>,
  #[serde(default)]
  pub size: String,
  pub quantity: i64,
  #[serde(rename = "productID")]
  pub product_id: String,
}

impl PriceRecord {
  /// The discounted price when one is set, else the base price.
  pub fn unit_amount(&self) -> Decimal {
    self.discounted_price.unwrap_or(self.price)
  }

  pub fn in_stock(&self) -> bool {
    self.quantity > 0
  }
}

/// Document of `products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub name: String,
  #[serde(rename = "articleNumber", default)]
  pub article_number: i64,
  #[serde(default)]
  pub description: Option<String>,
  /// 0 = inactive, anything else = active.
  pub active: i64,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated: Option<DateTime<Utc>>,
}

impl Product {
  pub fn is_active(&self) -> bool {
    self.active != 0
  }
}

/// Document of `promotion_codes`. `code` is stored upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionCode {
  pub code: String,
  #[serde(default)]
  pub amount_off: Option<Decimal>,
  #[serde(default)]
  pub percent_off: Option<Decimal>,
}

/// Document of `shipping_countries`, keyed by the country code shoppers submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingCountry {
  pub name: String,
  /// Canonical code sent to the payment processor; may differ in case from the key.
  pub code: String,
  pub fee: Decimal,
}
