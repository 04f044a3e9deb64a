// storefront/src/models/cart.rs

use serde::{Deserialize, Serialize};

/// Everything a shopper submits to check out (the `ChargeInput` of the API).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRequest {
  pub name: String,
  pub email: String,
  pub phone: String,

  #[serde(flatten)]
  pub address: PostalAddress,

  #[serde(flatten)]
  pub card: CardDetails,

  #[serde(default)]
  pub promotion_code: Option<String>,

  /// One price (product variant) id per purchased unit, in display order.
  #[serde(rename = "productIDs")]
  pub product_ids: Vec<String>,
}

impl CartRequest {
  /// The promotion code as typed. Any present code is looked up, even an empty one.
  pub fn promotion_code(&self) -> Option<&str> {
    self.promotion_code.as_deref()
  }
}

/// The single address collected at checkout. `country` is a shipping country key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
  pub line1: String,
  #[serde(default)]
  pub line2: Option<String>,
  pub postal_code: String,
  pub city: String,
  #[serde(default)]
  pub state: Option<String>,
  pub country: String,
}

/// Raw card fields; only ever forwarded to the payment processor for tokenization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
  pub number: String,
  pub exp_month: u32,
  pub exp_year: u32,
  pub cvc: String,
}

impl CardDetails {
  /// Last four digits, for logs and receipts.
  pub fn last4(&self) -> &str {
    let digits = self.number.trim();
    let start = digits.len().saturating_sub(4);
    digits.get(start..).unwrap_or_default()
  }
}

impl std::fmt::Debug for CardDetails {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CardDetails")
      .field("number", &format_args!("**** {}", self.last4()))
      .field("exp_month", &self.exp_month)
      .field("exp_year", &self.exp_year)
      .field("cvc", &"***")
      .finish()
  }
}
