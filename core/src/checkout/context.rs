// storefront/src/checkout/context.rs

//! State carried through one charge.

use crate::models::{CartRequest, LineItem, Order, ShippingCountry};
use crate::payment::{PaymentIntent, PaymentProcessor, ProcessorCustomer};
use crate::store::DocumentStore;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Knobs of the checkout that are not part of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
  /// ISO currency code sent to the payment processor. Two-decimal currencies only.
  pub currency: String,
}

impl Default for CheckoutSettings {
  fn default() -> Self {
    Self {
      currency: "sek".to_string(),
    }
  }
}

/// Collaborators every checkout step may use.
#[derive(Clone)]
pub struct CheckoutDeps {
  pub store: Arc<dyn DocumentStore>,
  pub payments: Arc<dyn PaymentProcessor>,
  pub settings: CheckoutSettings,
}

impl std::fmt::Debug for CheckoutDeps {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CheckoutDeps").field("settings", &self.settings).finish_non_exhaustive()
  }
}

/// Underlying data of the checkout pipeline. Steps fill it in order.
#[derive(Debug, Clone)]
pub struct ChargeCtxData {
  pub deps: CheckoutDeps,
  pub cart: CartRequest,

  /// Receipt lines accumulated so far.
  pub line_items: Vec<LineItem>,
  /// Running total in major units.
  pub total: Decimal,

  pub shipping_country: Option<ShippingCountry>,
  /// Set as soon as the processor creates the customer, so failed charges still expose it.
  pub customer: Option<ProcessorCustomer>,
  /// The intent as returned by the processor; only confirmed intents reach persistence.
  pub payment_intent: Option<PaymentIntent>,
  pub order: Option<Order>,
}

impl ChargeCtxData {
  pub fn new(deps: CheckoutDeps, cart: CartRequest) -> Self {
    Self {
      deps,
      cart,
      line_items: Vec::new(),
      total: Decimal::ZERO,
      shipping_country: None,
      customer: None,
      payment_intent: None,
      order: None,
    }
  }
}
