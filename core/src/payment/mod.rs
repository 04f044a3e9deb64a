// storefront/src/payment/mod.rs

//! Payment processor abstraction.
//!
//! The checkout makes exactly three calls per charge: tokenize the card,
//! create a customer carrying that token, then create and confirm a payment
//! intent for the customer. [`StripeClient`] talks to Stripe's REST API,
//! [`MockPaymentProcessor`] simulates it.

pub mod mock;
pub mod stripe;

pub use mock::{FailureStage, MockPaymentProcessor, ProcessorCall};
pub use stripe::{StripeClient, StripeConfig};

use crate::models::CardDetails;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
  #[error("Card declined: {0}")]
  Declined(String),

  #[error("Payment processor returned HTTP {status}: {message}")]
  Api {
    status: u16,
    code: Option<String>,
    message: String,
  },

  #[error("Payment intent {id} was not confirmed (status '{status}')")]
  NotConfirmed { id: String, status: String },

  #[error("Payment processor unreachable: {0}")]
  Transport(#[from] reqwest::Error),
}

/// A single-use token standing in for raw card details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardToken {
  pub id: String,
}

/// Address in the shape the processor expects; `country` is the canonical code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorAddress {
  pub line1: String,
  pub line2: Option<String>,
  pub postal_code: String,
  pub city: String,
  pub state: Option<String>,
  pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub address: ProcessorAddress,
  /// Card token to attach as the customer's default source.
  pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorCustomer {
  pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
  pub name: String,
  pub phone: String,
  pub address: ProcessorAddress,
}

/// A payment intent to create and confirm in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
  /// Amount in minor units (öre, cents).
  pub amount: i64,
  pub currency: String,
  pub customer: String,
  pub receipt_email: String,
  pub shipping: ShippingDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
  pub id: String,
  pub amount: i64,
  pub currency: String,
  pub status: String,
}

impl PaymentIntent {
  /// Whether funds were captured or are on their way to being captured.
  pub fn is_confirmed(&self) -> bool {
    matches!(self.status.as_str(), "succeeded" | "processing")
  }
}

/// The payment processor operations the checkout depends on.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
  async fn create_card_token(&self, card: &CardDetails) -> Result<CardToken, PaymentError>;

  async fn create_customer(&self, customer: &NewCustomer) -> Result<ProcessorCustomer, PaymentError>;

  /// Creates the payment intent with immediate confirmation. Funds move as a side effect.
  async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, PaymentError>;
}
