// storefront/src/checkout/error.rs

use crate::error::PipelineError;
use crate::payment::PaymentError;
use crate::store::StoreError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Why a promotion code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionRejection {
  /// No promotion with that code exists.
  Unknown,
  /// The stored percent discount lies outside 0–100.
  PercentOutOfRange(Decimal),
}

impl fmt::Display for PromotionRejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PromotionRejection::Unknown => write!(f, "no such promotion code"),
      PromotionRejection::PercentOutOfRange(percent) => write!(f, "percent off {percent} is outside 0-100"),
    }
  }
}

/// Every way a charge can fail. All of them abort the whole charge.
#[derive(Debug, Error)]
pub enum ChargeError {
  #[error("Cart contains no items")]
  EmptyCart,

  #[error("Price {0} does not exist")]
  PriceNotFound(String),

  #[error("Price {0} is out of stock")]
  OutOfStock(String),

  #[error("Product for price {0} does not exist")]
  ProductNotFound(String),

  #[error("Product for price {0} is not active")]
  ProductInactive(String),

  #[error("Promotion code '{code}' is invalid: {reason}")]
  PromotionCodeInvalid { code: String, reason: PromotionRejection },

  #[error("Order total {0} is negative")]
  NegativeAmount(Decimal),

  #[error("Order total {0} cannot be charged in minor units")]
  AmountOutOfRange(Decimal),

  #[error("Shipping country '{0}' does not exist")]
  ShippingCountryNotFound(String),

  #[error("Payment processor error: {0}")]
  PaymentProcessor(#[from] PaymentError),

  /// Funds were captured but the order and customer documents were not written.
  #[error("Payment {payment_intent_id} was captured but the order could not be stored: {source}")]
  PersistenceFailed {
    payment_intent_id: String,
    customer_id: String,
    #[source]
    source: StoreError,
  },

  #[error("Store error: {0}")]
  Store(#[from] StoreError),

  #[error("Checkout pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Checkout finished without producing an order")]
  Incomplete,
}

/// Coarse failure classes, for callers deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// The cart references catalog entries that do not exist.
  NotFound,
  /// The catalog forbids the purchase right now.
  PreconditionFailed,
  /// The cart or promotion produces an amount that cannot be charged.
  ValidationFailed,
  /// The payment processor failed; no order exists.
  ExternalServiceFailure,
  /// Money moved but no order was recorded. Needs an operator.
  PaymentUnrecorded,
  Internal,
}

impl ErrorClass {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorClass::NotFound => "not_found",
      ErrorClass::PreconditionFailed => "precondition_failed",
      ErrorClass::ValidationFailed => "validation_failed",
      ErrorClass::ExternalServiceFailure => "external_service_failure",
      ErrorClass::PaymentUnrecorded => "payment_unrecorded",
      ErrorClass::Internal => "internal",
    }
  }
}

impl fmt::Display for ErrorClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl ChargeError {
  pub fn class(&self) -> ErrorClass {
    match self {
      ChargeError::PriceNotFound(_) | ChargeError::ProductNotFound(_) | ChargeError::ShippingCountryNotFound(_) => {
        ErrorClass::NotFound
      }
      ChargeError::PromotionCodeInvalid {
        reason: PromotionRejection::Unknown,
        ..
      } => ErrorClass::NotFound,
      ChargeError::PromotionCodeInvalid {
        reason: PromotionRejection::PercentOutOfRange(_),
        ..
      } => ErrorClass::ValidationFailed,
      ChargeError::OutOfStock(_) | ChargeError::ProductInactive(_) => ErrorClass::PreconditionFailed,
      ChargeError::EmptyCart | ChargeError::NegativeAmount(_) | ChargeError::AmountOutOfRange(_) => {
        ErrorClass::ValidationFailed
      }
      ChargeError::PaymentProcessor(_) => ErrorClass::ExternalServiceFailure,
      ChargeError::PersistenceFailed { .. } => ErrorClass::PaymentUnrecorded,
      ChargeError::Store(_) | ChargeError::Pipeline(_) | ChargeError::Incomplete => ErrorClass::Internal,
    }
  }

  /// The captured payment intent, for failures that happened after funds moved.
  pub fn captured_payment_intent(&self) -> Option<&str> {
    match self {
      ChargeError::PersistenceFailed { payment_intent_id, .. } => Some(payment_intent_id),
      _ => None,
    }
  }
}
