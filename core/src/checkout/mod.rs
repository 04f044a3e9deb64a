// storefront/src/checkout/mod.rs

//! The charge orchestrator.
//!
//! [`CheckoutService::charge`] turns a [`CartRequest`] into a paid, persisted
//! [`Order`]. Validation and pricing finish before the payment processor is
//! contacted; once a payment intent is confirmed the only remaining failure is
//! [`ChargeError::PersistenceFailed`].
//!
//! A charge is not idempotent: submitting the same cart twice charges twice.

mod context;
mod error;
mod persist;
mod pipeline;
mod pricing;
mod promotion;
mod shipping;
mod submit;

pub use context::{ChargeCtxData, CheckoutDeps, CheckoutSettings};
pub use error::{ChargeError, ErrorClass, PromotionRejection};
pub use persist::{build_customer, build_order};
pub use pipeline::{
  charge_pipeline, ADD_SHIPPING_FEE, APPLY_PROMOTION_CODE, PERSIST_ORDER, RESOLVE_LINE_ITEMS, SUBMIT_PAYMENT,
};
pub use pricing::price_line_item;
pub use promotion::apply_promotion;
pub use shipping::SHIPPING_LINE_ITEM;
pub use submit::to_minor_units;

use crate::core::{ContextData, PipelineResult};
use crate::models::{CartRequest, Order};
use crate::payment::PaymentProcessor;
use crate::pipeline::definition::Pipeline;
use crate::store::{DocumentStore, StoreError, StoreResult};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Maps a typed lookup to the charge's domain error.
///
/// A missing document and one that no longer decodes both count as missing.
pub(crate) fn require<T>(found: StoreResult<Option<T>>, missing: impl FnOnce() -> ChargeError) -> Result<T, ChargeError> {
  match found {
    Ok(Some(value)) => Ok(value),
    Ok(None) => Err(missing()),
    Err(e @ StoreError::Decode { .. }) => {
      warn!(error = %e, "Malformed document treated as missing.");
      Err(missing())
    }
    Err(e) => Err(ChargeError::Store(e)),
  }
}

/// Runs charges. Cheap to share behind an `Arc`; every call gets its own context.
pub struct CheckoutService {
  deps: CheckoutDeps,
  pipeline: Arc<Pipeline<ChargeCtxData, ChargeError>>,
}

impl CheckoutService {
  pub fn new(store: Arc<dyn DocumentStore>, payments: Arc<dyn PaymentProcessor>, settings: CheckoutSettings) -> Self {
    Self {
      deps: CheckoutDeps {
        store,
        payments,
        settings,
      },
      pipeline: Arc::new(charge_pipeline()),
    }
  }

  /// Validates, prices, charges and records `cart`.
  #[instrument(
    name = "CheckoutService::charge",
    skip_all,
    fields(email = %cart.email, items = cart.product_ids.len())
  )]
  pub async fn charge(&self, cart: CartRequest) -> Result<Order, ChargeError> {
    let ctx_data = ContextData::new(ChargeCtxData::new(self.deps.clone(), cart));

    let outcome = self.pipeline.run(ctx_data.clone()).await;
    let result = match outcome {
      Ok(PipelineResult::Completed) => ctx_data.write().order.take().ok_or(ChargeError::Incomplete),
      Ok(PipelineResult::Stopped) => Err(ChargeError::Incomplete),
      Err(e) => Err(e),
    };

    match &result {
      Ok(order) => info!(order_id = %order.order_id, amount = %order.amount, "Charge completed."),
      Err(e) => match e.class() {
        ErrorClass::ExternalServiceFailure => {
          let guard = ctx_data.read();
          error!(
            class = %e.class(),
            customer_id = guard.customer.as_ref().map(|c| c.id.as_str()),
            payment_intent_id = guard.payment_intent.as_ref().map(|pi| pi.id.as_str()),
            error = %e,
            "Charge failed at the payment processor."
          )
        }
        ErrorClass::PaymentUnrecorded | ErrorClass::Internal => {
          error!(class = %e.class(), error = %e, "Charge failed.")
        }
        class => warn!(%class, error = %e, "Charge rejected."),
      },
    }
    result
  }
}

impl std::fmt::Debug for CheckoutService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CheckoutService")
      .field("deps", &self.deps)
      .field("steps", &self.pipeline.step_names())
      .finish()
  }
}
