// storefront/src/checkout/submit.rs

//! Step 4: tokenize, create the processor customer, confirm the payment.

use super::{ChargeCtxData, ChargeError};
use crate::core::{ContextData, PipelineControl};
use crate::models::PostalAddress;
use crate::payment::{NewCustomer, PaymentError, PaymentIntentRequest, ProcessorAddress, ShippingDetails};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{error, info, warn};

/// Converts a major-unit amount to the processor's integer minor units (× 100).
pub fn to_minor_units(amount: Decimal) -> Result<i64, ChargeError> {
  amount
    .checked_mul(Decimal::ONE_HUNDRED)
    .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    .and_then(|minor| minor.to_i64())
    .ok_or(ChargeError::AmountOutOfRange(amount))
}

/// Logs a failed processor call with whatever processor ids exist so far.
fn processor_failure(stage: &'static str, customer_id: Option<&str>, intent_id: Option<&str>, e: PaymentError) -> ChargeError {
  match &e {
    PaymentError::Declined(_) => warn!(stage, error = %e, "Payment declined."),
    _ => error!(
      stage,
      customer_id,
      payment_intent_id = intent_id,
      error = %e,
      "Payment processor call failed; processor objects may need cleanup."
    ),
  }
  ChargeError::PaymentProcessor(e)
}

fn processor_address(address: &PostalAddress, country_code: &str) -> ProcessorAddress {
  ProcessorAddress {
    line1: address.line1.clone(),
    line2: address.line2.clone(),
    postal_code: address.postal_code.clone(),
    city: address.city.clone(),
    state: address.state.clone(),
    country: country_code.to_string(),
  }
}

/// Runs before `submit_payment`; nothing reaches the processor for a total that cannot be charged.
pub(crate) async fn guard_chargeable_total(
  ctx_data: ContextData<ChargeCtxData>,
) -> Result<PipelineControl, ChargeError> {
  let total = ctx_data.read().total;
  if total < Decimal::ZERO {
    warn!(%total, "Refusing to submit a negative total.");
    return Err(ChargeError::NegativeAmount(total));
  }
  to_minor_units(total)?;
  Ok(PipelineControl::Continue)
}

pub(crate) async fn submit_payment(ctx_data: ContextData<ChargeCtxData>) -> Result<PipelineControl, ChargeError> {
  let (payments, cart, country, total, currency) = {
    let guard = ctx_data.read();
    let country = guard.shipping_country.clone().ok_or(ChargeError::Incomplete)?;
    (
      guard.deps.payments.clone(),
      guard.cart.clone(),
      country,
      guard.total,
      guard.deps.settings.currency.clone(),
    )
  };
  let amount = to_minor_units(total)?;
  let address = processor_address(&cart.address, &country.code);

  let token = payments
    .create_card_token(&cart.card)
    .await
    .map_err(|e| processor_failure("tokenize", None, None, e))?;
  let customer = payments
    .create_customer(&NewCustomer {
      name: cart.name.clone(),
      email: cart.email.clone(),
      phone: cart.phone.clone(),
      address: address.clone(),
      source: token.id,
    })
    .await
    .map_err(|e| processor_failure("create_customer", None, None, e))?;
  ctx_data.write().customer = Some(customer.clone());

  let intent = payments
    .create_payment_intent(&PaymentIntentRequest {
      amount,
      currency,
      customer: customer.id.clone(),
      receipt_email: cart.email.clone(),
      shipping: ShippingDetails {
        name: cart.name.clone(),
        phone: cart.phone.clone(),
        address,
      },
    })
    .await
    .map_err(|e| processor_failure("create_payment_intent", Some(&customer.id), None, e))?;
  ctx_data.write().payment_intent = Some(intent.clone());
  if !intent.is_confirmed() {
    let e = PaymentError::NotConfirmed {
      id: intent.id.clone(),
      status: intent.status.clone(),
    };
    return Err(processor_failure(
      "create_payment_intent",
      Some(&customer.id),
      Some(&intent.id),
      e,
    ));
  }

  info!(
    payment_intent_id = %intent.id,
    customer_id = %customer.id,
    amount,
    "Checkout: payment confirmed."
  );
  Ok(PipelineControl::Continue)
}
