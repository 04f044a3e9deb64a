// storefront/src/checkout/persist.rs

//! Step 5: record the order and customer of a confirmed payment.

use super::{ChargeCtxData, ChargeError};
use crate::core::{ContextData, PipelineControl};
use crate::models::{Address, CartRequest, Customer, LineItem, Order, ShippingCountry, ORDER_PLACED};
use crate::payment::{PaymentIntent, ProcessorCustomer};
use crate::store::{collections, encode, DocumentStore, StoreError, WriteBatch};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{error, info, warn};

/// Builds the order document of a confirmed charge. Its id is the payment intent id.
pub fn build_order(
  cart: &CartRequest,
  country: &ShippingCountry,
  intent: &PaymentIntent,
  customer: &ProcessorCustomer,
  line_items: Vec<LineItem>,
  total: Decimal,
  now: DateTime<Utc>,
) -> Order {
  Order {
    order_id: intent.id.clone(),
    customer_id: customer.id.clone(),
    product_ids: cart.product_ids.clone(),
    status: ORDER_PLACED.to_string(),
    timestamp: now,
    amount: total,
    line_items,
    shipping_address: Address::shipping(&cart.address, &country.name),
  }
}

pub fn build_customer(
  cart: &CartRequest,
  country: &ShippingCountry,
  customer: &ProcessorCustomer,
  now: DateTime<Utc>,
) -> Customer {
  Customer {
    customer_id: customer.id.clone(),
    name: cart.name.clone(),
    email: cart.email.clone(),
    phone: cart.phone.clone(),
    timestamp: now,
    billing_address: Address::billing(&cart.address, &country.name),
    shipping_address: Address::shipping(&cart.address, &country.name),
  }
}

fn order_batch(order: &Order, customer: &Customer) -> Result<WriteBatch, StoreError> {
  let order_doc = encode(collections::ORDERS, order)?;
  let customer_doc = encode(collections::CUSTOMERS, customer)?;
  Ok(
    WriteBatch::new()
      .insert(collections::ORDERS, Some(&order.order_id), order_doc)
      .insert(collections::CUSTOMERS, None, customer_doc),
  )
}

/// Leaves a trail for an operator after a charge that could not be recorded.
async fn record_unreconciled(store: &dyn DocumentStore, order: &Order, customer: &Customer, cause: &StoreError) {
  let record = json!({
    "payment_intent_id": order.order_id,
    "customer_id": order.customer_id,
    "amount": order.amount,
    "error": cause.to_string(),
    "timestamp": Utc::now(),
    "order": serde_json::to_value(order).ok(),
    "customer": serde_json::to_value(customer).ok(),
  });
  match store
    .insert(collections::UNRECONCILED_CHARGES, Some(&order.order_id), record)
    .await
  {
    Ok(_) => warn!(payment_intent_id = %order.order_id, "Unreconciled charge recorded."),
    Err(e) => error!(
      payment_intent_id = %order.order_id,
      error = %e,
      "Could not record the unreconciled charge either."
    ),
  }
}

pub(crate) async fn persist_order(ctx_data: ContextData<ChargeCtxData>) -> Result<PipelineControl, ChargeError> {
  let (store, order, customer) = {
    let guard = ctx_data.read();
    let (Some(country), Some(intent), Some(processor_customer)) =
      (&guard.shipping_country, &guard.payment_intent, &guard.customer)
    else {
      return Err(ChargeError::Incomplete);
    };
    let now = Utc::now();
    let order = build_order(
      &guard.cart,
      country,
      intent,
      processor_customer,
      guard.line_items.clone(),
      guard.total,
      now,
    );
    let customer = build_customer(&guard.cart, country, processor_customer, now);
    (guard.deps.store.clone(), order, customer)
  };

  let committed = match order_batch(&order, &customer) {
    Ok(batch) => store.commit(batch).await,
    Err(e) => Err(e),
  };
  if let Err(source) = committed {
    error!(
      payment_intent_id = %order.order_id,
      customer_id = %order.customer_id,
      error = %source,
      "Payment captured but the order was not stored."
    );
    record_unreconciled(store.as_ref(), &order, &customer, &source).await;
    return Err(ChargeError::PersistenceFailed {
      payment_intent_id: order.order_id,
      customer_id: order.customer_id,
      source,
    });
  }

  info!(order_id = %order.order_id, amount = %order.amount, "Checkout: order stored.");
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}
