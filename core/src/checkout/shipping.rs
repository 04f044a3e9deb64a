// storefront/src/checkout/shipping.rs

//! Step 3: add the destination's shipping fee.

use super::{require, ChargeCtxData, ChargeError};
use crate::core::{ContextData, PipelineControl};
use crate::models::{LineItem, ShippingCountry};
use crate::store::{collections, get_as};
use tracing::info;

pub const SHIPPING_LINE_ITEM: &str = "Shipping";

pub(crate) async fn add_shipping_fee(ctx_data: ContextData<ChargeCtxData>) -> Result<PipelineControl, ChargeError> {
  let (store, country_key) = {
    let guard = ctx_data.read();
    (guard.deps.store.clone(), guard.cart.address.country.clone())
  };

  let country: ShippingCountry = require(
    get_as(store.as_ref(), collections::SHIPPING_COUNTRIES, &country_key).await,
    || ChargeError::ShippingCountryNotFound(country_key.clone()),
  )?;

  let total = {
    let mut guard = ctx_data.write();
    guard.total = guard
      .total
      .checked_add(country.fee)
      .ok_or(ChargeError::AmountOutOfRange(guard.total))?;
    guard.line_items.push(LineItem::amount(SHIPPING_LINE_ITEM, country.fee));
    guard.shipping_country = Some(country.clone());
    guard.total
  };
  info!(country = %country.code, fee = %country.fee, %total, "Checkout: shipping added.");
  Ok(PipelineControl::Continue)
}
