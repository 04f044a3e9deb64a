// storefront/src/checkout/pricing.rs

//! Step 1: resolve every cart entry to a priced line item.

use super::{require, ChargeCtxData, ChargeError};
use crate::core::{ContextData, PipelineControl};
use crate::models::{LineItem, PriceRecord, Product};
use crate::store::{collections, get_as};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Prices an in-stock price record once its owning product is known.
pub fn price_line_item(price_id: &str, price: &PriceRecord, product: &Product) -> Result<LineItem, ChargeError> {
  if !product.is_active() {
    return Err(ChargeError::ProductInactive(price_id.to_string()));
  }
  Ok(LineItem::amount(product.name.clone(), price.unit_amount()))
}

pub(crate) async fn resolve_line_items(ctx_data: ContextData<ChargeCtxData>) -> Result<PipelineControl, ChargeError> {
  let (store, price_ids) = {
    let guard = ctx_data.read();
    (guard.deps.store.clone(), guard.cart.product_ids.clone())
  };
  if price_ids.is_empty() {
    return Err(ChargeError::EmptyCart);
  }

  let mut line_items = Vec::with_capacity(price_ids.len() + 2);
  let mut total = Decimal::ZERO;
  for price_id in &price_ids {
    let price: PriceRecord = require(
      get_as(store.as_ref(), collections::PRICES, price_id).await,
      || ChargeError::PriceNotFound(price_id.clone()),
    )?;
    // Stock is checked before the owning product is looked up.
    if !price.in_stock() {
      return Err(ChargeError::OutOfStock(price_id.clone()));
    }
    let product: Product = require(
      get_as(store.as_ref(), collections::PRODUCTS, &price.product_id).await,
      || ChargeError::ProductNotFound(price_id.clone()),
    )?;

    let item = price_line_item(price_id, &price, &product)?;
    debug!(%price_id, product = %item.name, amount = %item.amount, "Line item priced.");
    total = total
      .checked_add(price.unit_amount())
      .ok_or(ChargeError::AmountOutOfRange(total))?;
    line_items.push(item);
  }

  {
    let mut guard = ctx_data.write();
    guard.line_items = line_items;
    guard.total = total;
  }
  info!(items = price_ids.len(), subtotal = %total, "Checkout: cart priced.");
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn price(quantity: i64) -> PriceRecord {
    PriceRecord {
      price: Decimal::from(100),
      discounted_price: Some(Decimal::from(80)),
      size: "M".into(),
      quantity,
      product_id: "prod-1".into(),
    }
  }

  fn product(active: i64) -> Product {
    Product {
      name: "Linen shirt".into(),
      article_number: 1,
      description: None,
      active,
      created: None,
      updated: None,
    }
  }

  #[test]
  fn prices_with_discount() {
    let item = price_line_item("price-1", &price(2), &product(1)).unwrap();
    assert_eq!(item, LineItem::amount("Linen shirt", Decimal::from(80)));
  }

  #[test]
  fn inactive_products_cannot_be_bought() {
    let err = price_line_item("price-1", &price(5), &product(0)).unwrap_err();
    assert!(matches!(err, ChargeError::ProductInactive(id) if id == "price-1"));
  }
}
