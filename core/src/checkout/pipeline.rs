// storefront/src/checkout/pipeline.rs

use super::{persist, pricing, promotion, shipping, submit, ChargeCtxData, ChargeError};
use crate::core::{ContextData, SkipCondition};
use crate::pipeline::definition::Pipeline;
use std::sync::Arc;

pub const RESOLVE_LINE_ITEMS: &str = "resolve_line_items";
pub const APPLY_PROMOTION_CODE: &str = "apply_promotion_code";
pub const ADD_SHIPPING_FEE: &str = "add_shipping_fee";
pub const SUBMIT_PAYMENT: &str = "submit_payment";
pub const PERSIST_ORDER: &str = "persist_order";

/// Builds the five-step charge pipeline.
pub fn charge_pipeline() -> Pipeline<ChargeCtxData, ChargeError> {
  let no_promotion: SkipCondition<ChargeCtxData> =
    Arc::new(|ctx: ContextData<ChargeCtxData>| ctx.read().cart.promotion_code().is_none());

  let mut p = Pipeline::new(&[
    (RESOLVE_LINE_ITEMS, false, None),
    (APPLY_PROMOTION_CODE, true, Some(no_promotion)),
    (ADD_SHIPPING_FEE, false, None),
    (SUBMIT_PAYMENT, false, None),
    (PERSIST_ORDER, false, None),
  ]);

  p.on_root(RESOLVE_LINE_ITEMS, pricing::resolve_line_items);
  p.on_root(APPLY_PROMOTION_CODE, promotion::apply_promotion_code);
  p.on_root(ADD_SHIPPING_FEE, shipping::add_shipping_fee);
  p.before_root(SUBMIT_PAYMENT, submit::guard_chargeable_total);
  p.on_root(SUBMIT_PAYMENT, submit::submit_payment);
  p.on_root(PERSIST_ORDER, persist::persist_order);
  p
}
