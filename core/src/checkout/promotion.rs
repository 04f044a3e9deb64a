// storefront/src/checkout/promotion.rs

//! Step 2: apply a promotion code to the subtotal.

use super::{require, ChargeCtxData, ChargeError, PromotionRejection};
use crate::core::{ContextData, PipelineControl};
use crate::models::{LineItem, PromotionCode};
use crate::store::{collections, find_first_as};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use tracing::info;

/// Applies `promotion` to `total`, returning the new total and the receipt lines to append.
///
/// A flat amount is taken off first, then the percentage of what remains.
/// The percentage discount is rounded to two decimals.
pub fn apply_promotion(total: Decimal, promotion: &PromotionCode) -> Result<(Decimal, Vec<LineItem>), ChargeError> {
  let label = format!("Promotion code {}", promotion.code);
  let mut total = total;
  let mut lines = Vec::new();

  if let Some(amount_off) = promotion.amount_off {
    total = total.checked_sub(amount_off).ok_or(ChargeError::AmountOutOfRange(total))?;
    lines.push(LineItem::amount(label.clone(), -amount_off));
  }

  if let Some(percent_off) = promotion.percent_off {
    if percent_off < Decimal::ZERO || percent_off > Decimal::ONE_HUNDRED {
      return Err(ChargeError::PromotionCodeInvalid {
        code: promotion.code.clone(),
        reason: PromotionRejection::PercentOutOfRange(percent_off),
      });
    }
    let discount = total
      .checked_mul(percent_off / Decimal::ONE_HUNDRED)
      .ok_or(ChargeError::AmountOutOfRange(total))?
      .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    total = total.checked_sub(discount).ok_or(ChargeError::AmountOutOfRange(total))?;
    lines.push(LineItem::percent_off(label, percent_off));
  }

  if total < Decimal::ZERO {
    return Err(ChargeError::NegativeAmount(total));
  }
  Ok((total, lines))
}

pub(crate) async fn apply_promotion_code(ctx_data: ContextData<ChargeCtxData>) -> Result<PipelineControl, ChargeError> {
  let (store, code, subtotal) = {
    let guard = ctx_data.read();
    let code = guard.cart.promotion_code().map(str::to_uppercase);
    (guard.deps.store.clone(), code, guard.total)
  };
  let Some(code) = code else {
    return Ok(PipelineControl::Continue);
  };

  let promotion: PromotionCode = require(
    find_first_as(store.as_ref(), collections::PROMOTION_CODES, "code", &json!(code)).await,
    || ChargeError::PromotionCodeInvalid {
      code: code.clone(),
      reason: PromotionRejection::Unknown,
    },
  )?;

  let (total, lines) = apply_promotion(subtotal, &promotion)?;
  {
    let mut guard = ctx_data.write();
    guard.total = total;
    guard.line_items.extend(lines);
  }
  info!(%code, %subtotal, %total, "Checkout: promotion applied.");
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::LineAmount;

  fn promo(amount_off: Option<i64>, percent_off: Option<i64>) -> PromotionCode {
    PromotionCode {
      code: "SPRING".into(),
      amount_off: amount_off.map(Decimal::from),
      percent_off: percent_off.map(Decimal::from),
    }
  }

  #[test]
  fn percent_discount_is_taken_from_the_subtotal() {
    let (total, lines) = apply_promotion(Decimal::from(180), &promo(None, Some(10))).unwrap();
    assert_eq!(total, Decimal::from(162));
    assert_eq!(lines, vec![LineItem::percent_off("Promotion code SPRING", Decimal::from(10))]);
  }

  #[test]
  fn flat_discount_adds_a_negative_line() {
    let (total, lines) = apply_promotion(Decimal::from(180), &promo(Some(30), None)).unwrap();
    assert_eq!(total, Decimal::from(150));
    assert_eq!(lines[0].amount, LineAmount::Amount(Decimal::from(-30)));
  }

  #[test]
  fn both_kinds_apply_flat_first() {
    // (200 - 50) * 0.8
    let (total, lines) = apply_promotion(Decimal::from(200), &promo(Some(50), Some(20))).unwrap();
    assert_eq!(total, Decimal::from(120));
    assert_eq!(lines.len(), 2);
  }

  #[test]
  fn percent_above_hundred_is_invalid() {
    let err = apply_promotion(Decimal::from(180), &promo(None, Some(150))).unwrap_err();
    assert!(matches!(
      err,
      ChargeError::PromotionCodeInvalid {
        reason: PromotionRejection::PercentOutOfRange(_),
        ..
      }
    ));
  }

  #[test]
  fn full_percent_discount_is_allowed() {
    let (total, _) = apply_promotion(Decimal::from(99), &promo(None, Some(100))).unwrap();
    assert_eq!(total, Decimal::ZERO);
  }

  #[test]
  fn flat_discount_beyond_subtotal_goes_negative() {
    let err = apply_promotion(Decimal::from(50), &promo(Some(80), None)).unwrap_err();
    assert!(matches!(err, ChargeError::NegativeAmount(total) if total == Decimal::from(-30)));
  }

  #[test]
  fn full_discount_of_a_huge_subtotal_does_not_overflow() {
    let total = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let (total, _) = apply_promotion(total, &promo(None, Some(100))).unwrap();
    assert_eq!(total, Decimal::ZERO);
  }

  #[test]
  fn flat_discount_past_the_decimal_range_is_out_of_range() {
    let err = apply_promotion(Decimal::MIN, &promo(Some(1), None)).unwrap_err();
    assert!(matches!(err, ChargeError::AmountOutOfRange(_)));
  }

  #[test]
  fn fractional_discounts_round_to_cents() {
    // 33.33 * 0.15 = 4.9995
    let total = Decimal::new(3333, 2);
    let (total, _) = apply_promotion(total, &promo(None, Some(15))).unwrap();
    assert_eq!(total, Decimal::new(2833, 2));
  }
}
