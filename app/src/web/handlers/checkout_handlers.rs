// storefront_server/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use storefront::CartRequest;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(
  name = "handler::charge",
  skip(app_state, cart),
  fields(email = %cart.email, items = cart.product_ids.len())
)]
pub async fn charge_handler(
  app_state: web::Data<AppState>,
  cart: web::Json<CartRequest>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.checkout.charge(cart.into_inner()).await?;
  info!(order_id = %order.order_id, "Charge accepted.");
  Ok(HttpResponse::Ok().json(order))
}
