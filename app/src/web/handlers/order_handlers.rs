// storefront_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::orders::update_order_status;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct StatusUpdate {
  pub status: String,
}

#[instrument(name = "handler::update_order_status", skip(app_state, path, payload), fields(order_id = %path.as_ref()))]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let status = payload.into_inner().status;
  if status.trim().is_empty() {
    return Err(AppError::Validation("status must not be empty".to_string()));
  }

  update_order_status(app_state.store.as_ref(), &order_id, status.trim()).await?;
  Ok(HttpResponse::Ok().json(json!({ "updated": true })))
}
