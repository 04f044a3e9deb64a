// storefront_server/src/web/routes.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::web;

async fn health_check_handler(app_state: web::Data<AppState>) -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "currency": app_state.config.checkout_currency,
  }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Body decoding failures answer with the same JSON error shape as everything else.
  let json_config =
    web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into());

  cfg.app_data(json_config).service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route(
        "/charge",
        web::post().to(crate::web::handlers::checkout_handlers::charge_handler),
      )
      .route(
        "/orders/{order_id}/status",
        web::patch().to(crate::web::handlers::order_handlers::update_status_handler),
      ),
  );
}
