// storefront_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::orders::OrderError;
use storefront::{ChargeError, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// Malformed request body or parameters.
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Charge(#[from] ChargeError),

  #[error(transparent)]
  Order(#[from] OrderError),
}

impl AppError {
  fn class(&self) -> ErrorClass {
    match self {
      AppError::Validation(_) => ErrorClass::ValidationFailed,
      AppError::Charge(e) => e.class(),
      AppError::Order(OrderError::NotFound(_)) => ErrorClass::NotFound,
      AppError::Order(OrderError::Store(_)) | AppError::Config(_) => ErrorClass::Internal,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      _ => match self.class() {
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::PreconditionFailed => StatusCode::CONFLICT,
        ErrorClass::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorClass::ExternalServiceFailure => StatusCode::BAD_GATEWAY,
        ErrorClass::PaymentUnrecorded | ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    let class = self.class();
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, %class, "Responding with error");
    } else {
      tracing::info!(application_error = %self, %class, "Responding with error");
    }

    let body = match self {
      AppError::Charge(e) if class == ErrorClass::PaymentUnrecorded => json!({
        "error": class.as_str(),
        "message": "The payment was captured but the order could not be recorded. Contact support.",
        "payment_intent_id": e.captured_payment_intent(),
      }),
      _ if class == ErrorClass::Internal => json!({
        "error": class.as_str(),
        "message": "An internal error occurred",
      }),
      _ => json!({
        "error": class.as_str(),
        "message": self.to_string(),
      }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
