// storefront_server/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use storefront::store::DocumentStore;
use storefront::CheckoutService;

#[derive(Clone)]
pub struct AppState {
  pub checkout: Arc<CheckoutService>,
  pub store: Arc<dyn DocumentStore>,
  pub config: Arc<AppConfig>,
}
