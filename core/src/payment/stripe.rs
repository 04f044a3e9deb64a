// storefront/src/payment/stripe.rs

//! Stripe REST client covering tokens, customers and payment intents.

use super::{
  CardToken, NewCustomer, PaymentError, PaymentIntent, PaymentIntentRequest, PaymentProcessor, ProcessorAddress,
  ProcessorCustomer,
};
use crate::models::CardDetails;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{instrument, warn};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Configuration for connecting to Stripe.
#[derive(Clone)]
pub struct StripeConfig {
  pub secret_key: String,
  /// API origin, e.g. `"https://api.stripe.com"`. Overridable for stripe-mock.
  pub api_base: String,
  pub timeout: Duration,
}

impl std::fmt::Debug for StripeConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StripeConfig")
      .field("secret_key", &"[REDACTED]")
      .field("api_base", &self.api_base)
      .field("timeout", &self.timeout)
      .finish()
  }
}

/// HTTP client for the three Stripe calls a charge needs.
#[derive(Debug, Clone)]
pub struct StripeClient {
  config: StripeConfig,
  http: Client,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
  error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
  #[serde(rename = "type", default)]
  kind: Option<String>,
  #[serde(default)]
  code: Option<String>,
  #[serde(default)]
  message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
  id: String,
}

impl StripeClient {
  pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
    let http = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { config, http })
  }

  async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(String, String)]) -> Result<T, PaymentError> {
    let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
    let response = self
      .http
      .post(&url)
      .bearer_auth(&self.config.secret_key)
      .form(form)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status().as_u16();
      let text = response.text().await.unwrap_or_default();
      return Err(error_from_body(status, &text));
    }

    Ok(response.json().await?)
  }
}

fn error_from_body(status: u16, body: &str) -> PaymentError {
  let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok().map(|e| e.error);
  let message = parsed
    .as_ref()
    .and_then(|e| e.message.clone())
    .unwrap_or_else(|| format!("unexpected response: {body}"));
  if parsed.as_ref().and_then(|e| e.kind.as_deref()) == Some("card_error") {
    return PaymentError::Declined(message);
  }
  warn!(status, %message, "Stripe request failed.");
  PaymentError::Api {
    status,
    code: parsed.and_then(|e| e.code),
    message,
  }
}

fn push(form: &mut Vec<(String, String)>, key: &str, value: impl Into<String>) {
  form.push((key.to_string(), value.into()));
}

fn push_address(form: &mut Vec<(String, String)>, prefix: &str, address: &ProcessorAddress) {
  push(form, &format!("{prefix}[line1]"), address.line1.as_str());
  if let Some(line2) = &address.line2 {
    push(form, &format!("{prefix}[line2]"), line2.as_str());
  }
  push(form, &format!("{prefix}[postal_code]"), address.postal_code.as_str());
  push(form, &format!("{prefix}[city]"), address.city.as_str());
  if let Some(state) = &address.state {
    push(form, &format!("{prefix}[state]"), state.as_str());
  }
  push(form, &format!("{prefix}[country]"), address.country.as_str());
}

pub(crate) fn token_form(card: &CardDetails) -> Vec<(String, String)> {
  let mut form = Vec::new();
  push(&mut form, "card[number]", card.number.as_str());
  push(&mut form, "card[exp_month]", card.exp_month.to_string());
  push(&mut form, "card[exp_year]", card.exp_year.to_string());
  push(&mut form, "card[cvc]", card.cvc.as_str());
  form
}

pub(crate) fn customer_form(customer: &NewCustomer) -> Vec<(String, String)> {
  let mut form = Vec::new();
  push(&mut form, "name", customer.name.as_str());
  push(&mut form, "email", customer.email.as_str());
  push(&mut form, "phone", customer.phone.as_str());
  push_address(&mut form, "address", &customer.address);
  push(&mut form, "source", customer.source.as_str());
  form
}

pub(crate) fn payment_intent_form(request: &PaymentIntentRequest) -> Vec<(String, String)> {
  let mut form = Vec::new();
  push(&mut form, "amount", request.amount.to_string());
  push(&mut form, "currency", request.currency.as_str());
  push(&mut form, "confirm", "true");
  push(&mut form, "customer", request.customer.as_str());
  push(&mut form, "receipt_email", request.receipt_email.as_str());
  push(&mut form, "shipping[name]", request.shipping.name.as_str());
  push(&mut form, "shipping[phone]", request.shipping.phone.as_str());
  push_address(&mut form, "shipping[address]", &request.shipping.address);
  form
}

#[async_trait]
impl PaymentProcessor for StripeClient {
  #[instrument(skip_all, fields(last4 = card.last4()), err)]
  async fn create_card_token(&self, card: &CardDetails) -> Result<CardToken, PaymentError> {
    let token: IdOnly = self.post_form("/v1/tokens", &token_form(card)).await?;
    Ok(CardToken { id: token.id })
  }

  #[instrument(skip_all, fields(email = %customer.email), err)]
  async fn create_customer(&self, customer: &NewCustomer) -> Result<ProcessorCustomer, PaymentError> {
    let created: IdOnly = self.post_form("/v1/customers", &customer_form(customer)).await?;
    Ok(ProcessorCustomer { id: created.id })
  }

  #[instrument(skip_all, fields(amount = request.amount, currency = %request.currency), err)]
  async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, PaymentError> {
    self.post_form("/v1/payment_intents", &payment_intent_form(request)).await
  }
}
