// storefront/src/payment/mock.rs

use super::{
  CardToken, NewCustomer, PaymentError, PaymentIntent, PaymentIntentRequest, PaymentProcessor, ProcessorCustomer,
};
use crate::models::CardDetails;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Card numbers ending with this are declined, like Stripe's `4000000000000002`.
pub const DECLINED_CARD_SUFFIX: &str = "0002";

/// Which call the mock should fail, for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
  Tokenize,
  CreateCustomer,
  CreatePaymentIntent,
}

/// A call received by the mock, in order of arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorCall {
  Tokenize { last4: String },
  CreateCustomer { email: String, country: String, source: String },
  CreatePaymentIntent { amount: i64, currency: String, customer: String },
}

/// In-process payment processor with simulated latency and a call journal.
#[derive(Debug, Default)]
pub struct MockPaymentProcessor {
  latency: Duration,
  fail_at: Option<FailureStage>,
  journal: Mutex<Vec<ProcessorCall>>,
}

impl MockPaymentProcessor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn failing_at(mut self, stage: FailureStage) -> Self {
    self.fail_at = Some(stage);
    self
  }

  /// Every call received so far.
  pub fn calls(&self) -> Vec<ProcessorCall> {
    self.journal.lock().clone()
  }

  /// Payment intents created so far.
  pub fn payment_intents(&self) -> Vec<ProcessorCall> {
    self
      .calls()
      .into_iter()
      .filter(|call| matches!(call, ProcessorCall::CreatePaymentIntent { .. }))
      .collect()
  }

  async fn simulate(&self, stage: FailureStage, call: ProcessorCall) -> Result<(), PaymentError> {
    self.journal.lock().push(call);
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    if self.fail_at == Some(stage) {
      return Err(PaymentError::Api {
        status: 500,
        code: Some("mock_failure".to_string()),
        message: format!("Simulated failure at {stage:?}"),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
  #[instrument(skip_all, fields(last4 = card.last4()))]
  async fn create_card_token(&self, card: &CardDetails) -> Result<CardToken, PaymentError> {
    self
      .simulate(
        FailureStage::Tokenize,
        ProcessorCall::Tokenize {
          last4: card.last4().to_string(),
        },
      )
      .await?;
    if card.number.trim().ends_with(DECLINED_CARD_SUFFIX) {
      info!("Mock processor declined the card.");
      return Err(PaymentError::Declined("Your card was declined.".to_string()));
    }
    Ok(CardToken {
      id: format!("mock_tok_{}", Uuid::new_v4().simple()),
    })
  }

  #[instrument(skip_all, fields(email = %customer.email))]
  async fn create_customer(&self, customer: &NewCustomer) -> Result<ProcessorCustomer, PaymentError> {
    self
      .simulate(
        FailureStage::CreateCustomer,
        ProcessorCall::CreateCustomer {
          email: customer.email.clone(),
          country: customer.address.country.clone(),
          source: customer.source.clone(),
        },
      )
      .await?;
    Ok(ProcessorCustomer {
      id: format!("mock_cus_{}", Uuid::new_v4().simple()),
    })
  }

  #[instrument(skip_all, fields(amount = request.amount, currency = %request.currency))]
  async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, PaymentError> {
    self
      .simulate(
        FailureStage::CreatePaymentIntent,
        ProcessorCall::CreatePaymentIntent {
          amount: request.amount,
          currency: request.currency.clone(),
          customer: request.customer.clone(),
        },
      )
      .await?;
    let intent = PaymentIntent {
      id: format!("mock_pi_{}", Uuid::new_v4().simple()),
      amount: request.amount,
      currency: request.currency.clone(),
      status: "succeeded".to_string(),
    };
    info!(payment_intent_id = %intent.id, "Mock payment SUCCEEDED.");
    Ok(intent)
  }
}
