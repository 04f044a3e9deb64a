// storefront/src/lib.rs

//! Storefront: checkout orchestration over a document store and a payment processor.
//!
//! The heart of the crate is [`checkout::CheckoutService::charge`], which runs
//! a cart through a linear [`Pipeline`]:
//!  - resolve and price every line item against live inventory,
//!  - apply an optional promotion code,
//!  - add the destination's shipping fee,
//!  - tokenize the card, create the processor customer and confirm the payment,
//!  - persist the resulting order and customer documents.
//!
//! Every stage can abort the charge. Nothing reaches the payment processor
//! until the cart has been fully validated and priced.
//!
//! Collaborators are injected: any [`store::DocumentStore`] (in-memory or
//! Postgres) and any [`payment::PaymentProcessor`] (Stripe or the mock).

pub mod checkout;
pub mod core;
pub mod error;
pub mod models;
pub mod orders;
pub mod payment;
pub mod pipeline;
pub mod store;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{Handler, SkipCondition, StepDef};
pub use crate::error::PipelineError;
pub use crate::pipeline::definition::Pipeline;

pub use crate::checkout::{ChargeError, CheckoutService, CheckoutSettings, ErrorClass};
pub use crate::models::{CartRequest, Customer, LineItem, Order};
