//! Plan generator client.
//!
//! Submits a spot to an external planning webhook and returns the plan text,
//! or a typed [`PlanUnavailable`] describing why there is none. Callers treat
//! the outcome as optional enrichment, never as a failure of their own.

pub mod types;
pub mod webhook;

pub use types::*;
pub use webhook::WebhookPlanGenerator;
