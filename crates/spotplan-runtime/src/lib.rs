//! Spot orchestrator: sequences persistence and plan enrichment.
//!
//! A spot is always stored before a plan is requested, and a missing plan
//! never fails the request that stored it.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
