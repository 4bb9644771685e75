//! Plan text, the unavailable outcome, and the generator trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque itinerary text produced by the planning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(String);

impl Plan {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_text(self) -> String {
        self.0
    }
}

/// Why no plan could be obtained. Never surfaced to API callers as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanUnavailable {
    #[error("plan generator is not configured")]
    NotConfigured,

    #[error("plan generator timed out")]
    Timeout,

    #[error("plan generator unreachable: {0}")]
    Network(String),

    #[error("plan generator returned HTTP {0}")]
    Status(u16),

    #[error("plan generator response malformed: {0}")]
    MalformedBody(String),
}

/// Something that can turn a spot's attributes into a plan.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Request a plan for the given spot attributes (the JSON the client submitted).
    async fn generate(&self, attributes: &serde_json::Value) -> Result<Plan, PlanUnavailable>;
}
