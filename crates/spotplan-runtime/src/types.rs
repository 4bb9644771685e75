//! Runtime types.

use serde::Serialize;

use spotplan_core::Spot;
use spotplan_planner::PlanUnavailable;

/// Steps of the create flow, in order. Used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStage {
    Received,
    Validated,
    Persisted,
    PlanRequested,
    PlanAttached,
    PlanSkipped,
    Responded,
}

/// Whether the creation response carries a generated plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    Attached,
    Skipped(PlanUnavailable),
}

/// Result of a successful create: the stored spot plus its itinerary.
#[derive(Debug, Clone)]
pub struct SpotCreated {
    pub spot: Spot,
    /// Plan text, or empty when no plan was available.
    pub itinerary: String,
    pub plan_status: PlanStatus,
}

/// One element of a bulk batch that was not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkRejection {
    /// Position in the submitted array.
    pub index: usize,
    pub error: String,
}

/// Outcome of a bulk create.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub inserted: usize,
    pub rejected: Vec<BulkRejection>,
}
