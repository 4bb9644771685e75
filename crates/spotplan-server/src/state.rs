//! Shared application state.

use std::sync::Arc;

use spotplan_core::SpotPlanConfig;
use spotplan_planner::{PlanGenerator, WebhookPlanGenerator};
use spotplan_runtime::Orchestrator;
use spotplan_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: SpotPlanConfig,
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Open the store under the configured data directory and wire the webhook generator.
    pub fn new(config: SpotPlanConfig) -> spotplan_core::Result<Self> {
        let store = Arc::new(SqliteStore::open(&config.data_dir)?);
        let planner: Arc<dyn PlanGenerator> = Arc::new(WebhookPlanGenerator::new(&config.plan)?);
        Ok(Self::with_parts(config, store, planner))
    }

    /// Assemble state from already-built parts.
    pub fn with_parts(
        config: SpotPlanConfig,
        store: Arc<SqliteStore>,
        planner: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            config,
            orchestrator: Orchestrator::new(store, planner),
        }
    }
}
