//! SpotPlan Core: error taxonomy, configuration, and the spot domain model.

pub mod config;
pub mod error;
pub mod spot;

pub use config::{PlanGeneratorConfig, SpotPlanConfig};
pub use error::{Error, Result};
pub use spot::{Location, Spot, SpotCategory, SpotDraft, SpotInput};
