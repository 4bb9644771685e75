//! SpotPlan HTTP gateway: routes, shared state, and the bulk import command.

pub mod cli;
pub mod error;
pub mod import;
pub mod routes;
pub mod state;

pub use state::AppState;
