//! Liveness route.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(root))
}

/// GET /: plain-text liveness check.
async fn root() -> &'static str {
    "Smart Spot Explorer API is running"
}
