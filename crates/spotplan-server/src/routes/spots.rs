//! Spot routes: list, create (with itinerary), update, delete, bulk insert.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;
use spotplan_core::Spot;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/spots", get(list_spots).post(create_spot))
        .route("/spots/bulk", post(bulk_create_spots))
        .route(
            "/spots/{id}",
            get(get_spot).put(update_spot).delete(delete_spot),
        )
}

/// GET /api/spots
async fn list_spots(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Spot>>> {
    Ok(Json(state.orchestrator.list()?))
}

/// GET /api/spots/{id}
async fn get_spot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Spot>> {
    Ok(Json(state.orchestrator.get(&id)?))
}

/// POST /api/spots: store the spot, then attach an itinerary if one can be generated.
async fn create_spot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    let created = state.orchestrator.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Spot created successfully",
            "spot": created.spot,
            "itinerary": created.itinerary,
        })),
    ))
}

/// PUT /api/spots/{id}: full replace, no new itinerary.
async fn update_spot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Spot>> {
    let Json(payload) = payload?;
    Ok(Json(state.orchestrator.update(&id, &payload)?))
}

/// DELETE /api/spots/{id}
async fn delete_spot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.orchestrator.delete(&id)?;
    Ok(Json(json!({ "message": "Spot deleted successfully" })))
}

/// POST /api/spots/bulk: store the valid elements, report the rejected ones.
async fn bulk_create_spots(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    let report = state.orchestrator.bulk_create(&payload)?;

    let message = if report.rejected.is_empty() {
        "Spots added successfully".to_string()
    } else {
        format!(
            "{} spots added, {} rejected",
            report.inserted,
            report.rejected.len()
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "inserted": report.inserted,
            "rejected": report.rejected,
        })),
    ))
}
