// =============================================================================
// Crosslight Backend - Intersections API
// =============================================================================

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use crosslight_common::Intersection;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Coordinates are kept loosely typed so that strings and nulls reach the
/// registry's validation instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateIntersectionRequest {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register an intersection. Both coordinates must be JSON numbers.
pub async fn create_intersection(
    State(state): State<AppState>,
    payload: Result<Json<CreateIntersectionRequest>, JsonRejection>,
) -> Result<Json<Intersection>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let intersection = state.intersections.create(
        req.latitude.as_ref().and_then(Value::as_f64),
        req.longitude.as_ref().and_then(Value::as_f64),
    )?;

    tracing::info!(
        id = intersection.id,
        latitude = intersection.latitude,
        longitude = intersection.longitude,
        "Intersection created"
    );
    Ok(Json(intersection))
}

/// All intersections in creation order.
pub async fn list_intersections(State(state): State<AppState>) -> Json<Vec<Intersection>> {
    Json(state.intersections.list_all())
}

/// Remove an intersection by its numeric id.
pub async fn delete_intersection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_integer(&id) {
        return Err(ApiError::BadRequest(format!("invalid intersection id '{}'", id)));
    }

    // Negative or oversized integers are well-formed but can never exist
    let found = id
        .parse::<u64>()
        .map(|id| state.intersections.delete(id))
        .unwrap_or(false);
    if !found {
        return Err(ApiError::NotFound(format!("intersection {} not found", id)));
    }

    tracing::info!(id = %id, "Intersection deleted");
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// Optional sign followed by at least one ASCII digit
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
