// =============================================================================
// Crosslight Backend - Signals API
// =============================================================================
// Signals are computed on demand from a snapshot of both stores.
// =============================================================================

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use crosslight_common::{signal, SignalResponse, Snapshot};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    /// Include the selected intersection and co-present agents
    #[serde(default)]
    pub detail: bool,
}

impl AppState {
    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.locations, &self.intersections)
    }
}

/// Signal for one agent.
pub async fn get_signal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<SignalQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let decision = signal::decide(&state.snapshot(), &id)?;

    if query.detail {
        Ok(Json(decision).into_response())
    } else {
        Ok(Json(SignalResponse::from(decision.color)).into_response())
    }
}

/// Signal for every tracked agent.
pub async fn get_all_signals(State(state): State<AppState>) -> Json<BTreeMap<String, SignalResponse>> {
    let colors = signal::color_for_all(&state.snapshot());
    Json(
        colors
            .into_iter()
            .map(|(id, color)| (id, SignalResponse::from(color)))
            .collect(),
    )
}
