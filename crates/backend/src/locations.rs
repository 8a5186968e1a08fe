// =============================================================================
// Crosslight Backend - Locations API
// =============================================================================
// Agents report their position here. Reports are never rejected: fields
// that are missing or not numeric are stored as NaN.
// =============================================================================

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use crosslight_common::{LocationSample, UNNAMED_AGENT_ID};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Location report as sent by clients. Every field is optional and
/// loosely typed.
#[derive(Debug, Default, Deserialize)]
pub struct ReportLocationRequest {
    pub id: Option<Value>,
    /// Older clients identify themselves with `name`
    pub name: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub speed: Option<Value>,
    pub timestamp: Option<Value>,
}

impl ReportLocationRequest {
    /// Parse a raw body; anything that is not a JSON object counts as empty
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            if !body.is_empty() {
                tracing::debug!("Unparseable location report, treating as empty: {}", e);
            }
            Self::default()
        })
    }

    pub fn agent_id(&self) -> String {
        match self.id.as_ref().or(self.name.as_ref()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNNAMED_AGENT_ID.to_string(),
        }
    }

    pub fn into_sample(self, now: DateTime<Utc>) -> LocationSample {
        LocationSample {
            id: self.agent_id(),
            latitude: coerce_number(self.latitude.as_ref()),
            longitude: coerce_number(self.longitude.as_ref()),
            speed: coerce_number(self.speed.as_ref()),
            last_updated: now,
            reported_at: parse_timestamp(self.timestamp.as_ref()),
        }
    }
}

/// Numbers pass through, numeric strings are parsed, everything else is NaN
fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Epoch milliseconds (number or numeric string) or RFC 3339
fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_f64()? as i64),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(millis) => DateTime::from_timestamp_millis(millis),
            Err(_) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        },
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Legacy liveness probe on the report path.
pub async fn location_probe() -> Json<Value> {
    Json(serde_json::json!({ "message": "server running" }))
}

/// Store the latest position of an agent.
pub async fn report_location(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let request = ReportLocationRequest::from_body(&body);
    let sample = request.into_sample(Utc::now());

    tracing::info!(
        id = %sample.id,
        latitude = sample.latitude,
        longitude = sample.longitude,
        speed = sample.speed,
        timestamp = ?sample.reported_at,
        "Location received"
    );

    state.locations.upsert(sample);
    Json(serde_json::json!({ "status": "ok" }))
}

/// Every agent's latest sample, keyed by id.
pub async fn list_locations(State(state): State<AppState>) -> Json<HashMap<String, LocationSample>> {
    Json(state.locations.list_all())
}

/// Forget an agent.
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.locations.delete(&id) {
        return Err(ApiError::NotFound(format!("no location for agent '{}'", id)));
    }
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> ReportLocationRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_agent_id_defaults_and_aliases() {
        assert_eq!(request(json!({})).agent_id(), "unnamed");
        assert_eq!(request(json!({ "name": "Ana" })).agent_id(), "Ana");
        assert_eq!(request(json!({ "id": "a", "name": "b" })).agent_id(), "a");
        assert_eq!(request(json!({ "id": 42 })).agent_id(), "42");
        assert_eq!(request(json!({ "id": null })).agent_id(), "unnamed");
    }

    #[test]
    fn test_numbers_are_coerced() {
        let now = Utc::now();
        let sample = request(json!({
            "id": "a",
            "latitude": 40.5,
            "longitude": " -3.25 ",
            "speed": "fast",
        }))
        .into_sample(now);

        assert_eq!(sample.latitude, 40.5);
        assert_eq!(sample.longitude, -3.25);
        assert!(sample.speed.is_nan());
        assert_eq!(sample.last_updated, now);
    }

    #[test]
    fn test_timestamps() {
        let millis = 1_700_000_000_000_i64;
        let expected = DateTime::from_timestamp_millis(millis);

        assert_eq!(parse_timestamp(Some(&json!(millis))), expected);
        assert_eq!(parse_timestamp(Some(&json!(millis.to_string()))), expected);
        assert_eq!(parse_timestamp(Some(&json!("2023-11-14T22:13:20Z"))), expected);
        assert_eq!(parse_timestamp(Some(&json!("yesterday"))), None);
        assert_eq!(parse_timestamp(Some(&json!(true))), None);
        assert_eq!(parse_timestamp(None), None);
    }

    #[test]
    fn test_garbage_body_is_empty_report() {
        let sample = ReportLocationRequest::from_body(b"not json").into_sample(Utc::now());
        assert_eq!(sample.id, "unnamed");
        assert!(sample.latitude.is_nan());
        assert!(sample.reported_at.is_none());
    }
}
