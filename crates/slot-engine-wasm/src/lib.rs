//! WASM bindings for slot-engine.
//!
//! Exposes slot matching, revalidation, and timezone conversion to a
//! JavaScript orchestration layer via `wasm-bindgen`. Requests, proposals, and
//! revalidation results cross the boundary as JSON strings in the same shape
//! the `slotctl` CLI reads and writes.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use slot_engine::{Proposal, SchedulingRequest};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON-in / JSON-out cores, kept free of JsValue so they run natively
// ---------------------------------------------------------------------------

fn match_slots_json(request_json: &str) -> Result<String, String> {
    let request: SchedulingRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid request JSON: {}", e))?;
    let proposals = slot_engine::schedule(&request).map_err(|e| e.to_string())?;
    serde_json::to_string(&proposals).map_err(|e| format!("Serialization error: {}", e))
}

fn revalidate_json(proposal_json: &str, request_json: &str) -> Result<String, String> {
    let proposal: Proposal = serde_json::from_str(proposal_json)
        .map_err(|e| format!("Invalid proposal JSON: {}", e))?;
    let fresh: SchedulingRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid request JSON: {}", e))?;
    let result = slot_engine::revalidate_request(&proposal, &fresh).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| format!("Serialization error: {}", e))
}

fn to_instant_str(local: &str, zone: &str) -> Result<String, String> {
    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("Invalid local datetime '{}': {}", local, e))?;
    let instant = slot_engine::to_instant(naive, zone).map_err(|e| e.to_string())?;
    Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn to_local_str(instant: &str, zone: &str) -> Result<String, String> {
    let instant = DateTime::parse_from_rfc3339(instant)
        .map_err(|e| format!("Invalid instant '{}': {}", instant, e))?
        .with_timezone(&Utc);
    let local = slot_engine::to_local(instant, zone).map_err(|e| e.to_string())?;
    Ok(local.format("%Y-%m-%dT%H:%M:%S").to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute ranked proposals for a scheduling request.
///
/// Returns a JSON array of proposals, best first. Infeasible or invalid
/// requests throw the error message.
#[wasm_bindgen(js_name = "matchSlots")]
pub fn match_slots(request_json: &str) -> Result<String, JsValue> {
    match_slots_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Re-check one proposal against a request carrying freshly fetched busy data.
///
/// Returns a JSON `{valid, reason, conflicts}` object.
#[wasm_bindgen(js_name = "revalidate")]
pub fn revalidate(proposal_json: &str, request_json: &str) -> Result<String, JsValue> {
    revalidate_json(proposal_json, request_json).map_err(|e| JsValue::from_str(&e))
}

/// Convert a local wall-clock time (`YYYY-MM-DDTHH:MM:SS`) in an IANA zone to
/// an RFC 3339 UTC instant. Ambiguous and nonexistent local times throw.
#[wasm_bindgen(js_name = "toInstant")]
pub fn to_instant(local: &str, zone: &str) -> Result<String, JsValue> {
    to_instant_str(local, zone).map_err(|e| JsValue::from_str(&e))
}

/// Convert an RFC 3339 instant to local wall-clock time in an IANA zone.
#[wasm_bindgen(js_name = "toLocal")]
pub fn to_local(instant: &str, zone: &str) -> Result<String, JsValue> {
    to_local_str(instant, zone).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"{
        "required": [
            {"id": "cand", "role": "candidate", "timezone": "UTC"},
            {"id": "int", "role": "interviewer", "timezone": "UTC",
             "busy_sources": [{"source_id": "cal", "timezone": "UTC",
                "busy": [{"start": "2026-03-16T09:00:00", "end": "2026-03-16T10:00:00"}]}]}
        ],
        "duration_minutes": 30,
        "horizon_start": "2026-03-16T09:00:00Z",
        "horizon_end": "2026-03-16T12:00:00Z",
        "proposal_count": 2,
        "reference_time": "2026-03-15T00:00:00Z",
        "scoring": {
            "max_weight": 10.0,
            "role_multipliers": {"candidate": 1.0, "interviewer": 1.0, "recruiter": 1.0},
            "optional_absence_penalty": 0.0
        }
    }"#;

    #[test]
    fn match_then_revalidate() {
        let proposals: Vec<serde_json::Value> =
            serde_json::from_str(&match_slots_json(REQUEST).unwrap()).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0]["slot"]["start"], "2026-03-16T10:00:00Z");

        let result: serde_json::Value = serde_json::from_str(
            &revalidate_json(&proposals[0].to_string(), REQUEST).unwrap(),
        )
        .unwrap();
        assert_eq!(result["valid"], true);
    }

    #[test]
    fn malformed_request_is_reported() {
        let err = match_slots_json("{").unwrap_err();
        assert!(err.starts_with("Invalid request JSON"));
    }

    #[test]
    fn timezone_round_trip() {
        assert_eq!(
            to_instant_str("2026-07-01T09:00:00", "Europe/Berlin").unwrap(),
            "2026-07-01T07:00:00Z"
        );
        assert_eq!(
            to_local_str("2026-07-01T07:00:00Z", "Europe/Berlin").unwrap(),
            "2026-07-01T09:00:00"
        );
    }

    #[test]
    fn gap_time_is_rejected() {
        let err = to_instant_str("2026-03-29T02:30:00", "Europe/Berlin").unwrap_err();
        assert!(err.contains("Nonexistent"));
    }
}
