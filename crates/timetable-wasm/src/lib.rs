//! WASM bindings for timetable-engine.
//!
//! Lets the scheduling UI validate a session form and preview conflicts in
//! the browser before it submits anything. All complex types cross the
//! boundary as JSON strings, in the same shapes the `timetable` CLI reads
//! and writes.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timetable-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/timetable-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/timetable_wasm.wasm
//! ```

use serde::Serialize;
use timetable_engine::{Session, SessionInput, ValidationError};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ValidationReport {
    ok: bool,
    errors: Vec<ValidationError>,
}

// ---------------------------------------------------------------------------
// JSON-in / JSON-out implementations
// ---------------------------------------------------------------------------

fn detect_conflicts_json(candidate_json: &str, sessions_json: &str) -> Result<String, String> {
    let input: SessionInput = serde_json::from_str(candidate_json)
        .map_err(|e| format!("Invalid candidate JSON: {}", e))?;
    let candidate = input.into_candidate().map_err(|e| e.to_string())?;
    let sessions: Vec<Session> = serde_json::from_str(sessions_json)
        .map_err(|e| format!("Invalid sessions JSON: {}", e))?;

    let pool = timetable_engine::candidate_pool(&candidate, &sessions);
    let conflicts = timetable_engine::detect_conflicts(&candidate, pool);

    serde_json::to_string(&conflicts).map_err(|e| format!("Serialization error: {}", e))
}

fn validate_session_json(input_json: &str) -> Result<String, String> {
    let input: SessionInput = serde_json::from_str(input_json)
        .map_err(|e| format!("Invalid session JSON: {}", e))?;

    let report = match timetable_engine::validate_candidate(&input) {
        Ok(_) => ValidationReport {
            ok: true,
            errors: Vec::new(),
        },
        Err(errors) => ValidationReport { ok: false, errors },
    };

    serde_json::to_string(&report).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Find the sessions a proposed session would clash with.
///
/// `candidate_json` is a session form object (`date`, `start`, `end`,
/// `group`, optional `room`, `teacher`, `subject`, `exclude_id`).
/// `sessions_json` is an array of stored sessions; only those on the
/// candidate's date that share a room, teacher or group are considered.
/// Returns a JSON array of `{kind, message, conflicting_session,
/// overlap_minutes}` objects, empty when the session can be booked.
#[wasm_bindgen(js_name = "detectConflicts")]
pub fn detect_conflicts(candidate_json: &str, sessions_json: &str) -> Result<String, JsValue> {
    detect_conflicts_json(candidate_json, sessions_json).map_err(|e| JsValue::from_str(&e))
}

/// Validate a session form without checking for conflicts.
///
/// Returns `{"ok": true, "errors": []}` or `{"ok": false, "errors": [...]}`
/// with one `{field, kind, message}` entry per problem.
#[wasm_bindgen(js_name = "validateSession")]
pub fn validate_session(input_json: &str) -> Result<String, JsValue> {
    validate_session_json(input_json).map_err(|e| JsValue::from_str(&e))
}
