pub mod core;
pub mod diary;
pub mod marks;
pub mod periods;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{RunError, RunResult};
use crate::ipc::error::err;
use crate::ipc::types::Request;

/// A run-carrying method may receive, in place of its payload, a failure
/// the session collaborator hit while fetching. Both fetch failures and our
/// own decode failures abort the run the same way: one error response,
/// nothing merged.
pub(crate) fn collaborator_failure(params: &JsonValue) -> Option<RunError> {
    let report = params.get("fetchError")?;
    let message = report
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("fetch failed")
        .to_string();
    match report.get("kind").and_then(|v| v.as_str()) {
        Some("authRequired") => Some(RunError::AuthRequired),
        _ => Some(RunError::Transport(message)),
    }
}

pub(crate) fn abort_run(req: &Request, e: &RunError) -> serde_json::Value {
    tracing::warn!(code = e.code(), "run aborted: {e}");
    err(&req.id, e.code(), e.to_string())
}

/// Decodes one run input; a shape mismatch is the Decode arm of the run
/// taxonomy, not a generic bad-params error.
pub(crate) fn decode_run_input<T: DeserializeOwned>(raw: JsonValue) -> RunResult<T> {
    serde_json::from_value(raw).map_err(RunError::from)
}

pub(crate) fn required_param<'a>(
    req: &'a Request,
    key: &str,
) -> Result<&'a JsonValue, serde_json::Value> {
    match req.params.get(key) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(err(&req.id, "bad_params", format!("missing {}", key))),
    }
}

pub(crate) fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    required_param(req, key)?
        .as_i64()
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be integer", key)))
}

pub(crate) fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    required_param(req, key)?
        .as_str()
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key)))
}
