use serde_json::json;

use crate::grades;
use crate::ipc::error::ok;
use crate::ipc::handlers::{abort_run, collaborator_failure, decode_run_input, required_param};
use crate::ipc::types::{AppState, Request};
use crate::models::{DiaryPayload, UnitSummary};

fn handle_aggregate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(failure) = collaborator_failure(&req.params) {
        return abort_run(req, &failure);
    }
    let raw_units = match required_param(req, "units") {
        Ok(v) => v.clone(),
        Err(e) => return e,
    };
    let units: Vec<UnitSummary> = match decode_run_input(raw_units) {
        Ok(u) => u,
        Err(e) => return abort_run(req, &e),
    };
    let raw_payload = match required_param(req, "payload") {
        Ok(v) => v.clone(),
        Err(e) => return e,
    };
    let payload: DiaryPayload = match decode_run_input(raw_payload) {
        Ok(p) => p,
        Err(e) => return abort_run(req, &e),
    };

    let subjects = grades::aggregate(&units, &payload);
    ok(
        &req.id,
        json!({ "subjects": serde_json::to_value(&subjects).unwrap_or_default() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.aggregate" => Some(handle_aggregate(state, req)),
        _ => None,
    }
}
