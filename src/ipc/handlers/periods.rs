use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::handlers::{abort_run, collaborator_failure, decode_run_input, required_param};
use crate::ipc::types::{AppState, Request};
use crate::periods::{self, ClassPeriods};

fn handle_flatten(_state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(failure) = collaborator_failure(&req.params) {
        return abort_run(req, &failure);
    }
    let raw_groups = match required_param(req, "groups") {
        Ok(v) => v.clone(),
        Err(e) => return e,
    };
    let classes: Vec<ClassPeriods> = match decode_run_input(raw_groups) {
        Ok(c) => c,
        Err(e) => return abort_run(req, &e),
    };
    let only_current = req
        .params
        .get("onlyCurrentClass")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let saved_id = req.params.get("savedPeriodId").and_then(|v| v.as_i64());
    let now_ms = req
        .params
        .get("nowMs")
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as f64);

    let flat = periods::flatten_groups(&classes, only_current);
    let selected = periods::choose_default(&flat, saved_id, now_ms);
    ok(
        &req.id,
        json!({
            "periods": serde_json::to_value(&flat).unwrap_or_default(),
            "selectedIndex": selected,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "periods.flatten" => Some(handle_flatten(state, req)),
        _ => None,
    }
}
