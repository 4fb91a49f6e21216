use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::handlers::{
    abort_run, collaborator_failure, decode_run_input, required_param, required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::models::DiaryPayload;
use crate::schedule;
use crate::session::SessionContext;

fn open_session<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut SessionContext, serde_json::Value> {
    state
        .session
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_session", "open a session first"))
}

fn handle_reconcile(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match open_session(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    if let Some(failure) = collaborator_failure(&req.params) {
        return abort_run(req, &failure);
    }
    let raw = match required_param(req, "payload") {
        Ok(v) => v.clone(),
        Err(e) => return e,
    };
    let payload: DiaryPayload = match decode_run_input(raw) {
        Ok(p) => p,
        Err(e) => return abort_run(req, &e),
    };

    let batch = schedule::reconcile(&payload, &session.teachers);
    let days = serde_json::to_value(&batch.days).unwrap_or_default();
    let discovered = batch.discovered_teachers.len();
    session.merge_schedule(batch);

    ok(
        &req.id,
        json!({ "days": days, "teachersDiscovered": discovered }),
    )
}

fn handle_day(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match open_session(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let date = match required_str(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let lessons = serde_json::to_value(session.day(&date)).unwrap_or_default();
    ok(&req.id, json!({ "lessons": lessons }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "diary.reconcile" => Some(handle_reconcile(state, req)),
        "diary.day" => Some(handle_day(state, req)),
        _ => None,
    }
}
