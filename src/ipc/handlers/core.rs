use serde_json::json;
use tracing::info;

use crate::ipc::error::{err, ok};
use crate::ipc::handlers::required_i64;
use crate::ipc::types::{AppState, Request};
use crate::session::SessionContext;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sessionOpen": state.session.is_some()
        }),
    )
}

fn handle_session_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_i64(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let prs_id = match required_i64(req, "prsId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    // Opening over an existing session drops its caches: they belonged to
    // the previous authentication.
    state.session = Some(SessionContext::new(user_id, prs_id));
    info!(user_id, prs_id, "session opened");
    ok(&req.id, json!({ "userId": user_id, "prsId": prs_id }))
}

fn handle_session_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.session.take().is_none() {
        return err(&req.id, "no_session", "no session to close");
    }
    info!("session closed, caches cleared");
    ok(&req.id, json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.open" => Some(handle_session_open(state, req)),
        "session.logout" => Some(handle_session_logout(state, req)),
        _ => None,
    }
}
