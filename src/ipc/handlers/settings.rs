use crate::db;
use crate::ipc::helpers::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::persist;
use serde_json::{json, Value};
use tracing::{info, warn};

fn settings_get(state: &AppState) -> Result<Value, HandlerErr> {
    Ok(json!(state.settings))
}

fn settings_update(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let mut next = state.settings.clone();
    next.merge_patch(params).map_err(HandlerErr::bad_params)?;
    next.last_updated = Some(chrono::Utc::now().to_rfc3339());
    state.settings = next;

    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = persist::save_settings(conn, &state.settings) {
            warn!(error = %e, "failed to persist settings");
        }
    }
    Ok(json!(state.settings))
}

fn settings_clear_all(state: &mut AppState) -> Result<Value, HandlerErr> {
    let cleared = match state.db.as_ref() {
        Some(conn) => db::kv_clear(conn).map_err(|e| HandlerErr::new("persist_failed", e.to_string()))?,
        None => 0,
    };
    state.reset_stores();
    info!(cleared, "workspace data cleared");
    Ok(json!({ "cleared": cleared }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "settings.get" => settings_get(state),
        "settings.update" => settings_update(state, &req.params),
        "settings.clearAll" => settings_clear_all(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
