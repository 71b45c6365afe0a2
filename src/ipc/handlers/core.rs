use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::persist;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens the workspace database and replaces the in-memory stores with what
/// it holds. Only a workspace with nothing stored at all gets the demo seed;
/// otherwise a missing key means that store is empty.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    let conn = db::open_db(path)?;
    let fresh = db::kv_is_empty(&conn)?;
    let timetable = persist::load_timetable(&conn)?;
    let roster = persist::load_roster(&conn)?;
    let settings = persist::load_settings(&conn)?;

    state.reset_stores();
    if !fresh {
        state.timetable = timetable.unwrap_or_default();
        state.roster = roster.unwrap_or_default();
    }
    state.settings = settings;
    let seeded = fresh && state.seed_demo;

    if fresh {
        // Write through so the workspace matches what is shown and is no
        // longer considered fresh on the next open.
        if let Err(e) = persist::save_timetable(&conn, &state.timetable)
            .and_then(|_| persist::save_roster(&conn, &state.roster))
            .and_then(|_| persist::save_settings(&conn, &state.settings))
        {
            warn!(error = %e, "failed to initialise workspace");
        }
    }

    info!(
        path = %path.display(),
        entries = state.timetable.len(),
        students = state.roster.len(),
        seeded,
        "workspace opened"
    );
    state.workspace = Some(path.to_path_buf());
    state.db = Some(conn);
    Ok(())
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
