use crate::conflict::SlotConflict;
use crate::ipc::helpers::{
    get_day, get_optional_end_time, get_optional_str, get_required_str, get_start_time, respond,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::persist;
use crate::seed;
use crate::timetable::{NewEntry, SlotTime, Weekday, WEEKLY_PERIODS};
use serde_json::{json, Value};
use tracing::{debug, warn};

const DEFAULT_ROOM: &str = "TBD";

fn conflict_err(conflict: SlotConflict) -> HandlerErr {
    HandlerErr {
        code: "slot_conflict",
        message: conflict.to_string(),
        details: Some(json!({ "conflict": conflict.existing })),
    }
}

/// Best-effort write-through of one class. The in-memory store stays
/// authoritative whether or not this lands.
fn persist_class(state: &AppState, class_id: &str) {
    let Some(conn) = state.db.as_ref() else {
        debug!(class = %class_id, "no workspace; timetable change kept in memory only");
        return;
    };
    if let Err(e) = persist::save_timetable_class(conn, &state.timetable, class_id) {
        warn!(class = %class_id, error = %e, "failed to persist timetable");
    }
}

fn committed(state: &mut AppState, class_id: &str) {
    state.conflicts.remove(class_id);
    persist_class(state, class_id);
}

fn rejected(state: &mut AppState, class_id: &str, conflict: SlotConflict) -> HandlerErr {
    debug!(class = %class_id, occupant = %conflict.existing.id, "{}", conflict);
    state.conflicts.insert(class_id.to_string(), 1);
    conflict_err(conflict)
}

fn new_entry_from_params(params: &Value, class_id: String) -> Result<NewEntry, HandlerErr> {
    let day = get_day(params, "day")?;
    let start_time = get_start_time(params, "startTime")?;
    let end_time = match get_optional_end_time(params, "endTime")? {
        Some(end) if end <= start_time => {
            return Err(HandlerErr::bad_params("endTime must be after startTime"));
        }
        Some(end) => end,
        None => start_time.next().unwrap_or(SlotTime::H1700),
    };
    Ok(NewEntry {
        subject: get_required_str(params, "subject")?,
        teacher: get_required_str(params, "teacher")?,
        room: get_optional_str(params, "room").unwrap_or_else(|| DEFAULT_ROOM.to_string()),
        class_id,
        day,
        start_time,
        end_time,
    })
}

fn timetable_meta(state: &AppState) -> Value {
    let mut classes: Vec<String> = seed::CLASSES.iter().map(|c| c.to_string()).collect();
    for c in state.timetable.classes() {
        if !classes.contains(&c) {
            classes.push(c);
        }
    }
    let slots: Vec<Value> = SlotTime::STARTS
        .iter()
        .map(|t| {
            json!({
                "startTime": t,
                "endTime": t.next(),
            })
        })
        .collect();
    let subjects: Vec<Value> = seed::SUBJECT_POOL
        .iter()
        .map(|(name, teacher)| json!({ "name": name, "teacher": teacher }))
        .collect();
    json!({
        "days": Weekday::ALL,
        "timeSlots": slots,
        "classes": classes,
        "subjects": subjects,
    })
}

fn timetable_list(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let entries = match get_optional_str(params, "classId") {
        Some(class_id) => state.timetable.snapshot_class(&class_id),
        None => state.timetable.snapshot(),
    };
    Ok(json!({ "entries": entries }))
}

fn timetable_find_at(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let day = get_day(params, "day")?;
    let start_time = get_start_time(params, "startTime")?;
    Ok(json!({ "entry": state.timetable.find_at(&class_id, day, start_time) }))
}

/// Single commit point for a drop on the grid: moves an existing entry, or
/// inserts a new one from the subject descriptor.
fn timetable_place(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let existing = get_optional_str(params, "entryId").and_then(|id| state.timetable.get(&id));

    let result = match existing {
        Some(current) => {
            if current.class_id != class_id {
                return Err(HandlerErr::bad_params(format!(
                    "entry belongs to class {}",
                    current.class_id
                )));
            }
            let day = get_day(params, "day")?;
            let start_time = get_start_time(params, "startTime")?;
            state
                .timetable
                .upsert_move(&current.id, day, start_time)
                .map(|moved| (moved.unwrap_or(current), "moved"))
        }
        None => {
            let new_entry = new_entry_from_params(params, class_id.clone())?;
            state.timetable.insert(new_entry).map(|e| (e, "inserted"))
        }
    };

    match result {
        Ok((entry, action)) => {
            debug!(class = %class_id, entry_id = %entry.id, action, "timetable placement committed");
            committed(state, &class_id);
            Ok(json!({
                "action": action,
                "entry": entry,
                "entries": state.timetable.snapshot_class(&class_id),
            }))
        }
        Err(conflict) => Err(rejected(state, &class_id, conflict)),
    }
}

fn timetable_move(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let entry_id = get_required_str(params, "entryId")?;
    let day = get_day(params, "day")?;
    let start_time = get_start_time(params, "startTime")?;
    let Some(class_id) = state.timetable.get(&entry_id).map(|e| e.class_id) else {
        return Ok(json!({ "moved": false }));
    };

    match state.timetable.upsert_move(&entry_id, day, start_time) {
        Ok(moved) => {
            committed(state, &class_id);
            Ok(json!({ "moved": moved.is_some(), "entry": moved }))
        }
        Err(conflict) => Err(rejected(state, &class_id, conflict)),
    }
}

fn timetable_insert(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let new_entry = new_entry_from_params(params, class_id.clone())?;
    match state.timetable.insert(new_entry) {
        Ok(entry) => {
            committed(state, &class_id);
            Ok(json!({ "entry": entry }))
        }
        Err(conflict) => Err(rejected(state, &class_id, conflict)),
    }
}

fn timetable_remove(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let entry_id = get_required_str(params, "entryId")?;
    let Some(removed) = state.timetable.remove(&entry_id) else {
        return Ok(json!({ "removed": false }));
    };
    committed(state, &removed.class_id);
    Ok(json!({ "removed": true }))
}

fn timetable_stats(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let total = state.timetable.count_for_class(&class_id);
    Ok(json!({
        "totalClasses": total,
        "freePeriods": WEEKLY_PERIODS.saturating_sub(total),
        "conflicts": state.conflicts.get(&class_id).copied().unwrap_or(0),
    }))
}

fn timetable_save(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    persist::save_timetable_class(conn, &state.timetable, &class_id)
        .map_err(|e| HandlerErr::new("persist_failed", e.to_string()))?;
    Ok(json!({
        "key": persist::timetable_key(&class_id),
        "saved": state.timetable.count_for_class(&class_id),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "timetable.meta" => Ok(timetable_meta(state)),
        "timetable.list" => timetable_list(state, p),
        "timetable.findAt" => timetable_find_at(state, p),
        "timetable.place" => timetable_place(state, p),
        "timetable.move" => timetable_move(state, p),
        "timetable.insert" => timetable_insert(state, p),
        "timetable.remove" => timetable_remove(state, p),
        "timetable.stats" => timetable_stats(state, p),
        "timetable.save" => timetable_save(state, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
