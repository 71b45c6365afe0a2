//! Mirrors the in-memory stores into the workspace key-value table.
//!
//! Layout (unversioned):
//! - `timetable_{classId}`: JSON array of that class's entries, in snapshot order
//! - `attendance`: JSON array of students with their attendance records
//! - `eduSmart_settings`: JSON object of dashboard settings

use rusqlite::Connection;
use tracing::warn;

use crate::attendance::Roster;
use crate::db;
use crate::settings::SchoolSettings;
use crate::timetable::{ScheduleStore, TimetableEntry};

pub const TIMETABLE_PREFIX: &str = "timetable_";
pub const ATTENDANCE_KEY: &str = "attendance";
pub const SETTINGS_KEY: &str = "eduSmart_settings";

pub fn timetable_key(class_id: &str) -> String {
    format!("{}{}", TIMETABLE_PREFIX, class_id)
}

/// Writes one class's entries. A class with no entries loses its key so that
/// reloading keeps classes in the same order as the live store.
pub fn save_timetable_class(
    conn: &Connection,
    store: &ScheduleStore,
    class_id: &str,
) -> anyhow::Result<()> {
    let key = timetable_key(class_id);
    let entries = store.snapshot_class(class_id);
    if entries.is_empty() {
        return db::kv_delete(conn, &key);
    }
    db::kv_put(conn, &key, &serde_json::to_string(&entries)?)
}

pub fn save_timetable(conn: &Connection, store: &ScheduleStore) -> anyhow::Result<()> {
    for class_id in store.classes() {
        save_timetable_class(conn, store, &class_id)?;
    }
    Ok(())
}

/// Returns `None` when nothing has been saved yet.
pub fn load_timetable(conn: &Connection) -> anyhow::Result<Option<ScheduleStore>> {
    let rows = db::kv_scan_prefix(conn, TIMETABLE_PREFIX)?;
    if rows.is_empty() {
        return Ok(None);
    }
    let mut all: Vec<TimetableEntry> = Vec::new();
    for (key, blob) in rows {
        let class_id = &key[TIMETABLE_PREFIX.len()..];
        let entries: Vec<TimetableEntry> = serde_json::from_str(&blob)
            .map_err(|e| anyhow::anyhow!("{}: {}", key, e))?;
        for e in entries {
            if e.class_id != class_id {
                warn!(key = %key, entry_id = %e.id, class = %e.class_id, "skipping entry stored under another class");
                continue;
            }
            all.push(e);
        }
    }
    let (store, rejected) = ScheduleStore::restore(all);
    for e in rejected {
        warn!(
            entry_id = %e.id,
            class = %e.class_id,
            day = %e.day,
            start = %e.start_time,
            "skipping persisted entry on an occupied slot"
        );
    }
    Ok(Some(store))
}

pub fn save_roster(conn: &Connection, roster: &Roster) -> anyhow::Result<()> {
    db::kv_put(conn, ATTENDANCE_KEY, &serde_json::to_string(roster)?)
}

pub fn load_roster(conn: &Connection) -> anyhow::Result<Option<Roster>> {
    let Some(blob) = db::kv_get(conn, ATTENDANCE_KEY)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&blob)?))
}

pub fn save_settings(conn: &Connection, settings: &SchoolSettings) -> anyhow::Result<()> {
    db::kv_put(conn, SETTINGS_KEY, &serde_json::to_string(settings)?)
}

pub fn load_settings(conn: &Connection) -> anyhow::Result<SchoolSettings> {
    match db::kv_get(conn, SETTINGS_KEY)? {
        Some(blob) => Ok(serde_json::from_str(&blob)?),
        None => Ok(SchoolSettings::default()),
    }
}
