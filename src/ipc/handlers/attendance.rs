use crate::attendance::AttendanceStatus;
use crate::ipc::helpers::{
    get_date_or_today, get_optional_str, get_required_str, parse_date, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::persist;
use serde_json::{json, Value};
use tracing::{debug, warn};

fn persist_roster(state: &AppState) {
    let Some(conn) = state.db.as_ref() else {
        return;
    };
    if let Err(e) = persist::save_roster(conn, &state.roster) {
        warn!(error = %e, "failed to persist attendance");
    }
}

fn student_not_found(student_id: &str) -> HandlerErr {
    HandlerErr {
        code: "not_found",
        message: "student not found".to_string(),
        details: Some(json!({ "studentId": student_id })),
    }
}

fn attendance_add_student(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let roll_no = get_required_str(params, "rollNo")?;
    let class_id = get_required_str(params, "classId")?;
    let student = state.roster.add_student(&name, &roll_no, &class_id);
    persist_roster(state);
    Ok(json!({ "student": student }))
}

fn attendance_roster(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let date = get_date_or_today(params, "date")?;
    let search = get_optional_str(params, "search").unwrap_or_default();
    let students: Vec<Value> = state
        .roster
        .filter(&class_id, &search)
        .into_iter()
        .map(|s| {
            json!({
                "id": s.id,
                "name": s.name,
                "rollNo": s.roll_no,
                "status": s.status_on(date),
            })
        })
        .collect();
    Ok(json!({
        "classId": class_id,
        "date": date.format("%Y-%m-%d").to_string(),
        "students": students,
    }))
}

fn attendance_toggle(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let date = parse_date(&get_required_str(params, "date")?)?;
    let status = state
        .roster
        .toggle(&student_id, date)
        .ok_or_else(|| student_not_found(&student_id))?;
    debug!(student = %student_id, %date, ?status, "attendance toggled");
    persist_roster(state);
    let name = state.roster.get(&student_id).map(|s| s.name.clone());
    Ok(json!({ "studentId": student_id, "name": name, "status": status }))
}

fn attendance_set(state: &mut AppState, params: &Value) -> Result<Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let date = parse_date(&get_required_str(params, "date")?)?;
    let raw = get_required_str(params, "status")?;
    let status = AttendanceStatus::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params("status must be present, late or absent"))?;
    state
        .roster
        .set_status(&student_id, date, status)
        .ok_or_else(|| student_not_found(&student_id))?;
    persist_roster(state);
    Ok(json!({ "studentId": student_id, "status": status }))
}

fn attendance_stats(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let date = get_date_or_today(params, "date")?;
    let search = get_optional_str(params, "search").unwrap_or_default();
    Ok(json!(state.roster.stats(&class_id, &search, date)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "attendance.addStudent" => attendance_add_student(state, p),
        "attendance.roster" => attendance_roster(state, p),
        "attendance.toggle" => attendance_toggle(state, p),
        "attendance.set" => attendance_set(state, p),
        "attendance.stats" => attendance_stats(state, p),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
