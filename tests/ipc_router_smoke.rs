use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classroomd");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("CLASSROOMD_WORKSPACE")
        .env_remove("CLASSROOMD_SEED_DEMO")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classroomd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn read_line(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("classroomd-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    writeln!(stdin, "not json").expect("write garbage");
    stdin.flush().expect("flush");
    let garbage = read_line(&mut reader);
    assert_eq!(garbage["ok"], false);
    assert_eq!(garbage["error"]["code"], "bad_json");

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["workspacePath"].is_null());

    let unknown = request(&mut stdin, &mut reader, "2", "grades.list", json!({}));
    assert_eq!(unknown["error"]["code"], "not_implemented");

    let save = request(
        &mut stdin,
        &mut reader,
        "3",
        "timetable.save",
        json!({ "classId": "10A" }),
    );
    assert_eq!(save["error"]["code"], "no_workspace");

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let health = request_ok(&mut stdin, &mut reader, "5", "health", json!({}));
    assert!(health["workspacePath"].is_string());

    let meta = request_ok(&mut stdin, &mut reader, "6", "timetable.meta", json!({}));
    assert_eq!(meta["days"].as_array().map(|d| d.len()), Some(5));
    assert_eq!(meta["timeSlots"][0]["startTime"], "09:00");
    assert_eq!(meta["timeSlots"][0]["endTime"], "10:30");
    assert_eq!(meta["subjects"][0]["name"], "Mathematics");

    let empty = request_ok(&mut stdin, &mut reader, "7", "timetable.list", json!({}));
    assert_eq!(empty["entries"], json!([]));

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "timetable.save",
        json!({ "classId": "10A" }),
    );
    assert_eq!(saved["key"], "timetable_10A");
    assert_eq!(saved["saved"], 0);

    let _ = request_ok(&mut stdin, &mut reader, "9", "settings.get", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "attendance.roster",
        json!({ "classId": "10A" }),
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn attendance_and_settings_survive_restart() {
    let workspace = temp_dir("classroomd-attendance");
    let ws = workspace.to_str().expect("utf8 path").to_string();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.addStudent",
        json!({ "name": "Meera Iyer", "rollNo": "201", "classId": "10B" }),
    );
    let student_id = added["student"]["id"].as_str().expect("id").to_string();
    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.toggle",
        json!({ "studentId": student_id, "date": "2024-02-01" }),
    );
    assert_eq!(toggled["status"], "present");
    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.toggle",
        json!({ "studentId": student_id, "date": "2024-02-01" }),
    );
    assert_eq!(toggled["status"], "late");
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "settings.update",
        json!({ "schoolName": "Riverside High", "notifications": false }),
    );
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.stats",
        json!({ "classId": "10B", "date": "2024-02-01" }),
    );
    assert_eq!(stats["late"], 1);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["rate"], 0);

    let settings = request_ok(&mut stdin, &mut reader, "2", "settings.get", json!({}));
    assert_eq!(settings["schoolName"], "Riverside High");
    assert_eq!(settings["notifications"], false);
    assert_eq!(settings["autoBackup"], true);

    let cleared = request_ok(&mut stdin, &mut reader, "3", "settings.clearAll", json!({}));
    assert_eq!(cleared["cleared"], 2);
    let roster = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.roster",
        json!({ "classId": "10B" }),
    );
    assert_eq!(roster["students"], json!([]));
    let settings = request_ok(&mut stdin, &mut reader, "5", "settings.get", json!({}));
    assert_eq!(settings["schoolName"], "Delhi Public School");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn seeded_workspace_persists_demo_data() {
    let workspace = temp_dir("classroomd-seed");
    let ws = workspace.to_str().expect("utf8 path").to_string();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws, "--seed-demo"]);
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.list",
        json!({ "classId": "10A" }),
    );
    assert_eq!(listed["entries"].as_array().map(|e| e.len()), Some(3));
    drop(stdin);
    let _ = child.wait();

    // Without the flag the persisted copy is what comes back.
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let reloaded = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.list",
        json!({ "classId": "10A" }),
    );
    assert_eq!(reloaded, listed);
    drop(stdin);
    let _ = child.wait();
}
