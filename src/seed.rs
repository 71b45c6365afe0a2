//! Demo data shown by a fresh dashboard when `--seed-demo` is set.

use chrono::NaiveDate;

use crate::attendance::{AttendanceRecord, AttendanceStatus, Roster, Student};
use crate::timetable::{ScheduleStore, SlotTime, TimetableEntry, Weekday};

pub const CLASSES: [&str; 6] = ["10A", "10B", "11A", "11B", "12A", "12B"];

/// Subjects offered in the drag source pool, with their usual teacher.
pub const SUBJECT_POOL: [(&str, &str); 5] = [
    ("Mathematics", "Mrs. Sharma"),
    ("Physics", "Mr. Kumar"),
    ("Chemistry", "Dr. Patel"),
    ("English", "Ms. Singh"),
    ("Biology", "Dr. Gupta"),
];

pub fn demo_timetable() -> ScheduleStore {
    use SlotTime::{H0900, H1030, H1200};
    let rows = [
        ("1", "Mathematics", "Mrs. Sharma", "Room 101", Weekday::Monday, H0900, H1030),
        ("2", "Physics", "Mr. Kumar", "Room 201", Weekday::Monday, H1030, H1200),
        ("3", "Chemistry", "Dr. Patel", "Lab 101", Weekday::Tuesday, H0900, H1030),
    ];
    let entries = rows
        .iter()
        .map(|&(id, subject, teacher, room, day, start_time, end_time)| TimetableEntry {
            id: id.to_string(),
            subject: subject.to_string(),
            teacher: teacher.to_string(),
            room: room.to_string(),
            day,
            start_time,
            end_time,
            class_id: "10A".to_string(),
        })
        .collect();
    let (store, _) = ScheduleStore::restore(entries);
    store
}

pub fn demo_roster() -> Roster {
    use AttendanceStatus::{Absent as A, Late as L, Present as P};
    let dates = ["2024-01-15", "2024-01-14", "2024-01-13", "2024-01-12", "2024-01-11"];
    let rows: [(&str, &str, &str, [AttendanceStatus; 5]); 4] = [
        ("1", "Rahul Sharma", "101", [P, P, L, P, A]),
        ("2", "Priya Patel", "102", [P, P, P, L, P]),
        ("3", "Arjun Singh", "103", [L, A, P, P, P]),
        ("4", "Sneha Gupta", "104", [A, P, P, P, L]),
    ];
    let students = rows
        .iter()
        .map(|(id, name, roll_no, statuses)| Student {
            id: id.to_string(),
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            class_id: "10A".to_string(),
            attendance: dates
                .iter()
                .zip(statuses.iter())
                .filter_map(|(d, s)| {
                    NaiveDate::parse_from_str(d, "%Y-%m-%d")
                        .ok()
                        .map(|date| AttendanceRecord {
                            date,
                            status: *s,
                            subject: None,
                        })
                })
                .collect(),
        })
        .collect();
    Roster::new(students)
}
