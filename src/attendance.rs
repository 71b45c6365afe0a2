use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Some(Self::Present),
            "late" => Some(Self::Late),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }

    /// Toggle rotation: present -> late -> absent -> present.
    pub fn next(self) -> Self {
        match self {
            Self::Present => Self::Late,
            Self::Late => Self::Absent,
            Self::Absent => Self::Present,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    #[serde(rename = "class")]
    pub class_id: String,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

impl Student {
    /// A day without a record counts as absent.
    pub fn status_on(&self, date: NaiveDate) -> AttendanceStatus {
        self.attendance
            .iter()
            .find(|r| r.date == date)
            .map(|r| r.status)
            .unwrap_or(AttendanceStatus::Absent)
    }

    fn set_status(&mut self, date: NaiveDate, status: AttendanceStatus) {
        match self.attendance.iter_mut().find(|r| r.date == date) {
            Some(r) => r.status = status,
            None => self.attendance.push(AttendanceRecord {
                date,
                status,
                subject: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub total: usize,
    /// Whole-number percentage of present students.
    pub rate: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn add_student(&mut self, name: &str, roll_no: &str, class_id: &str) -> Student {
        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            class_id: class_id.to_string(),
            attendance: Vec::new(),
        };
        self.students.push(student.clone());
        student
    }

    pub fn get(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    /// Students of `class_id` whose name contains `search`, ignoring case.
    pub fn filter(&self, class_id: &str, search: &str) -> Vec<&Student> {
        let needle = search.trim().to_lowercase();
        self.students
            .iter()
            .filter(|s| s.class_id == class_id)
            .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Advances the student's status for `date` one step along the rotation.
    pub fn toggle(&mut self, student_id: &str, date: NaiveDate) -> Option<AttendanceStatus> {
        let student = self.students.iter_mut().find(|s| s.id == student_id)?;
        let next = student.status_on(date).next();
        student.set_status(date, next);
        Some(next)
    }

    pub fn set_status(
        &mut self,
        student_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Option<AttendanceStatus> {
        let student = self.students.iter_mut().find(|s| s.id == student_id)?;
        student.set_status(date, status);
        Some(status)
    }

    pub fn stats(&self, class_id: &str, search: &str, date: NaiveDate) -> AttendanceStats {
        let students = self.filter(class_id, search);
        let mut stats = AttendanceStats {
            present: 0,
            late: 0,
            absent: 0,
            total: students.len(),
            rate: 0,
        };
        for s in students {
            match s.status_on(date) {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Absent => stats.absent += 1,
            }
        }
        if stats.total > 0 {
            stats.rate = ((stats.present as f64 / stats.total as f64) * 100.0).round() as u32;
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
