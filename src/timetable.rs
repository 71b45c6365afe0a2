use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conflict::{self, SlotConflict};

/// School days shown on the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(Self::Monday),
            "Tuesday" => Some(Self::Tuesday),
            "Wednesday" => Some(Self::Wednesday),
            "Thursday" => Some(Self::Thursday),
            "Friday" => Some(Self::Friday),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Period boundaries. The first five open a period; `17:00` only ever closes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotTime {
    #[serde(rename = "09:00")]
    H0900,
    #[serde(rename = "10:30")]
    H1030,
    #[serde(rename = "12:00")]
    H1200,
    #[serde(rename = "14:00")]
    H1400,
    #[serde(rename = "15:30")]
    H1530,
    #[serde(rename = "17:00")]
    H1700,
}

impl SlotTime {
    pub const STARTS: [SlotTime; 5] = [
        SlotTime::H0900,
        SlotTime::H1030,
        SlotTime::H1200,
        SlotTime::H1400,
        SlotTime::H1530,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "09:00" => Some(Self::H0900),
            "10:30" => Some(Self::H1030),
            "12:00" => Some(Self::H1200),
            "14:00" => Some(Self::H1400),
            "15:30" => Some(Self::H1530),
            "17:00" => Some(Self::H1700),
            _ => None,
        }
    }

    /// Like `parse`, but rejects `17:00`, which cannot open a period.
    pub fn parse_start(s: &str) -> Option<Self> {
        Self::parse(s).filter(|t| t.is_start())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H0900 => "09:00",
            Self::H1030 => "10:30",
            Self::H1200 => "12:00",
            Self::H1400 => "14:00",
            Self::H1530 => "15:30",
            Self::H1700 => "17:00",
        }
    }

    pub fn is_start(self) -> bool {
        self != Self::H1700
    }

    /// The boundary closing a period that opens at `self`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::H0900 => Some(Self::H1030),
            Self::H1030 => Some(Self::H1200),
            Self::H1200 => Some(Self::H1400),
            Self::H1400 => Some(Self::H1530),
            Self::H1530 => Some(Self::H1700),
            Self::H1700 => None,
        }
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of cells in one class's weekly grid.
pub const WEEKLY_PERIODS: usize = Weekday::ALL.len() * SlotTime::STARTS.len();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub day: Weekday,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
    #[serde(rename = "class")]
    pub class_id: String,
}

impl TimetableEntry {
    pub fn slot(&self) -> Slot {
        Slot {
            class_id: self.class_id.clone(),
            day: self.day,
            start_time: self.start_time,
        }
    }
}

/// A (day, start) cell within one class's grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub class_id: String,
    pub day: Weekday,
    pub start_time: SlotTime,
}

/// Descriptor for an entry that does not exist yet; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub class_id: String,
    pub day: Weekday,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
}

impl NewEntry {
    fn slot(&self) -> Slot {
        Slot {
            class_id: self.class_id.clone(),
            day: self.day,
            start_time: self.start_time,
        }
    }
}

/// Authoritative timetable for every class.
///
/// Entries of one class are kept contiguous and in insertion order; classes
/// keep the order in which they first appeared. Callers only ever see clones.
#[derive(Debug, Default, Clone)]
pub struct ScheduleStore {
    entries: Vec<TimetableEntry>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted entries, keeping their order. Entries
    /// that would double-book a slot (or reuse an id) are returned instead of
    /// being loaded.
    pub fn restore(entries: Vec<TimetableEntry>) -> (Self, Vec<TimetableEntry>) {
        let mut store = Self::new();
        let mut rejected = Vec::new();
        for e in entries {
            if store.get(&e.id).is_some() || conflict::check(&store, &e.slot(), None).is_err() {
                rejected.push(e);
                continue;
            }
            store.push_grouped(e);
        }
        (store, rejected)
    }

    pub fn find_at(
        &self,
        class_id: &str,
        day: Weekday,
        start_time: SlotTime,
    ) -> Option<TimetableEntry> {
        self.find_ref(class_id, day, start_time).cloned()
    }

    pub(crate) fn find_ref(
        &self,
        class_id: &str,
        day: Weekday,
        start_time: SlotTime,
    ) -> Option<&TimetableEntry> {
        self.entries
            .iter()
            .find(|e| e.class_id == class_id && e.day == day && e.start_time == start_time)
    }

    pub fn get(&self, entry_id: &str) -> Option<TimetableEntry> {
        self.entries.iter().find(|e| e.id == entry_id).cloned()
    }

    /// Moves an entry to another (day, start) within its class. Returns
    /// `Ok(None)` when no entry has `entry_id`.
    pub fn upsert_move(
        &mut self,
        entry_id: &str,
        new_day: Weekday,
        new_start_time: SlotTime,
    ) -> Result<Option<TimetableEntry>, SlotConflict> {
        let Some(idx) = self.entries.iter().position(|e| e.id == entry_id) else {
            return Ok(None);
        };
        let target = Slot {
            class_id: self.entries[idx].class_id.clone(),
            day: new_day,
            start_time: new_start_time,
        };
        conflict::check(self, &target, Some(entry_id))?;

        let entry = &mut self.entries[idx];
        entry.day = new_day;
        entry.start_time = new_start_time;
        Ok(Some(entry.clone()))
    }

    pub fn insert(&mut self, new_entry: NewEntry) -> Result<TimetableEntry, SlotConflict> {
        conflict::check(self, &new_entry.slot(), None)?;
        let entry = TimetableEntry {
            id: Uuid::new_v4().to_string(),
            subject: new_entry.subject,
            teacher: new_entry.teacher,
            room: new_entry.room,
            day: new_entry.day,
            start_time: new_entry.start_time,
            end_time: new_entry.end_time,
            class_id: new_entry.class_id,
        };
        self.push_grouped(entry.clone());
        Ok(entry)
    }

    pub fn remove(&mut self, entry_id: &str) -> Option<TimetableEntry> {
        let idx = self.entries.iter().position(|e| e.id == entry_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn snapshot(&self) -> Vec<TimetableEntry> {
        self.entries.clone()
    }

    pub fn snapshot_class(&self, class_id: &str) -> Vec<TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect()
    }

    pub fn count_for_class(&self, class_id: &str) -> usize {
        self.entries.iter().filter(|e| e.class_id == class_id).count()
    }

    /// Class ids in first-seen order.
    pub fn classes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for e in &self.entries {
            if out.last() != Some(&e.class_id) {
                out.push(e.class_id.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_grouped(&mut self, entry: TimetableEntry) {
        match self.entries.iter().rposition(|e| e.class_id == entry.class_id) {
            Some(last) => self.entries.insert(last + 1, entry),
            None => self.entries.push(entry),
        }
    }
}
