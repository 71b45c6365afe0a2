use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::attendance::Roster;
use crate::seed;
use crate::settings::SchoolSettings;
use crate::timetable::ScheduleStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub seed_demo: bool,
    pub timetable: ScheduleStore,
    pub roster: Roster,
    pub settings: SchoolSettings,
    /// Conflicts raised by the last placement attempt, per class. Cleared by
    /// the next successful change to that class.
    pub conflicts: HashMap<String, usize>,
}

impl AppState {
    pub fn new(seed_demo: bool) -> Self {
        let mut state = Self {
            workspace: None,
            db: None,
            seed_demo,
            timetable: ScheduleStore::new(),
            roster: Roster::default(),
            settings: SchoolSettings::default(),
            conflicts: HashMap::new(),
        };
        state.reset_stores();
        state
    }

    /// Empty stores, or the demo data when seeding is enabled.
    pub fn reset_stores(&mut self) {
        if self.seed_demo {
            self.timetable = seed::demo_timetable();
            self.roster = seed::demo_roster();
        } else {
            self.timetable = ScheduleStore::new();
            self.roster = Roster::default();
        }
        self.settings = SchoolSettings::default();
        self.conflicts.clear();
    }
}
