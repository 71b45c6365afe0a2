use thiserror::Error;

use crate::timetable::{ScheduleStore, Slot, TimetableEntry};

/// A placement landed on a slot already held by a different entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conflict detected: {} at {}", .existing.day, .existing.start_time)]
pub struct SlotConflict {
    pub existing: TimetableEntry,
}

/// Decides whether `slot` may receive an entry.
///
/// Only the (class, day, start) cell is inspected. End-time overlap and
/// teacher or room double-booking across classes are not considered. An
/// occupant whose id equals `excluding_id` is the entry being moved and does
/// not count, so an identity move always passes.
pub fn check(
    store: &ScheduleStore,
    slot: &Slot,
    excluding_id: Option<&str>,
) -> Result<(), SlotConflict> {
    match store.find_ref(&slot.class_id, slot.day, slot.start_time) {
        Some(existing) if Some(existing.id.as_str()) != excluding_id => Err(SlotConflict {
            existing: existing.clone(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{NewEntry, SlotTime, Weekday};

    fn seeded() -> (ScheduleStore, TimetableEntry) {
        let mut store = ScheduleStore::new();
        let maths = store
            .insert(NewEntry {
                subject: "Mathematics".to_string(),
                teacher: "Mrs. Sharma".to_string(),
                room: "Room 101".to_string(),
                class_id: "10A".to_string(),
                day: Weekday::Monday,
                start_time: SlotTime::H0900,
                end_time: SlotTime::H1030,
            })
            .expect("insert");
        (store, maths)
    }

    #[test]
    fn empty_slot_passes() {
        let (store, _) = seeded();
        let slot = Slot {
            class_id: "10A".to_string(),
            day: Weekday::Monday,
            start_time: SlotTime::H1030,
        };
        assert!(check(&store, &slot, None).is_ok());
    }

    #[test]
    fn occupied_slot_fails_unless_excluded() {
        let (store, maths) = seeded();
        let slot = maths.slot();
        let err = check(&store, &slot, None).expect_err("occupied");
        assert_eq!(err.existing, maths);
        assert!(check(&store, &slot, Some("other")).is_err());
        assert!(check(&store, &slot, Some(&maths.id)).is_ok());
    }

    #[test]
    fn end_time_overlap_is_not_checked() {
        let (store, _) = seeded();
        // 09:00-10:30 is taken but a 10:30 start is a different cell.
        let slot = Slot {
            class_id: "10A".to_string(),
            day: Weekday::Monday,
            start_time: SlotTime::H1030,
        };
        assert!(check(&store, &slot, None).is_ok());
    }
}
