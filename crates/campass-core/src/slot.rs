//! Fixed daily teaching slots.
//!
//! The academic portal lays every timetable out against six fixed teaching
//! periods per day; the wall-clock bounds never vary by semester, so they
//! are compiled in. Timetable pages address cells positionally as
//! `slot x day`, which is why [`Slot`] is a validated index rather than a
//! plain integer.

use chrono::{Duration, NaiveTime};

/// Number of teaching slots in a day.
pub const SLOTS_PER_DAY: usize = 6;

/// Number of day columns in a timetable week (Monday through Sunday).
pub const DAYS_PER_WEEK: usize = 7;

/// Slot bounds as minutes from midnight, in slot order.
const SLOT_MINUTES: [(u32, u32); SLOTS_PER_DAY] = [
    (490, 585),   // 08:10..09:45
    (615, 710),   // 10:15..11:50
    (780, 840),   // 13:00..14:00
    (870, 965),   // 14:30..16:05
    (985, 1080),  // 16:25..18:00
    (1150, 1245), // 19:10..20:45
];

/// One of the six daily teaching slots.
///
/// Construction is checked: there is no slot outside `0..=5`, so any code
/// holding a `Slot` can combine it with a date without further validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    /// Creates a slot from an index, returning `None` outside `0..=5`.
    pub fn new(index: usize) -> Option<Self> {
        if index < SLOTS_PER_DAY {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Zero-based position of this slot within the day.
    pub fn index(&self) -> usize {
        usize::from(self.0)
    }

    /// Wall-clock start of this slot.
    pub fn start(&self) -> NaiveTime {
        minute_of_day(SLOT_MINUTES[self.index()].0)
    }

    /// Wall-clock end of this slot.
    pub fn end(&self) -> NaiveTime {
        minute_of_day(SLOT_MINUTES[self.index()].1)
    }

    /// All six slots in day order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOTS_PER_DAY as u8).map(Slot)
    }
}

fn minute_of_day(minutes: u32) -> NaiveTime {
    NaiveTime::MIN + Duration::minutes(i64::from(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn slot_new_accepts_valid_indices() {
        for i in 0..6 {
            let slot = Slot::new(i).unwrap();
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn slot_new_rejects_out_of_range() {
        assert!(Slot::new(6).is_none());
        assert!(Slot::new(42).is_none());
        assert!(Slot::new(usize::MAX).is_none());
    }

    #[test]
    fn slot_bounds_match_the_published_table() {
        let expected = [
            (hm(8, 10), hm(9, 45)),
            (hm(10, 15), hm(11, 50)),
            (hm(13, 0), hm(14, 0)),
            (hm(14, 30), hm(16, 5)),
            (hm(16, 25), hm(18, 0)),
            (hm(19, 10), hm(20, 45)),
        ];
        for (i, (start, end)) in expected.iter().enumerate() {
            let slot = Slot::new(i).unwrap();
            assert_eq!(slot.start(), *start, "slot {i} start");
            assert_eq!(slot.end(), *end, "slot {i} end");
        }
    }

    #[test]
    fn every_slot_starts_before_it_ends() {
        for slot in Slot::all() {
            assert!(slot.start() < slot.end());
        }
    }

    #[test]
    fn all_yields_six_slots_in_order() {
        let indices: Vec<usize> = Slot::all().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }
}
