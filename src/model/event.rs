// File: ./src/model/event.rs
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Display cap: the events panel has fixed vertical space for four entries.
pub const MAX_EVENTS: usize = 4;

/// A single concrete calendar-event instance resolved for "today".
///
/// `start` and `end` are host-local. For all-day occurrences the clock time
/// of `start` carries no meaning; only its date takes part in comparisons.
#[derive(Debug, Clone)]
pub struct EventOccurrence {
    pub calendar_name: String,
    pub title: String,
    pub location: String,
    pub notes: String,
    pub is_all_day: bool,
    pub start: DateTime<Local>,
    pub end: Option<DateTime<Local>>,
}

// Equality deliberately ignores `end`: two feeds describing the same meeting
// with slightly different end times must collapse to one entry.
impl PartialEq for EventOccurrence {
    fn eq(&self, other: &Self) -> bool {
        self.calendar_name == other.calendar_name
            && self.title == other.title
            && self.location == other.location
            && self.is_all_day == other.is_all_day
            && self.start == other.start
    }
}

impl Eq for EventOccurrence {}

impl Hash for EventOccurrence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.calendar_name.hash(state);
        self.title.hash(state);
        self.location.hash(state);
        self.is_all_day.hash(state);
        self.start.hash(state);
    }
}

/// Merge occurrences from all calendars into the final display list:
/// deduplicate (first encountered wins), sort all-day events ahead of timed
/// ones and earlier starts first within each group, cap at [`MAX_EVENTS`].
pub fn select(occurrences: Vec<EventOccurrence>) -> Vec<EventOccurrence> {
    let mut seen = HashSet::new();
    let mut picked: Vec<EventOccurrence> = Vec::new();

    for occ in occurrences {
        if seen.insert(occ.clone()) {
            picked.push(occ);
        }
    }

    // Stable, so duplicates-of-equal-key keep their arrival order.
    picked.sort_by(|a, b| {
        b.is_all_day
            .cmp(&a.is_all_day)
            .then(a.start.cmp(&b.start))
    });
    picked.truncate(MAX_EVENTS);
    picked
}
