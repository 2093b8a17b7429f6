use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::sound::SoundKind;

/// one alarm that actually went off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmRecord {
    pub fired_at: NaiveDateTime,
    pub sound: SoundKind,
}

const CAPACITY: usize = 10;

/// most-recent-first log of fired alarms, bounded so the list in the ui never
/// grows without end. records are never edited once pushed.
#[derive(Debug, Default)]
pub struct AlarmHistory {
    entries: VecDeque<AlarmRecord>,
}

impl AlarmHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AlarmRecord) {
        self.entries.push_front(record);
        self.entries.truncate(CAPACITY);
    }

    /// newest first
    pub fn iter(&self) -> impl Iterator<Item = &AlarmRecord> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
