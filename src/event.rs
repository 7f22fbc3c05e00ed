//! Observable events.
//!
//! The orchestrator appends to this log after a successful commit; delivery
//! to subscribers is fire-and-forget and not part of the correctness
//! contract. Consumers drain the log at their own pace.

use serde::{Deserialize, Serialize};

use crate::field::Fr;
use crate::phase::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Registered {
        commitment: Fr,
        leaf_index: u64,
        timestamp: u64,
    },
    Voted {
        contestant_id: u32,
    },
    /// Advisory: a successful operation observed a phase differing from the
    /// last observed one.
    ElectionStateChanged {
        new_phase: Phase,
    },
}

#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.entries.push(event);
    }

    /// Hand every pending event to the subscriber, emptying the log.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_log() {
        let mut log = EventLog::new();
        log.emit(Event::Voted { contestant_id: 2 });
        log.emit(Event::ElectionStateChanged {
            new_phase: Phase::Voting,
        });
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert!(log.drain().is_empty());
    }

    #[test]
    fn events_serialize_with_tagged_shape() {
        let event = Event::Registered {
            commitment: Fr::from_u64(123),
            leaf_index: 0,
            timestamp: 1_700_000_000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "registered");
        assert_eq!(json["leaf_index"], 0);

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
