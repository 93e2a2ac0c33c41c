//! Per-engine event log.
//!
//! Every state change an engine makes is appended here with a logical time so a
//! front end can replay or chart the run. Events are mirrored to the `log` facade.

use log::{debug, trace, warn};
use serde::Serialize;

use crate::memory::{PageRef, ProcessId};
use crate::policy::{FitStrategy, ReplacementPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ProcessAllocated {
        process_id: ProcessId,
        size: usize,
        pages: usize,
    },
    ProcessDeallocated {
        process_id: ProcessId,
    },
    PageLoaded {
        page: PageRef,
        frame: usize,
    },
    PageHit {
        page: PageRef,
        frame: usize,
    },
    PageFault {
        page: PageRef,
    },
    PageReplaced {
        policy: ReplacementPolicy,
        victim: PageRef,
        frame: usize,
    },
    SwappedOut {
        page: PageRef,
        frame: usize,
    },
    SwappedIn {
        page: PageRef,
        frame: usize,
    },
    SegmentAllocated {
        process_id: ProcessId,
        name: String,
        start: usize,
        size: usize,
        strategy: FitStrategy,
    },
    SegmentFreed {
        process_id: ProcessId,
        name: String,
        start: usize,
        size: usize,
    },
    AllocationFailed {
        process_id: ProcessId,
        size: usize,
    },
    SegmentationFault {
        process_id: ProcessId,
        name: String,
        offset: usize,
        limit: usize,
    },
    Reset,
}

impl Event {
    fn log(&self) {
        match self {
            Event::PageHit { .. } => trace!("{:?}", self),
            Event::AllocationFailed { .. } | Event::SegmentationFault { .. } => {
                warn!("{:?}", self)
            }
            _ => debug!("{:?}", self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub time: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Event) {
        event.log();
        let time = self.records.len() as u64;
        self.records.push(Record { time, event });
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.records.last().map(|record| &record.event)
    }

    /// Forget everything and start over with a single `Reset` entry.
    pub fn restart(&mut self) {
        self.records.clear();
        self.record(Event::Reset);
    }

    /// Count of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.records.iter().filter(|record| predicate(&record.event)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_get_sequential_times() {
        let mut history = History::new();
        history.record(Event::PageFault { page: PageRef::new("A", 0) });
        history.record(Event::PageLoaded { page: PageRef::new("A", 0), frame: 0 });
        let times: Vec<u64> = history.records().iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0, 1]);
    }

    #[test]
    fn test_restart_leaves_reset_marker() {
        let mut history = History::new();
        history.record(Event::ProcessDeallocated { process_id: "A".into() });
        history.restart();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), Some(&Event::Reset));
    }

    #[test]
    fn test_count() {
        let mut history = History::new();
        for page in 0..3 {
            history.record(Event::PageFault { page: PageRef::new("A", page) });
        }
        history.record(Event::Reset);
        assert_eq!(history.count(|e| matches!(e, Event::PageFault { .. })), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let record = Record {
            time: 4,
            event: Event::PageReplaced {
                policy: ReplacementPolicy::Lru,
                victim: PageRef::new("B", 2),
                frame: 5,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["time"], 4);
        assert_eq!(json["type"], "page_replaced");
        assert_eq!(json["policy"], "Lru");
        assert_eq!(json["victim"]["process_id"], "B");
        assert_eq!(json["frame"], 5);
    }
}
