use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Caller-supplied process identifier.
pub type ProcessId = String;

/// One page of one process: the unit stored in a frame, a page table or swap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PageRef {
    pub process_id: ProcessId,
    pub page: usize,
}

impl PageRef {
    pub fn new(process_id: impl Into<ProcessId>, page: usize) -> Self {
        PageRef {
            process_id: process_id.into(),
            page,
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.process_id, self.page)
    }
}

/// Physical memory as an ordered run of fixed-size frames.
///
/// The occupant of each slot doubles as the frame -> page reverse mapping.
#[derive(Debug, Clone)]
pub struct FrameTable {
    frame_size: usize,
    slots: Vec<Option<PageRef>>,
}

impl FrameTable {
    pub fn new(num_frames: usize, frame_size: usize) -> Self {
        FrameTable {
            frame_size,
            slots: vec![None; num_frames],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn total_bytes(&self) -> usize {
        self.slots.len() * self.frame_size
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(&self, frame: usize) -> usize {
        frame * self.frame_size
    }

    pub fn occupant(&self, frame: usize) -> Option<&PageRef> {
        self.slots.get(frame).and_then(Option::as_ref)
    }

    /// Lowest-numbered free frame.
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn used_count(&self) -> usize {
        self.len() - self.free_count()
    }

    /// Put `page` into `frame`, returning whatever was there before.
    pub fn occupy(&mut self, frame: usize, page: PageRef) -> Option<PageRef> {
        self.slots[frame].replace(page)
    }

    pub fn release(&mut self, frame: usize) -> Option<PageRef> {
        self.slots.get_mut(frame).and_then(Option::take)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Fraction of frames holding a page.
    pub fn utilization(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.used_count() as f64 / self.len() as f64
        }
    }

    /// Frame-by-frame view for rendering a memory map.
    pub fn snapshot(&self) -> Vec<FrameSnapshot> {
        self.slots
            .iter()
            .enumerate()
            .map(|(frame, occupant)| FrameSnapshot {
                frame,
                start: self.frame_to_address(frame),
                occupant: occupant.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSnapshot {
    pub frame: usize,
    pub start: usize,
    pub occupant: Option<PageRef>,
}

/// Marker left behind for a page written out to swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapEntry {
    /// Clock value when the page was swapped out
    pub written_at: u64,
    /// Whether the page had been written while resident
    pub dirty: bool,
}

/// Swap device - an in-memory stand-in for disk-backed storage of evicted pages
#[derive(Debug, Clone)]
pub struct SwapStore {
    capacity: usize,
    entries: BTreeMap<PageRef, SwapEntry>,
}

impl SwapStore {
    pub fn new(capacity: usize) -> Self {
        SwapStore {
            capacity,
            entries: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, page: &PageRef) -> bool {
        self.entries.contains_key(page)
    }

    /// Write a page out to swap
    pub fn write(&mut self, page: PageRef, entry: SwapEntry) {
        self.entries.insert(page, entry);
    }

    /// Read a page back in, removing it from swap
    pub fn take(&mut self, page: &PageRef) -> Option<SwapEntry> {
        self.entries.remove(page)
    }

    /// Drop every swapped page of a process; returns how many were dropped.
    pub fn discard_process(&mut self, process_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|page, _| page.process_id != process_id);
        before - self.entries.len()
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.entries.len() as f64 / self.capacity as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageRef, &SwapEntry)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
