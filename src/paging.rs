//! Fixed-size paging.
//!
//! Processes are cut into `page_size` pages and placed into the lowest free
//! frames. When memory is full a victim is chosen by the caller's replacement
//! policy and its owner simply loses that page; there is no backing store here
//! (see `virtual_memory` for swapping).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{MemoryConfig, unit_count};
use crate::error::{Result, SimError};
use crate::history::{Event, History};
use crate::memory::{FrameSnapshot, FrameTable, PageRef, ProcessId};
use crate::policy::ReplacementPolicy;
use crate::replacement::ReplacementTracker;
use crate::translation::{internal_waste, pages_for};

/// hits / (hits + faults), 0 before any reference.
pub fn hit_ratio(hits: u64, faults: u64) -> f64 {
    let total = hits + faults;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[derive(Debug, Clone)]
struct ProcessPages {
    size: usize,
    page_count: usize,
    internal_fragmentation: usize,
    /// page -> frame, resident pages only
    resident: BTreeMap<usize, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagingMetrics {
    pub page_faults: u64,
    pub hits: u64,
    pub hit_ratio: f64,
    pub internal_fragmentation: usize,
    pub total_frames: usize,
    pub used_frames: usize,
    pub free_frames: usize,
}

/// What an `allocate_process` call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub process_id: ProcessId,
    /// Frame of each page, in page order
    pub frames: Vec<usize>,
    /// Pages of other processes pushed out to make room
    pub evicted: Vec<PageRef>,
    pub internal_fragmentation: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAccess {
    pub page: PageRef,
    pub frame: usize,
    pub hit: bool,
    pub evicted: Option<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub process_id: ProcessId,
    pub size: usize,
    pub pages: usize,
    /// (page, frame) for every resident page
    pub resident: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagingSnapshot {
    pub frames: Vec<FrameSnapshot>,
    pub processes: Vec<ProcessSummary>,
}

#[derive(Debug, Clone)]
pub struct PagingEngine {
    frames: FrameTable,
    processes: BTreeMap<ProcessId, ProcessPages>,
    tracker: ReplacementTracker<PageRef>,
    page_faults: u64,
    hits: u64,
    internal_fragmentation: usize,
    history: History,
}

impl PagingEngine {
    pub fn new(total_memory: usize, page_size: usize) -> Result<Self> {
        let num_frames = unit_count("total memory", total_memory, page_size)?;
        Ok(PagingEngine {
            frames: FrameTable::new(num_frames, page_size),
            processes: BTreeMap::new(),
            tracker: ReplacementTracker::new(),
            page_faults: 0,
            hits: 0,
            internal_fragmentation: 0,
            history: History::new(),
        })
    }

    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        Self::new(config.total_memory, config.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.frames.frame_size()
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn total_memory(&self) -> usize {
        self.frames.total_bytes()
    }

    /// Load every page of a new process, evicting other processes' pages as needed.
    ///
    /// Each placed page counts as one page fault. The call is all-or-nothing:
    /// everything that could make it fail is checked before the first frame is
    /// touched, and victims are never taken from the process being loaded.
    pub fn allocate_process(
        &mut self,
        process_id: &str,
        size: usize,
        policy: ReplacementPolicy,
        tick: u64,
    ) -> Result<Allocation> {
        validate_id(process_id)?;
        if size == 0 {
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} must have a positive size"
            )));
        }
        if self.processes.contains_key(process_id) {
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} is already allocated"
            )));
        }

        if size > self.total_memory() {
            self.history.record(Event::AllocationFailed {
                process_id: process_id.to_string(),
                size,
            });
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} needs {size} bytes but total memory is {}",
                self.total_memory()
            )));
        }

        let page_size = self.page_size();
        let pages_needed = pages_for(size, page_size);

        self.history.record(Event::ProcessAllocated {
            process_id: process_id.to_string(),
            size,
            pages: pages_needed,
        });

        let mut record = ProcessPages {
            size,
            page_count: pages_needed,
            internal_fragmentation: internal_waste(size, page_size),
            resident: BTreeMap::new(),
        };
        let mut frames = Vec::with_capacity(pages_needed);
        let mut evicted = Vec::new();

        for page in 0..pages_needed {
            let (frame, victim) = self.claim_frame(policy, Some(process_id))?;
            self.place(PageRef::new(process_id, page), frame, tick);
            record.resident.insert(page, frame);
            frames.push(frame);
            evicted.extend(victim);
        }

        let internal_fragmentation = record.internal_fragmentation;
        self.internal_fragmentation += internal_fragmentation;
        self.processes.insert(process_id.to_string(), record);

        Ok(Allocation {
            process_id: process_id.to_string(),
            frames,
            evicted,
            internal_fragmentation,
        })
    }

    /// Reference one page of a process: a hit if resident, otherwise a fault
    /// that brings it back in.
    pub fn access_page(
        &mut self,
        process_id: &str,
        page: usize,
        policy: ReplacementPolicy,
        tick: u64,
    ) -> Result<PageAccess> {
        let page_size = self.page_size();
        let process = self
            .processes
            .get(process_id)
            .ok_or_else(|| SimError::NotFound(format!("process {process_id}")))?;
        if page >= process.page_count {
            return Err(SimError::InvalidAddress {
                process_id: process_id.to_string(),
                address: page * page_size,
                limit: process.page_count * page_size,
            });
        }

        let key = PageRef::new(process_id, page);
        if let Some(&frame) = process.resident.get(&page) {
            self.tracker.record_access(&key, tick);
            self.hits += 1;
            self.history.record(Event::PageHit { page: key.clone(), frame });
            return Ok(PageAccess {
                page: key,
                frame,
                hit: true,
                evicted: None,
            });
        }

        self.history.record(Event::PageFault { page: key.clone() });
        let (frame, evicted) = self.claim_frame(policy, None)?;
        self.place(key.clone(), frame, tick);
        if let Some(process) = self.processes.get_mut(process_id) {
            process.resident.insert(page, frame);
        }

        Ok(PageAccess {
            page: key,
            frame,
            hit: false,
            evicted,
        })
    }

    /// Free every frame of a process and forget it. Returns the freed frames.
    pub fn deallocate_process(&mut self, process_id: &str) -> Result<Vec<usize>> {
        let process = self
            .processes
            .remove(process_id)
            .ok_or_else(|| SimError::NotFound(format!("process {process_id}")))?;

        let mut freed = Vec::with_capacity(process.resident.len());
        for (&page, &frame) in &process.resident {
            self.frames.release(frame);
            self.tracker.remove(&PageRef::new(process_id, page));
            freed.push(frame);
        }
        self.internal_fragmentation = self
            .internal_fragmentation
            .saturating_sub(process.internal_fragmentation);
        self.history.record(Event::ProcessDeallocated {
            process_id: process_id.to_string(),
        });
        Ok(freed)
    }

    pub fn metrics(&self) -> PagingMetrics {
        PagingMetrics {
            page_faults: self.page_faults,
            hits: self.hits,
            hit_ratio: hit_ratio(self.hits, self.page_faults),
            internal_fragmentation: self.internal_fragmentation,
            total_frames: self.frames.len(),
            used_frames: self.frames.used_count(),
            free_frames: self.frames.free_count(),
        }
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// Page the named policy would evict next, without evicting it.
    pub fn next_victim(&self, policy: &str) -> Result<Option<PageRef>> {
        self.tracker.select_victim_named(policy)
    }

    pub fn tracker(&self) -> &ReplacementTracker<PageRef> {
        &self.tracker
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// (page, frame) pairs of a process's resident pages, `None` for unknown ids.
    pub fn resident_pages(&self, process_id: &str) -> Option<Vec<(usize, usize)>> {
        self.processes
            .get(process_id)
            .map(|p| p.resident.iter().map(|(&page, &frame)| (page, frame)).collect())
    }

    pub fn processes(&self) -> Vec<ProcessSummary> {
        self.processes
            .iter()
            .map(|(id, p)| ProcessSummary {
                process_id: id.clone(),
                size: p.size,
                pages: p.page_count,
                resident: p.resident.iter().map(|(&page, &frame)| (page, frame)).collect(),
            })
            .collect()
    }

    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            frames: self.frames.snapshot(),
            processes: self.processes(),
        }
    }

    /// Back to an empty memory with the same geometry; counters restart at zero.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.processes.clear();
        self.tracker.clear();
        self.page_faults = 0;
        self.hits = 0;
        self.internal_fragmentation = 0;
        self.history.restart();
    }

    /// Lowest free frame, or the frame of an evicted victim.
    fn claim_frame(
        &mut self,
        policy: ReplacementPolicy,
        protect: Option<&str>,
    ) -> Result<(usize, Option<PageRef>)> {
        if let Some(frame) = self.frames.first_free() {
            return Ok((frame, None));
        }
        let victim = self
            .tracker
            .select_victim_where(policy, |key| Some(key.process_id.as_str()) != protect)
            .ok_or(SimError::OutOfMemory {
                requested: self.page_size(),
                available: 0,
            })?;
        let frame = self.evict(&victim, policy)?;
        Ok((frame, Some(victim)))
    }

    fn evict(&mut self, victim: &PageRef, policy: ReplacementPolicy) -> Result<usize> {
        let frame = self
            .processes
            .get_mut(&victim.process_id)
            .and_then(|owner| owner.resident.remove(&victim.page))
            .ok_or_else(|| SimError::NotFound(format!("resident page {victim}")))?;
        self.frames.release(frame);
        self.tracker.remove(victim);
        self.history.record(Event::PageReplaced {
            policy,
            victim: victim.clone(),
            frame,
        });
        Ok(frame)
    }

    fn place(&mut self, page: PageRef, frame: usize, tick: u64) {
        self.frames.occupy(frame, page.clone());
        self.tracker.record_load(page.clone(), tick);
        self.page_faults += 1;
        self.history.record(Event::PageLoaded { page, frame });
    }
}

pub(crate) fn validate_id(process_id: &str) -> Result<()> {
    if process_id.trim().is_empty() {
        return Err(SimError::InvalidArgument("process id must not be empty".into()));
    }
    Ok(())
}
