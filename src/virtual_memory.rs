//! Demand-paged virtual memory backed by an in-memory swap store.
//!
//! Each process gets its own virtual address space of whole pages. A page is
//! Unmapped until first touched, Resident while it sits in a frame, and Swapped
//! after it has been evicted. Evictions always cost one disk write; bringing a
//! Swapped page back costs one disk read, first touches cost none.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::{MemoryConfig, unit_count};
use crate::error::{Result, SimError};
use crate::history::{Event, History};
use crate::memory::{FrameSnapshot, FrameTable, PageRef, ProcessId, SwapEntry, SwapStore};
use crate::paging::{hit_ratio, validate_id};
use crate::policy::ReplacementPolicy;
use crate::replacement::ReplacementTracker;
use crate::translation::{VirtualAddress, pages_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState {
    Unmapped,
    Resident { frame: usize },
    Swapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageTableEntry {
    pub frame: usize,
    /// Written since it was loaded. Reported only; evictions write regardless.
    pub dirty: bool,
}

#[derive(Debug, Clone)]
struct AddressSpace {
    size: usize,
    pages: usize,
}

/// Result of one `access_address` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessOutcome {
    pub address: VirtualAddress,
    pub physical_address: usize,
    pub frame: usize,
    pub page_fault: bool,
    /// The page came back from swap (one disk read)
    pub swapped_in: bool,
    /// Page pushed out to swap to free the frame (one disk write)
    pub evicted: Option<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmMetrics {
    pub page_faults: u64,
    pub hits: u64,
    pub hit_ratio: f64,
    pub disk_reads: u64,
    pub disk_writes: u64,
    pub resident_pages: usize,
    pub swapped_pages: usize,
    pub physical_utilization: f64,
    pub swap_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualPageSnapshot {
    pub page: PageRef,
    #[serde(flatten)]
    pub state: PageState,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmSnapshot {
    pub frames: Vec<FrameSnapshot>,
    pub pages: Vec<VirtualPageSnapshot>,
}

#[derive(Debug, Clone)]
pub struct VirtualMemoryEngine {
    frames: FrameTable,
    virtual_pages: usize,
    reserved_pages: usize,
    spaces: BTreeMap<ProcessId, AddressSpace>,
    page_table: HashMap<PageRef, PageTableEntry>,
    swap: SwapStore,
    tracker: ReplacementTracker<PageRef>,
    clock: u64,
    page_faults: u64,
    hits: u64,
    disk_reads: u64,
    disk_writes: u64,
    history: History,
}

impl VirtualMemoryEngine {
    /// `virtual_memory` bounds the pages all processes may reserve together,
    /// which also bounds how much swap can ever be in use.
    pub fn new(physical_memory: usize, virtual_memory: usize, page_size: usize) -> Result<Self> {
        let num_frames = unit_count("physical memory", physical_memory, page_size)?;
        let virtual_pages = unit_count("virtual memory", virtual_memory, page_size)?;
        Ok(VirtualMemoryEngine {
            frames: FrameTable::new(num_frames, page_size),
            virtual_pages,
            reserved_pages: 0,
            spaces: BTreeMap::new(),
            page_table: HashMap::new(),
            swap: SwapStore::new(virtual_pages),
            tracker: ReplacementTracker::new(),
            clock: 0,
            page_faults: 0,
            hits: 0,
            disk_reads: 0,
            disk_writes: 0,
            history: History::new(),
        })
    }

    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        Self::new(config.total_memory, config.virtual_memory, config.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.frames.frame_size()
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn virtual_pages(&self) -> usize {
        self.virtual_pages
    }

    /// Reserve `ceil(size / page_size)` unmapped pages. Returns the page count.
    pub fn allocate_process(&mut self, process_id: &str, size: usize) -> Result<usize> {
        validate_id(process_id)?;
        if size == 0 {
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} must have a positive size"
            )));
        }
        if self.spaces.contains_key(process_id) {
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} is already allocated"
            )));
        }

        let page_size = self.page_size();
        let pages = pages_for(size, page_size);
        let remaining = self.virtual_pages - self.reserved_pages;
        if pages > remaining {
            self.history.record(Event::AllocationFailed {
                process_id: process_id.to_string(),
                size,
            });
            return Err(SimError::OutOfMemory {
                requested: pages * page_size,
                available: remaining * page_size,
            });
        }

        self.spaces
            .insert(process_id.to_string(), AddressSpace { size, pages });
        self.reserved_pages += pages;
        self.history.record(Event::ProcessAllocated {
            process_id: process_id.to_string(),
            size,
            pages,
        });
        Ok(pages)
    }

    /// Translate and touch `virtual_address`, demand-paging it in if needed.
    pub fn access_address(
        &mut self,
        process_id: &str,
        virtual_address: usize,
        write: bool,
        policy: ReplacementPolicy,
    ) -> Result<AccessOutcome> {
        let page_size = self.page_size();
        let space = self
            .spaces
            .get(process_id)
            .ok_or_else(|| SimError::NotFound(format!("process {process_id}")))?;
        let va = VirtualAddress::from_raw(virtual_address, page_size);
        if va.page >= space.pages {
            return Err(SimError::InvalidAddress {
                process_id: process_id.to_string(),
                address: virtual_address,
                limit: space.pages * page_size,
            });
        }

        self.clock += 1;
        let tick = self.clock;
        let key = PageRef::new(process_id, va.page);

        if let Some(entry) = self.page_table.get_mut(&key) {
            entry.dirty |= write;
            let frame = entry.frame;
            self.tracker.record_access(&key, tick);
            self.hits += 1;
            self.history.record(Event::PageHit { page: key, frame });
            return Ok(AccessOutcome {
                address: va,
                physical_address: va.physical(frame, page_size),
                frame,
                page_fault: false,
                swapped_in: false,
                evicted: None,
            });
        }

        self.page_faults += 1;
        self.history.record(Event::PageFault { page: key.clone() });

        let (frame, evicted) = match self.frames.first_free() {
            Some(frame) => (frame, None),
            None => {
                let victim = self
                    .tracker
                    .select_victim(policy)
                    .ok_or(SimError::OutOfMemory {
                        requested: page_size,
                        available: 0,
                    })?;
                let frame = self.swap_out(&victim, policy, tick)?;
                (frame, Some(victim))
            }
        };

        let swapped_in = self.swap.take(&key).is_some();
        if swapped_in {
            self.disk_reads += 1;
            self.history.record(Event::SwappedIn {
                page: key.clone(),
                frame,
            });
        }

        self.frames.occupy(frame, key.clone());
        self.page_table
            .insert(key.clone(), PageTableEntry { frame, dirty: write });
        self.tracker.record_load(key.clone(), tick);
        self.history.record(Event::PageLoaded { page: key, frame });

        Ok(AccessOutcome {
            address: va,
            physical_address: va.physical(frame, page_size),
            frame,
            page_fault: true,
            swapped_in,
            evicted,
        })
    }

    /// Release a process's frames, swap entries and reservation. Returns the freed frame count.
    pub fn deallocate_process(&mut self, process_id: &str) -> Result<usize> {
        let space = self
            .spaces
            .remove(process_id)
            .ok_or_else(|| SimError::NotFound(format!("process {process_id}")))?;

        let mut freed = 0;
        for page in 0..space.pages {
            let key = PageRef::new(process_id, page);
            if let Some(entry) = self.page_table.remove(&key) {
                self.frames.release(entry.frame);
                self.tracker.remove(&key);
                freed += 1;
            }
        }
        self.swap.discard_process(process_id);
        self.reserved_pages -= space.pages;
        self.history.record(Event::ProcessDeallocated {
            process_id: process_id.to_string(),
        });
        Ok(freed)
    }

    /// `None` for unknown processes and pages outside the reservation.
    pub fn page_state(&self, process_id: &str, page: usize) -> Option<PageState> {
        let space = self.spaces.get(process_id)?;
        if page >= space.pages {
            return None;
        }
        let key = PageRef::new(process_id, page);
        Some(match self.page_table.get(&key) {
            Some(entry) => PageState::Resident { frame: entry.frame },
            None if self.swap.contains(&key) => PageState::Swapped,
            None => PageState::Unmapped,
        })
    }

    /// Physical address of a resident location, without touching any counters.
    pub fn translate(&self, process_id: &str, virtual_address: usize) -> Option<usize> {
        let va = VirtualAddress::from_raw(virtual_address, self.page_size());
        self.page_table
            .get(&PageRef::new(process_id, va.page))
            .map(|entry| va.physical(entry.frame, self.page_size()))
    }

    pub fn page_table_entry(&self, page: &PageRef) -> Option<PageTableEntry> {
        self.page_table.get(page).copied()
    }

    /// Page the named policy would evict next, without evicting it.
    pub fn next_victim(&self, policy: &str) -> Result<Option<PageRef>> {
        self.tracker.select_victim_named(policy)
    }

    /// The page held by `frame`; the inverse of the page table.
    pub fn reverse_lookup(&self, frame: usize) -> Option<&PageRef> {
        self.frames.occupant(frame)
    }

    pub fn metrics(&self) -> VmMetrics {
        let resident = self.frames.used_count();
        VmMetrics {
            page_faults: self.page_faults,
            hits: self.hits,
            hit_ratio: hit_ratio(self.hits, self.page_faults),
            disk_reads: self.disk_reads,
            disk_writes: self.disk_writes,
            resident_pages: resident,
            swapped_pages: self.swap.len(),
            physical_utilization: self.frames.utilization(),
            swap_utilization: self.swap.utilization(),
        }
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn swap(&self) -> &SwapStore {
        &self.swap
    }

    pub fn tracker(&self) -> &ReplacementTracker<PageRef> {
        &self.tracker
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Size in bytes and page count of every process's reservation.
    pub fn processes(&self) -> Vec<(ProcessId, usize, usize)> {
        self.spaces
            .iter()
            .map(|(id, space)| (id.clone(), space.size, space.pages))
            .collect()
    }

    pub fn snapshot(&self) -> VmSnapshot {
        let mut pages = Vec::new();
        for (process_id, space) in &self.spaces {
            for page in 0..space.pages {
                let key = PageRef::new(process_id.clone(), page);
                let entry = self.page_table.get(&key);
                let state = match entry {
                    Some(entry) => PageState::Resident { frame: entry.frame },
                    None if self.swap.contains(&key) => PageState::Swapped,
                    None => PageState::Unmapped,
                };
                pages.push(VirtualPageSnapshot {
                    page: key,
                    state,
                    dirty: entry.is_some_and(|e| e.dirty),
                });
            }
        }
        VmSnapshot {
            frames: self.frames.snapshot(),
            pages,
        }
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.reserved_pages = 0;
        self.spaces.clear();
        self.page_table.clear();
        self.swap.clear();
        self.tracker.clear();
        self.clock = 0;
        self.page_faults = 0;
        self.hits = 0;
        self.disk_reads = 0;
        self.disk_writes = 0;
        self.history.restart();
    }

    /// Move a resident page to swap and hand back its frame.
    fn swap_out(&mut self, victim: &PageRef, policy: ReplacementPolicy, tick: u64) -> Result<usize> {
        let entry = self
            .page_table
            .remove(victim)
            .ok_or_else(|| SimError::NotFound(format!("resident page {victim}")))?;
        self.frames.release(entry.frame);
        self.tracker.remove(victim);
        self.swap.write(
            victim.clone(),
            SwapEntry {
                written_at: tick,
                dirty: entry.dirty,
            },
        );
        self.disk_writes += 1;
        self.history.record(Event::PageReplaced {
            policy,
            victim: victim.clone(),
            frame: entry.frame,
        });
        self.history.record(Event::SwappedOut {
            page: victim.clone(),
            frame: entry.frame,
        });
        Ok(entry.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KB;

    const FIFO: ReplacementPolicy = ReplacementPolicy::Fifo;

    /// 4 frames of 1KB, 16 virtual pages, one process owning 6 pages.
    fn four_frames() -> VirtualMemoryEngine {
        let mut engine = VirtualMemoryEngine::new(4 * KB, 16 * KB, KB).unwrap();
        assert_eq!(engine.allocate_process("P", 6 * KB), Ok(6));
        engine
    }

    fn touch(engine: &mut VirtualMemoryEngine, page: usize, policy: ReplacementPolicy) -> AccessOutcome {
        engine.access_address("P", page * KB, false, policy).unwrap()
    }

    // =========================================================================
    // Demand paging scenario
    // =========================================================================

    #[test]
    fn test_first_touches_cost_no_disk_reads() {
        let mut engine = four_frames();
        for page in 1..=4 {
            let outcome = touch(&mut engine, page, FIFO);
            assert!(outcome.page_fault);
            assert!(!outcome.swapped_in);
            assert_eq!(outcome.frame, page - 1);
        }
        let metrics = engine.metrics();
        assert_eq!(metrics.page_faults, 4);
        assert_eq!(metrics.disk_reads, 0);
        assert_eq!(metrics.disk_writes, 0);
        assert_eq!(metrics.physical_utilization, 1.0);
    }

    #[test]
    fn test_eviction_and_swap_in() {
        let mut engine = four_frames();
        for page in 1..=4 {
            touch(&mut engine, page, FIFO);
        }

        let outcome = touch(&mut engine, 5, FIFO);
        assert_eq!(outcome.evicted, Some(PageRef::new("P", 1)));
        assert_eq!(outcome.frame, 0);
        assert_eq!(engine.metrics().disk_writes, 1);
        assert_eq!(engine.metrics().disk_reads, 0);
        assert_eq!(engine.page_state("P", 1), Some(PageState::Swapped));

        let outcome = touch(&mut engine, 1, FIFO);
        assert!(outcome.page_fault);
        assert!(outcome.swapped_in);
        assert_eq!(outcome.evicted, Some(PageRef::new("P", 2)));

        let metrics = engine.metrics();
        assert_eq!(metrics.page_faults, 6);
        assert_eq!(metrics.disk_reads, 1);
        assert_eq!(metrics.disk_writes, 2);
        assert_eq!(metrics.swapped_pages, 1);
        assert_eq!(metrics.swap_utilization, 1.0 / 16.0);
    }

    #[test]
    fn test_hit_translates_with_offset() {
        let mut engine = four_frames();
        touch(&mut engine, 0, FIFO);
        touch(&mut engine, 2, FIFO);
        let outcome = engine.access_address("P", 2 * KB + 100, false, FIFO).unwrap();
        assert!(!outcome.page_fault);
        assert_eq!(outcome.frame, 1);
        assert_eq!(outcome.physical_address, KB + 100);
        assert_eq!(outcome.address.offset, 100);

        let metrics = engine.metrics();
        assert_eq!(metrics.hits, 1);
        assert!((metrics.hit_ratio - 1.0 / 3.0).abs() < 1e-9);
    }

    // =========================================================================
    // Replacement policies
    // =========================================================================

    #[test]
    fn test_lru_evicts_least_recent() {
        let mut engine = four_frames();
        for page in 0..4 {
            touch(&mut engine, page, ReplacementPolicy::Lru);
        }
        touch(&mut engine, 0, ReplacementPolicy::Lru);
        let outcome = touch(&mut engine, 4, ReplacementPolicy::Lru);
        assert_eq!(outcome.evicted, Some(PageRef::new("P", 1)));
    }

    #[test]
    fn test_lfu_evicts_least_frequent() {
        let mut engine = four_frames();
        for page in 0..4 {
            touch(&mut engine, page, ReplacementPolicy::Lfu);
        }
        for page in [0, 1, 3, 0] {
            touch(&mut engine, page, ReplacementPolicy::Lfu);
        }
        let outcome = touch(&mut engine, 4, ReplacementPolicy::Lfu);
        assert_eq!(outcome.evicted, Some(PageRef::new("P", 2)));
    }

    #[test]
    fn test_next_victim_by_name() {
        let mut engine = four_frames();
        assert_eq!(engine.next_victim("LRU"), Ok(None));
        for page in 0..4 {
            touch(&mut engine, page, FIFO);
        }
        touch(&mut engine, 0, FIFO);
        assert_eq!(engine.next_victim("fifo"), Ok(Some(PageRef::new("P", 0))));
        assert_eq!(engine.next_victim("lru"), Ok(Some(PageRef::new("P", 1))));
        assert_eq!(
            engine.next_victim("mru"),
            Err(SimError::UnknownPolicy("mru".into()))
        );
        assert_eq!(engine.metrics().page_faults, 4);
        assert_eq!(engine.frames().used_count(), 4);
    }

    #[test]
    fn test_every_eviction_writes_to_disk() {
        let mut engine = four_frames();
        for page in 0..6 {
            touch(&mut engine, page, FIFO);
        }
        // pages 0 and 1 were only read, yet both evictions cost a write
        assert_eq!(engine.metrics().disk_writes, 2);
    }

    #[test]
    fn test_write_marks_page_dirty() {
        let mut engine = four_frames();
        engine.access_address("P", 0, false, FIFO).unwrap();
        assert_eq!(
            engine.page_table_entry(&PageRef::new("P", 0)),
            Some(PageTableEntry { frame: 0, dirty: false })
        );
        engine.access_address("P", 10, true, FIFO).unwrap();
        assert_eq!(
            engine.page_table_entry(&PageRef::new("P", 0)),
            Some(PageTableEntry { frame: 0, dirty: true })
        );

        for page in 1..=4 {
            touch(&mut engine, page, FIFO);
        }
        let (_, entry) = engine.swap().iter().next().unwrap();
        assert!(entry.dirty);
    }

    // =========================================================================
    // Errors and lifecycle
    // =========================================================================

    #[test]
    fn test_address_outside_reservation() {
        let mut engine = four_frames();
        assert_eq!(
            engine.access_address("P", 6 * KB, false, FIFO),
            Err(SimError::InvalidAddress {
                process_id: "P".into(),
                address: 6 * KB,
                limit: 6 * KB,
            })
        );
        assert!(matches!(
            engine.access_address("Q", 0, false, FIFO),
            Err(SimError::NotFound(_))
        ));
        assert_eq!(engine.metrics().page_faults, 0);
    }

    #[test]
    fn test_reservation_limited_by_virtual_memory() {
        let mut engine = four_frames();
        assert_eq!(
            engine.allocate_process("Q", 11 * KB),
            Err(SimError::OutOfMemory {
                requested: 11 * KB,
                available: 10 * KB
            })
        );
        assert_eq!(engine.allocate_process("Q", 10 * KB), Ok(10));
        assert!(matches!(
            engine.allocate_process("Q", KB),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.allocate_process("R", 0),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_allocation_touches_no_frames() {
        let engine = four_frames();
        assert_eq!(engine.frames().used_count(), 0);
        assert_eq!(engine.page_state("P", 0), Some(PageState::Unmapped));
        assert_eq!(engine.page_state("P", 6), None);
    }

    #[test]
    fn test_deallocate_releases_everything() {
        let mut engine = four_frames();
        engine.allocate_process("Q", 2 * KB).unwrap();
        engine.access_address("Q", 0, false, FIFO).unwrap();
        // Q:0 and then P:0, P:1 get pushed out to swap
        for page in 0..6 {
            touch(&mut engine, page, FIFO);
        }
        assert_eq!(engine.metrics().swapped_pages, 3);
        assert_eq!(engine.page_state("Q", 0), Some(PageState::Swapped));

        assert_eq!(engine.deallocate_process("P"), Ok(4));
        let metrics = engine.metrics();
        assert_eq!(metrics.swapped_pages, 1);
        assert_eq!(metrics.resident_pages, 0);
        assert_eq!(engine.page_state("Q", 0), Some(PageState::Swapped));
        assert!(engine.page_state("P", 0).is_none());
        assert!(matches!(engine.deallocate_process("P"), Err(SimError::NotFound(_))));
        assert_eq!(engine.allocate_process("P", 6 * KB), Ok(6));
    }

    #[test]
    fn test_translate_has_no_side_effects() {
        let mut engine = four_frames();
        assert_eq!(engine.translate("P", 5), None);
        touch(&mut engine, 0, FIFO);
        let before = engine.metrics();
        assert_eq!(engine.translate("P", 5), Some(5));
        assert_eq!(engine.metrics(), before);
    }

    #[test]
    fn test_reverse_lookup_matches_page_table() {
        let mut engine = four_frames();
        for page in 0..6 {
            touch(&mut engine, page, FIFO);
        }
        for frame in 0..engine.num_frames() {
            let page = engine.reverse_lookup(frame).unwrap().clone();
            assert_eq!(engine.page_table_entry(&page).unwrap().frame, frame);
        }
    }

    #[test]
    fn test_snapshot_and_reset() {
        let mut engine = four_frames();
        for page in 0..5 {
            touch(&mut engine, page, FIFO);
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.pages.len(), 6);
        assert_eq!(snapshot.pages[0].state, PageState::Swapped);
        assert_eq!(snapshot.pages[4].state, PageState::Resident { frame: 0 });
        assert_eq!(snapshot.pages[5].state, PageState::Unmapped);

        engine.reset();
        assert_eq!(engine.metrics().page_faults, 0);
        assert!(engine.snapshot().pages.is_empty());
        assert_eq!(engine.allocate_process("P", 16 * KB), Ok(16));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Alloc(u8, usize),
            Access(u8, usize, bool, ReplacementPolicy),
            Free(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                1 => (0u8..3, 1usize..4096).prop_map(|(p, s)| Op::Alloc(p, s)),
                4 => (
                    0u8..3,
                    0usize..4096,
                    any::<bool>(),
                    prop::sample::select(ReplacementPolicy::ALL.to_vec())
                )
                    .prop_map(|(p, a, w, pol)| Op::Access(p, a, w, pol)),
                1 => (0u8..3).prop_map(Op::Free),
            ]
        }

        proptest! {
            /// Page table, reverse map, tracker and swap stay in agreement.
            #[test]
            fn prop_maps_agree(ops in prop::collection::vec(op(), 0..80)) {
                let mut engine = VirtualMemoryEngine::new(4 * KB, 12 * KB, KB).unwrap();
                let mut last = engine.metrics();
                for op in ops {
                    let _ = match op {
                        Op::Alloc(p, size) => engine.allocate_process(&format!("P{p}"), size).map(|_| ()),
                        Op::Access(p, addr, write, pol) => engine
                            .access_address(&format!("P{p}"), addr, write, pol)
                            .map(|_| ()),
                        Op::Free(p) => engine.deallocate_process(&format!("P{p}")).map(|_| ()),
                    };

                    let metrics = engine.metrics();
                    prop_assert_eq!(
                        (engine.frames().used_count() + engine.frames().free_count()) * engine.page_size(),
                        4 * KB
                    );
                    prop_assert_eq!(engine.page_table.len(), engine.frames().used_count());
                    prop_assert_eq!(engine.tracker().len(), engine.frames().used_count());
                    for (page, entry) in &engine.page_table {
                        prop_assert_eq!(engine.reverse_lookup(entry.frame), Some(page));
                        prop_assert!(!engine.swap().contains(page));
                    }
                    prop_assert!(engine.swap().len() <= engine.swap().capacity());
                    prop_assert!((0.0..=1.0).contains(&metrics.hit_ratio));
                    prop_assert!(metrics.page_faults >= last.page_faults);
                    prop_assert!(metrics.hits >= last.hits);
                    prop_assert!(metrics.disk_reads <= metrics.disk_writes);
                    last = metrics;
                }
            }
        }
    }
}
