//! Variable-size segmentation over a sorted free-block list.
//!
//! Segments are carved from the start of a block picked by the fit strategy.
//! Freed ranges go back into the list at their address and are merged with any
//! contiguous neighbour, so the list stays sorted, disjoint and never holds two
//! touching blocks. Nothing is ever evicted: if no block fits, the request fails.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::history::{Event, History};
use crate::memory::ProcessId;
use crate::paging::validate_id;
use crate::policy::FitStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeBlock {
    pub start: usize,
    pub size: usize,
}

impl FreeBlock {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub name: String,
    pub start: usize,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentationReport {
    pub total_memory: usize,
    pub used_memory: usize,
    pub free_memory: usize,
    pub largest_free_block: usize,
    pub free_block_count: usize,
    pub average_free_block_size: f64,
    /// Free bytes outside the largest block: unusable by any single request
    pub external_fragmentation: usize,
    /// free blocks per free byte; 0 when memory is full
    pub fragmentation_index: f64,
    /// 1 - largest / free, in [0, 1]
    pub fragmentation_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationMetrics {
    pub segmentation_faults: u64,
    pub process_count: usize,
    pub segment_count: usize,
    pub fragmentation: FragmentationReport,
}

/// One contiguous stretch of the address range, for drawing a memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    Free {
        start: usize,
        size: usize,
    },
    Segment {
        process_id: ProcessId,
        name: String,
        start: usize,
        size: usize,
    },
}

impl Region {
    pub fn start(&self) -> usize {
        match self {
            Region::Free { start, .. } | Region::Segment { start, .. } => *start,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Region::Free { size, .. } | Region::Segment { size, .. } => *size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    total_memory: usize,
    free_blocks: Vec<FreeBlock>,
    segment_table: BTreeMap<ProcessId, Vec<Segment>>,
    segmentation_faults: u64,
    history: History,
}

impl SegmentationEngine {
    pub fn new(total_memory: usize) -> Result<Self> {
        if total_memory == 0 {
            return Err(SimError::InvalidArgument("total memory must be positive".into()));
        }
        Ok(SegmentationEngine {
            total_memory,
            free_blocks: vec![FreeBlock {
                start: 0,
                size: total_memory,
            }],
            segment_table: BTreeMap::new(),
            segmentation_faults: 0,
            history: History::new(),
        })
    }

    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    /// Place a named segment and return its start address.
    pub fn allocate_segment(
        &mut self,
        process_id: &str,
        segment_name: &str,
        size: usize,
        strategy: FitStrategy,
    ) -> Result<usize> {
        validate_id(process_id)?;
        if segment_name.trim().is_empty() {
            return Err(SimError::InvalidArgument("segment name must not be empty".into()));
        }
        if size == 0 {
            return Err(SimError::InvalidArgument(format!(
                "segment {segment_name} must have a positive size"
            )));
        }
        if self.find(process_id, segment_name).is_some() {
            return Err(SimError::InvalidArgument(format!(
                "process {process_id} already has a segment named {segment_name}"
            )));
        }

        let Some(index) = choose_block(strategy, &self.free_blocks, size) else {
            self.segmentation_faults += 1;
            self.history.record(Event::AllocationFailed {
                process_id: process_id.to_string(),
                size,
            });
            return Err(SimError::OutOfMemory {
                requested: size,
                available: self.largest_free_block(),
            });
        };

        let start = self.free_blocks[index].start;
        if self.free_blocks[index].size == size {
            self.free_blocks.remove(index);
        } else {
            let block = &mut self.free_blocks[index];
            block.start += size;
            block.size -= size;
        }

        self.segment_table
            .entry(process_id.to_string())
            .or_default()
            .push(Segment {
                name: segment_name.to_string(),
                start,
                size,
            });
        self.history.record(Event::SegmentAllocated {
            process_id: process_id.to_string(),
            name: segment_name.to_string(),
            start,
            size,
            strategy,
        });
        Ok(start)
    }

    /// Free one named segment, or every segment of the process when `segment_name` is `None`.
    pub fn deallocate_segment(
        &mut self,
        process_id: &str,
        segment_name: Option<&str>,
    ) -> Result<Vec<Segment>> {
        let segments = self
            .segment_table
            .get_mut(process_id)
            .ok_or_else(|| SimError::NotFound(format!("process {process_id}")))?;

        let removed = match segment_name {
            Some(name) => {
                let pos = segments.iter().position(|s| s.name == name).ok_or_else(|| {
                    SimError::NotFound(format!("segment {name} of process {process_id}"))
                })?;
                vec![segments.remove(pos)]
            }
            None => std::mem::take(segments),
        };
        let process_gone = segments.is_empty();
        if process_gone {
            self.segment_table.remove(process_id);
        }

        for segment in &removed {
            self.release(segment.start, segment.size);
            self.history.record(Event::SegmentFreed {
                process_id: process_id.to_string(),
                name: segment.name.clone(),
                start: segment.start,
                size: segment.size,
            });
        }
        if process_gone {
            self.history.record(Event::ProcessDeallocated {
                process_id: process_id.to_string(),
            });
        }
        Ok(removed)
    }

    /// Translate `offset` within a segment to an absolute address.
    ///
    /// Offsets past the segment limit are segmentation faults.
    pub fn access_segment(
        &mut self,
        process_id: &str,
        segment_name: &str,
        offset: usize,
    ) -> Result<usize> {
        let (start, size) = self
            .find(process_id, segment_name)
            .map(|s| (s.start, s.size))
            .ok_or_else(|| {
                SimError::NotFound(format!("segment {segment_name} of process {process_id}"))
            })?;

        if offset >= size {
            self.segmentation_faults += 1;
            self.history.record(Event::SegmentationFault {
                process_id: process_id.to_string(),
                name: segment_name.to_string(),
                offset,
                limit: size,
            });
            return Err(SimError::InvalidAddress {
                process_id: process_id.to_string(),
                address: offset,
                limit: size,
            });
        }
        Ok(start + offset)
    }

    pub fn analyze_fragmentation(&self) -> FragmentationReport {
        let free_memory: usize = self.free_blocks.iter().map(|b| b.size).sum();
        let largest = self.largest_free_block();
        let count = self.free_blocks.len();

        let (index, ratio) = if free_memory == 0 {
            (0.0, 0.0)
        } else {
            (
                count as f64 / free_memory as f64,
                1.0 - largest as f64 / free_memory as f64,
            )
        };

        FragmentationReport {
            total_memory: self.total_memory,
            used_memory: self.total_memory - free_memory,
            free_memory,
            largest_free_block: largest,
            free_block_count: count,
            average_free_block_size: if count == 0 {
                0.0
            } else {
                free_memory as f64 / count as f64
            },
            external_fragmentation: free_memory - largest,
            fragmentation_index: index,
            fragmentation_ratio: ratio,
        }
    }

    pub fn metrics(&self) -> SegmentationMetrics {
        SegmentationMetrics {
            segmentation_faults: self.segmentation_faults,
            process_count: self.segment_table.len(),
            segment_count: self.segment_table.values().map(Vec::len).sum(),
            fragmentation: self.analyze_fragmentation(),
        }
    }

    pub fn free_blocks(&self) -> &[FreeBlock] {
        &self.free_blocks
    }

    /// A process's segment table rows, in allocation order.
    pub fn segments(&self, process_id: &str) -> Option<&[Segment]> {
        self.segment_table.get(process_id).map(Vec::as_slice)
    }

    pub fn segment_table(&self) -> &BTreeMap<ProcessId, Vec<Segment>> {
        &self.segment_table
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Free and used regions covering the whole address range, by address.
    pub fn memory_map(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = self
            .free_blocks
            .iter()
            .map(|b| Region::Free {
                start: b.start,
                size: b.size,
            })
            .collect();
        for (process_id, segments) in &self.segment_table {
            regions.extend(segments.iter().map(|s| Region::Segment {
                process_id: process_id.clone(),
                name: s.name.clone(),
                start: s.start,
                size: s.size,
            }));
        }
        regions.sort_by_key(Region::start);
        regions
    }

    pub fn reset(&mut self) {
        self.free_blocks = vec![FreeBlock {
            start: 0,
            size: self.total_memory,
        }];
        self.segment_table.clear();
        self.segmentation_faults = 0;
        self.history.restart();
    }

    fn find(&self, process_id: &str, segment_name: &str) -> Option<&Segment> {
        self.segment_table
            .get(process_id)?
            .iter()
            .find(|s| s.name == segment_name)
    }

    fn largest_free_block(&self) -> usize {
        self.free_blocks.iter().map(|b| b.size).max().unwrap_or(0)
    }

    /// Return a range to the free list, merging with contiguous neighbours.
    fn release(&mut self, start: usize, size: usize) {
        let index = self.free_blocks.partition_point(|b| b.start < start);
        self.free_blocks.insert(index, FreeBlock { start, size });

        if index + 1 < self.free_blocks.len()
            && self.free_blocks[index].end() == self.free_blocks[index + 1].start
        {
            let next = self.free_blocks.remove(index + 1);
            self.free_blocks[index].size += next.size;
        }
        if index > 0 && self.free_blocks[index - 1].end() == self.free_blocks[index].start {
            let current = self.free_blocks.remove(index);
            self.free_blocks[index - 1].size += current.size;
        }
    }
}

/// Index of the block `strategy` would carve `size` bytes from.
///
/// Blocks are scanned by ascending address and the first of equally good
/// candidates wins.
fn choose_block(strategy: FitStrategy, blocks: &[FreeBlock], size: usize) -> Option<usize> {
    let mut fitting = blocks.iter().enumerate().filter(|(_, b)| b.size >= size);
    let chosen = match strategy {
        FitStrategy::FirstFit => fitting.next(),
        FitStrategy::BestFit => fitting.min_by_key(|(_, b)| b.size - size),
        FitStrategy::WorstFit => fitting.min_by_key(|(_, b)| Reverse(b.size)),
    };
    chosen.map(|(index, _)| index)
}
