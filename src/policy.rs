//! Policy selectors: page replacement for paging/VM, block placement for segmentation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Which resident unit gets evicted when no frame is free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    /// Oldest load wins, regardless of use
    #[default]
    Fifo,
    /// Smallest last-access tick
    Lru,
    /// Smallest access count, LRU among ties
    Lfu,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 3] = [Self::Fifo, Self::Lru, Self::Lfu];

    pub fn name(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
            Self::Lfu => "LFU",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

/// How the segmentation engine picks a free block for a new segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitStrategy {
    #[default]
    FirstFit,
    BestFit,
    WorstFit,
}

impl FitStrategy {
    pub const ALL: [FitStrategy; 3] = [Self::FirstFit, Self::BestFit, Self::WorstFit];

    pub fn name(self) -> &'static str {
        match self {
            Self::FirstFit => "First-Fit",
            Self::BestFit => "Best-Fit",
            Self::WorstFit => "Worst-Fit",
        }
    }
}

impl fmt::Display for FitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitStrategy {
    type Err = SimError;

    /// Accepts `First-Fit`, `first_fit`, `firstfit`, `first` and the same for best/worst.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "firstfit" | "first" => Ok(Self::FirstFit),
            "bestfit" | "best" => Ok(Self::BestFit),
            "worstfit" | "worst" => Ok(Self::WorstFit),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}
