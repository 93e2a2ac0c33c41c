pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod io;
pub mod memory;
pub mod paging;
pub mod policy;
pub mod replacement;
pub mod runner;
pub mod segmentation;
pub mod translation;
pub mod virtual_memory;

// Re-export commonly used items for convenience
pub use config::MemoryConfig;
pub use constants::*;
pub use error::{Result, ScriptError, SimError};
pub use paging::{PagingEngine, PagingMetrics};
pub use policy::{FitStrategy, ReplacementPolicy};
pub use replacement::ReplacementTracker;
pub use segmentation::{FragmentationReport, SegmentationEngine, SegmentationMetrics};
pub use translation::VirtualAddress;
pub use virtual_memory::{AccessOutcome, PageState, VirtualMemoryEngine, VmMetrics};
