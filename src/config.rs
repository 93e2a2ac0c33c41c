//! Memory geometry shared by the engines and the CLI.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, ScriptError, SimError};

/// Sizes in bytes. Missing JSON fields fall back to the defaults in `constants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Physical memory for paging and VM, whole address range for segmentation
    pub total_memory: usize,
    pub page_size: usize,
    /// Virtual address capacity of the VM engine, also its swap capacity
    pub virtual_memory: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            total_memory: DEFAULT_TOTAL_MEMORY,
            page_size: DEFAULT_PAGE_SIZE,
            virtual_memory: DEFAULT_VIRTUAL_MEMORY,
        }
    }
}

impl MemoryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ScriptError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, ScriptError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Frame count for paging, after validating the geometry.
    pub fn num_frames(&self) -> Result<usize> {
        unit_count("total memory", self.total_memory, self.page_size)
    }

    /// Virtual page count for the VM engine, after validating the geometry.
    pub fn virtual_pages(&self) -> Result<usize> {
        unit_count("virtual memory", self.virtual_memory, self.page_size)
    }
}

/// Split `total` bytes into whole `page_size` units.
///
/// Both sizes must be positive, `total` must hold at least one page and be an
/// exact multiple of `page_size` so occupied plus free frames always add up.
pub fn unit_count(what: &str, total: usize, page_size: usize) -> Result<usize> {
    if page_size == 0 {
        return Err(SimError::InvalidArgument("page size must be positive".into()));
    }
    if total == 0 {
        return Err(SimError::InvalidArgument(format!("{what} must be positive")));
    }
    if total < page_size {
        return Err(SimError::OutOfMemory {
            requested: page_size,
            available: total,
        });
    }
    if total % page_size != 0 {
        return Err(SimError::InvalidArgument(format!(
            "{what} ({total}) is not a multiple of the page size ({page_size})"
        )));
    }
    Ok(total / page_size)
}
