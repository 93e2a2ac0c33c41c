// geometry defaults, in bytes
pub const KB: usize = 1024;

pub const DEFAULT_TOTAL_MEMORY: usize = 32 * KB;
pub const DEFAULT_PAGE_SIZE: usize = 4 * KB;
pub const DEFAULT_VIRTUAL_MEMORY: usize = 64 * KB;

/// Number of frames in the default paged geometry (8).
pub const DEFAULT_NUM_FRAMES: usize = DEFAULT_TOTAL_MEMORY / DEFAULT_PAGE_SIZE;
