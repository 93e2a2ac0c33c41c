use std::fmt;

use serde::Serialize;

/// Represents the decomposed components of a Virtual Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VirtualAddress {
    pub va: usize,
    pub page: usize,
    pub offset: usize,
}

impl VirtualAddress {
    /// Decompose a raw VA for the given page size. `page_size` must be non-zero.
    pub fn from_raw(va: usize, page_size: usize) -> Self {
        VirtualAddress {
            va,
            page: va / page_size,
            offset: va % page_size,
        }
    }

    /// Physical address of this VA once its page sits in `frame`.
    #[inline]
    pub fn physical(&self, frame: usize, page_size: usize) -> usize {
        frame * page_size + self.offset
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA({}) = (p={}, w={})", self.va, self.page, self.offset)
    }
}

/// Number of fixed-size units needed to hold `size` bytes.
#[inline]
pub fn pages_for(size: usize, page_size: usize) -> usize {
    size.div_ceil(page_size)
}

/// Unused bytes in the last unit when `size` bytes are rounded up to whole pages.
#[inline]
pub fn internal_waste(size: usize, page_size: usize) -> usize {
    pages_for(size, page_size) * page_size - size
}
