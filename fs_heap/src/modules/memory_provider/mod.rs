mod mmap;

pub use mmap::MmapMemoryProvider;

use super::cpu_fault::AccessKind;
use crate::error::Result;

/// Access permissions of a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Any access faults.
    None,
    Read,
    ReadWrite,
}

impl From<AccessKind> for Protection {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Read => Protection::Read,
            AccessKind::Write => Protection::ReadWrite,
        }
    }
}

/// A module that provides page-granular virtual memory
/// (e.g. through `mmap`)
pub trait MemoryProviderModule {
    /// Maps a new anonymous private region of `size` bytes with no access
    /// permissions, so that the very first access already faults.
    ///
    /// It is guaranteed that `size` is a multiple of the page size.
    unsafe fn map_region(size: usize) -> Result<*mut u8>;

    /// Removes the region.
    ///
    /// It is guaranteed that `size` is a multiple of the page size.
    unsafe fn unmap_region(ptr: *mut u8, size: usize) -> Result<()>;

    /// Changes the access permissions of `[ptr, ptr + size)`.
    unsafe fn protect(ptr: *mut u8, size: usize, protection: Protection) -> Result<()>;

    /// Returns the physical pages backing `[ptr, ptr + size)` to the OS.
    /// The mapping stays; the next materialization starts from zero pages.
    unsafe fn discard(ptr: *mut u8, size: usize) -> Result<()>;
}
