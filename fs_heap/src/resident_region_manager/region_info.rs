use crate::modules::region_store::StoreKey;

/// Per-region metadata tracked for every live allocation.
///
/// `dirty` implies `resident`: a dirty region is never left evicted, the
/// eviction path persists it first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegionInfo {
    /// byte size as requested by the caller; protection and discard operate
    /// on the page-aligned span
    pub(crate) size: u32,

    /// store handle, `None` until the first dirty eviction persists the
    /// region
    pub(crate) key: Option<StoreKey>,

    /// true iff the in-memory content differs from the stored copy (or was
    /// never stored)
    pub(crate) dirty: bool,

    /// true iff the region is counted in the residency queue
    pub(crate) resident: bool,
}

impl RegionInfo {
    /// A new region counts as resident even though no physical page is
    /// committed yet: its first access is resolved without a store fetch
    /// because `key` is still `None`.
    pub(crate) fn new(size: u32) -> Self {
        Self {
            size,
            key: None,
            dirty: false,
            resident: true,
        }
    }
}
