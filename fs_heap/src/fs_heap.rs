use std::path::Path;

use log::info;

use crate::{
    config::FsHeapConfig,
    error::{FsHeapError, Result},
    fault_access_point::{EngineManager, FAULT_ACCESS_POINT},
    modules::{cpu_fault, region_store::FileRegionStoreModule},
    stats::FsHeapStats,
};

/// Starts the allocator: opens the backing store at `path` (truncating any
/// previous contents) and takes over access fault handling for the
/// process.
///
/// Calling `init` again replaces the running instance; everything it
/// managed is abandoned, matching a fresh start. The fault handler itself
/// is only installed on the first call, so delegation of foreign faults
/// keeps pointing at whatever the host program had set up before.
pub fn init(path: impl AsRef<Path>, config: FsHeapConfig) -> Result<()> {
    if !cpu_fault::supported() {
        return Err(FsHeapError::UnsupportedCpu);
    }

    // drop a previous instance before opening the store: it deletes its
    // store file on drop, which may be the same `path`
    drop(FAULT_ACCESS_POINT.replace_manager(None)?);

    let store = FileRegionStoreModule::new(path).map_err(FsHeapError::StoreOpen)?;

    FAULT_ACCESS_POINT.ensure_handler_installed()?;
    FAULT_ACCESS_POINT.replace_manager(Some(EngineManager::new(store, config.capacity)))?;

    info!(
        "initialized with residency capacity of {} regions",
        config.capacity
    );
    Ok(())
}

/// Allocates `size` bytes of demand-paged memory.
///
/// The returned address is page-aligned and inaccessible until first use;
/// the first access faults and materializes zero-filled pages. Contents
/// move between RAM and the backing store transparently from then on.
pub fn allocate(size: u32) -> Result<*mut u8> {
    FAULT_ACCESS_POINT.with_manager(|manager| manager.allocate(size))
}

/// Releases the region starting at `addr`, dropping its store blob and its
/// mapping. Unknown addresses are tolerated: only the `frees` counter
/// moves, so a double free is a no-op.
pub fn free(addr: *mut u8) -> Result<()> {
    FAULT_ACCESS_POINT.with_manager(|manager| manager.free(addr))
}

/// Forces one eviction step: the oldest resident region is persisted if
/// dirty and its pages are given back to the OS. A no-op when nothing is
/// resident.
pub fn writeback() -> Result<()> {
    FAULT_ACCESS_POINT.with_manager(|manager| manager.evict_one())
}

/// Returns a snapshot of the usage counters.
pub fn stats() -> Result<FsHeapStats> {
    FAULT_ACCESS_POINT.with_manager(|manager| Ok(manager.stats()))
}

/// Shuts the allocator down and closes the store.
///
/// The fault handler stays installed but delegates everything from here
/// on; touching a still-mapped region after `term` terminates the process
/// like any stray access.
pub fn term() -> Result<()> {
    match FAULT_ACCESS_POINT.replace_manager(None)? {
        Some(manager) => {
            drop(manager);
            Ok(())
        }
        None => Err(FsHeapError::Uninitialized),
    }
}
