mod region_info;
mod region_table;
mod residency_queue;

use core::{marker::PhantomData, slice};

use log::trace;

use crate::{
    error::Result,
    modules::{
        cpu_fault::AccessKind,
        memory_provider::{MemoryProviderModule, Protection},
        region_store::RegionStoreModule,
    },
    stats::FsHeapStats,
    util::{page_align, size_align},
};

use region_info::RegionInfo;
use region_table::RegionTable;
use residency_queue::ResidencyQueue;

/// The swap engine: tracks every live region, keeps at most `capacity` of
/// them resident and moves contents between RAM and the store on demand.
///
/// `evict_one`, `cache_region` and `handle_fault` run inside the fault
/// handler; nothing on those paths may log or allocate.
pub(crate) struct ResidentRegionManager<S: RegionStoreModule, M: MemoryProviderModule> {
    regions: RegionTable,
    residency: ResidencyQueue,
    capacity: usize,
    stats: FsHeapStats,
    store: S,
    _provider: PhantomData<M>,
}

impl<S: RegionStoreModule, M: MemoryProviderModule> ResidentRegionManager<S, M> {
    pub(crate) fn new(store: S, capacity: usize) -> Self {
        assert!(capacity > 0, "residency capacity has to be at least one");

        Self {
            regions: RegionTable::new(),
            residency: ResidencyQueue::new(capacity),
            capacity,
            stats: FsHeapStats::default(),
            store,
            _provider: PhantomData,
        }
    }

    /// Creates a new inaccessible region and registers it as resident.
    pub(crate) fn allocate(&mut self, size: u32) -> Result<*mut u8> {
        trace!("allocate new region with {} bytes", size);

        let ptr = unsafe { M::map_region(size_align(size as usize))? };

        self.regions.insert(ptr as usize, RegionInfo::new(size));
        self.cache_region(ptr as usize)?;

        self.stats.allocs += 1;
        Ok(ptr)
    }

    /// Releases a region: drops its store blob, unmaps it and erases it
    /// from the table. Unknown addresses only bump the `frees` counter,
    /// so double frees are harmless.
    pub(crate) fn free(&mut self, addr: *mut u8) -> Result<()> {
        trace!("free region at {:p}", addr);

        if let Some(region) = self.regions.remove(addr as usize) {
            if let Some(key) = region.key {
                self.store.remove(key)?;
            }

            unsafe { M::unmap_region(addr, size_align(region.size as usize))? };

            // a leftover residency queue entry no longer resolves in the
            // table and is skipped at eviction time
        }

        self.stats.frees += 1;
        Ok(())
    }

    /// Enqueues a region as resident, evicting from the front until the
    /// bound holds again.
    fn cache_region(&mut self, base: usize) -> Result<()> {
        self.residency.push_back(base);

        while self.residency.len() > self.capacity {
            self.evict_one()?;
        }

        Ok(())
    }

    /// Evicts the oldest resident region. A no-op on an empty queue and
    /// for stale entries of freed regions.
    pub(crate) fn evict_one(&mut self) -> Result<()> {
        let Some(base) = self.residency.pop_front() else {
            return Ok(());
        };
        let Some(region) = self.regions.lookup_mut(base) else {
            return Ok(());
        };

        region.resident = false;

        let ptr = base as *mut u8;
        let span = size_align(region.size as usize);

        if !region.dirty {
            unsafe {
                M::discard(ptr, span)?;
                M::protect(ptr, span, Protection::None)?;
            }

            self.stats.cache_hits += 1;
            return Ok(());
        }

        // the store reads straight out of the live mapping, so the span has
        // to be readable until the write completed
        unsafe { M::protect(ptr, span, Protection::Read)? };

        let contents = unsafe { slice::from_raw_parts(ptr as *const u8, region.size as usize) };
        match region.key {
            Some(key) => self.store.overwrite(key, contents)?,
            None => region.key = Some(self.store.append(contents)?),
        }
        region.dirty = false;

        unsafe {
            M::discard(ptr, span)?;
            M::protect(ptr, span, Protection::None)?;
        }

        self.stats.writebacks += 1;
        Ok(())
    }

    /// Resolves an access fault at `fault_addr`.
    ///
    /// Returns `Ok(false)` if the address belongs to no region (or lies
    /// past a region's end), in which case the caller delegates to the
    /// previously installed handler. On `Ok(true)` the faulting
    /// instruction can be retried.
    ///
    /// ### Safety
    ///
    /// `fault_addr` and `kind` have to come from a genuine access fault on
    /// this thread; the region's pages are rewritten through raw pointers.
    pub(crate) unsafe fn handle_fault(&mut self, fault_addr: usize, kind: AccessKind) -> Result<bool> {
        let base = page_align(fault_addr);

        let (size, key, was_resident) = match self.regions.lookup_mut(base) {
            Some(region) => {
                // the bounds check is inclusive: an access at exactly
                // `size` is still resolved
                if fault_addr - base > region.size as usize {
                    return Ok(false);
                }

                if kind == AccessKind::Write {
                    region.dirty = true;
                }
                let was_resident = region.resident;
                region.resident = true;

                (region.size as usize, region.key, was_resident)
            }
            None => return Ok(false),
        };

        let ptr = base as *mut u8;
        let span = size_align(size);

        if was_resident {
            // freshly allocated: already queued, pages still inaccessible
            unsafe { M::protect(ptr, span, Protection::from(kind))? };
            return Ok(true);
        }

        if let Some(key) = key {
            unsafe { M::protect(ptr, span, Protection::ReadWrite)? };
            self.store
                .fetch(key, unsafe { slice::from_raw_parts_mut(ptr, size) })?;
        }
        // never persisted regions rematerialize as zero pages, nothing to
        // copy in

        // the region lands at the back of the queue, so the eviction below
        // cannot pick it
        self.cache_region(base)?;

        unsafe { M::protect(ptr, span, Protection::from(kind))? };
        Ok(true)
    }

    pub(crate) fn stats(&self) -> FsHeapStats {
        self.stats
    }
}

#[cfg(test)]
mod test {
    use super::ResidentRegionManager;
    use crate::modules::{
        memory_provider::MmapMemoryProvider,
        region_store::{test::get_test_store, FileRegionStoreModule},
    };

    type TestManager = ResidentRegionManager<FileRegionStoreModule, MmapMemoryProvider>;

    fn get_test_manager(test_name: &str, capacity: usize) -> TestManager {
        TestManager::new(get_test_store(test_name), capacity)
    }

    #[test]
    fn test_allocate_keeps_residency_bound() {
        let mut manager = get_test_manager("test_allocate_keeps_residency_bound", 2);

        let mut regions = vec![];
        for _ in 0..5 {
            regions.push(manager.allocate(16).unwrap());
            assert!(manager.residency.len() <= 2);
        }

        // untouched regions evict clean, the store is never written
        let stats = manager.stats();
        assert_eq!(stats.allocs, 5);
        assert_eq!(stats.cache_hits, 3);
        assert_eq!(stats.writebacks, 0);

        for region in regions {
            manager.free(region).unwrap();
        }
        assert_eq!(manager.stats().frees, 5);
        assert_eq!(manager.regions.len(), 0);
    }

    #[test]
    fn test_free_unknown_address_only_counts() {
        let mut manager = get_test_manager("test_free_unknown_address_only_counts", 4);

        manager.free(0x1000 as *mut u8).unwrap();

        let stats = manager.stats();
        assert_eq!(stats.frees, 1);
        assert_eq!(stats.allocs, 0);
    }

    #[test]
    fn test_evict_on_empty_queue_is_noop() {
        let mut manager = get_test_manager("test_evict_on_empty_queue_is_noop", 4);

        manager.evict_one().unwrap();

        let stats = manager.stats();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.writebacks, 0);
    }

    #[test]
    fn test_stale_queue_entry_is_skipped() {
        let mut manager = get_test_manager("test_stale_queue_entry_is_skipped", 4);

        let region = manager.allocate(8).unwrap();
        manager.free(region).unwrap();

        // the freed region is still queued; evicting it must change nothing
        manager.evict_one().unwrap();

        let stats = manager.stats();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.writebacks, 0);
    }
}
