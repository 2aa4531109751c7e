use std::sync::{Mutex, MutexGuard};

use crate::{FsHeapConfig, FsHeapStats};

mod out_of_bounds;
mod protection;

/// The allocator is process-wide, so only one test may drive it at a time.
static ENGINE_MUTEX: Mutex<()> = Mutex::new(());

pub(crate) fn store_path(test_name: &str) -> String {
    format!("/tmp/{}.store", test_name)
}

/// Serializes the calling test and starts a fresh allocator instance with
/// its own store file. The returned guard has to stay alive until the test
/// called `term`.
pub(crate) fn setup(test_name: &str, capacity: usize) -> MutexGuard<'static, ()> {
    let guard = ENGINE_MUTEX
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let _ = env_logger::builder().is_test(true).try_init();

    crate::init(store_path(test_name), FsHeapConfig { capacity }).unwrap();
    guard
}

// volatile accessors so every access really hits the mapping instead of a
// value the compiler remembered

pub(crate) unsafe fn write_slice(ptr: *mut u8, data: &[u8]) {
    for (i, byte) in data.iter().enumerate() {
        ptr.add(i).write_volatile(*byte);
    }
}

pub(crate) unsafe fn read_vec(ptr: *const u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| ptr.add(i).read_volatile()).collect()
}

pub(crate) fn assert_monotonic(previous: &FsHeapStats, current: &FsHeapStats) {
    assert!(current.allocs >= previous.allocs);
    assert!(current.frees >= previous.frees);
    assert!(current.cache_hits >= previous.cache_hits);
    assert!(current.writebacks >= previous.writebacks);
}
