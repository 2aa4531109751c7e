/// Default bound on simultaneously resident regions.
pub const DEFAULT_REGION_CAPACITY: usize = 0x10_0000;

/// Configuration for [`init`](crate::init).
///
/// `capacity` bounds the number of regions that may be resident in RAM at
/// the same time, not their byte size.
#[derive(Debug, Clone)]
pub struct FsHeapConfig {
    pub capacity: usize,
}

impl Default for FsHeapConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_REGION_CAPACITY,
        }
    }
}
