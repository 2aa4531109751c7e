mod file_store;

pub use file_store::FileRegionStoreModule;

use crate::error::Result;

/// Opaque handle to a blob held by a region store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey(u64);

/// A durable key-value store for evicted region contents.
///
/// Blobs are opaque; a region's blob always has the region's exact byte
/// size, so `overwrite` and `fetch` never see a length change for a given
/// key.
pub trait RegionStoreModule {
    /// Stores a new blob and returns a fresh key for it.
    fn append(&mut self, src: &[u8]) -> Result<StoreKey>;

    /// Replaces the blob at `key`. `src.len()` equals the length passed to
    /// the `append` that produced `key`.
    fn overwrite(&mut self, key: StoreKey, src: &[u8]) -> Result<()>;

    /// Reads the blob at `key` into `dest`.
    ///
    /// The caller provides the destination so that no allocation happens
    /// here; this is called while an access fault is being resolved.
    fn fetch(&mut self, key: StoreKey, dest: &mut [u8]) -> Result<()>;

    /// Deletes the blob at `key`. Removing an unknown key is a no-op.
    fn remove(&mut self, key: StoreKey) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod test {
    use super::{FileRegionStoreModule, RegionStoreModule};

    pub(crate) fn get_test_store(test_name: &str) -> FileRegionStoreModule {
        FileRegionStoreModule::new(format!("/tmp/{}.tmp", test_name)).unwrap()
    }

    fn gen_number(i: usize) -> u8 {
        (i * 3 + (i % 3) * 7 + (i % 11) * 51) as u8
    }

    /// append and fetch restore every blob unchanged
    pub(super) fn test_store_roundtrip<S: RegionStoreModule>(mut store: S) {
        const BLOB_SIZE: usize = 128;
        const BLOB_COUNT: usize = 32;

        let mut keys = vec![];
        for blob in 0..BLOB_COUNT {
            let mut data = [0u8; BLOB_SIZE];
            for i in 0..BLOB_SIZE {
                data[i] = gen_number(blob * BLOB_SIZE + i);
            }

            keys.push(store.append(&data).unwrap());
        }

        let mut buffer = [0u8; BLOB_SIZE];
        for (blob, key) in keys.iter().enumerate() {
            store.fetch(*key, &mut buffer).unwrap();

            for i in 0..BLOB_SIZE {
                assert_eq!(buffer[i], gen_number(blob * BLOB_SIZE + i));
            }
        }
    }

    /// overwrite replaces exactly the addressed blob
    pub(super) fn test_store_overwrite<S: RegionStoreModule>(mut store: S) {
        let first = store.append(&[1u8; 64]).unwrap();
        let second = store.append(&[2u8; 64]).unwrap();

        store.overwrite(first, &[9u8; 64]).unwrap();

        let mut buffer = [0u8; 64];
        store.fetch(first, &mut buffer).unwrap();
        assert_eq!(buffer, [9u8; 64]);

        store.fetch(second, &mut buffer).unwrap();
        assert_eq!(buffer, [2u8; 64]);
    }
}
