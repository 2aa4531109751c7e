/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    collections::HashMap,
    fs::{remove_file, File},
    mem::ManuallyDrop,
    os::unix::fs::FileExt,
    path::{Path, PathBuf},
};

use super::{RegionStoreModule, StoreKey};
use crate::error::{FsHeapError, Result};

struct FreeSlot {
    offset: u64,
    len: u32,
}

/// Heap-style blob store over a single flat file.
///
/// Keys are byte offsets into the file. Removed slots are recycled by later
/// appends of the same length. All I/O is positional (`pread`/`pwrite`), so
/// calls are legal while an access fault is being resolved.
pub struct FileRegionStoreModule {
    /// underlying file holding all blobs
    file: ManuallyDrop<File>,

    /// path of file, save for deleting file later
    file_path: PathBuf,

    /// append frontier, one past the last blob
    end: u64,

    /// lengths of live blobs by offset
    entries: HashMap<u64, u32>,

    free_slots: Vec<FreeSlot>,
}

impl FileRegionStoreModule {
    /// Opens the store at `file_path`, truncating any previous contents.
    /// Nothing survives a restart.
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .truncate(true)
            .create(true)
            .open(file_path.as_ref())?;

        Ok(Self {
            file: ManuallyDrop::new(file),
            file_path: file_path.as_ref().to_path_buf(),
            end: 0,
            entries: HashMap::new(),
            free_slots: Vec::new(),
        })
    }
}

impl RegionStoreModule for FileRegionStoreModule {
    fn append(&mut self, src: &[u8]) -> Result<StoreKey> {
        let len = src.len() as u32;

        let offset = match self.free_slots.iter().position(|slot| slot.len == len) {
            Some(index) => self.free_slots.swap_remove(index).offset,
            None => {
                let offset = self.end;
                self.end += u64::from(len);
                offset
            }
        };

        self.file
            .write_all_at(src, offset)
            .map_err(FsHeapError::Storage)?;
        self.entries.insert(offset, len);

        Ok(StoreKey(offset))
    }

    fn overwrite(&mut self, key: StoreKey, src: &[u8]) -> Result<()> {
        debug_assert_eq!(
            self.entries.get(&key.0).copied(),
            Some(src.len() as u32),
            "blob length changed for offset {}",
            key.0
        );

        self.file
            .write_all_at(src, key.0)
            .map_err(FsHeapError::Storage)
    }

    fn fetch(&mut self, key: StoreKey, dest: &mut [u8]) -> Result<()> {
        debug_assert_eq!(
            self.entries.get(&key.0).copied(),
            Some(dest.len() as u32),
            "blob length changed for offset {}",
            key.0
        );

        self.file
            .read_exact_at(dest, key.0)
            .map_err(FsHeapError::Storage)
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        if let Some(len) = self.entries.remove(&key.0) {
            self.free_slots.push(FreeSlot {
                offset: key.0,
                len,
            });
        }

        Ok(())
    }
}

impl Drop for FileRegionStoreModule {
    fn drop(&mut self) {
        // drop and close file before removing
        // note that after this call, file should never be accessed again...
        unsafe {
            ManuallyDrop::drop(&mut self.file);
        }

        if self.file_path.exists() {
            let _ = remove_file(&self.file_path);
        }
    }
}
