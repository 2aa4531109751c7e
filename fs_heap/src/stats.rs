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

/// Global usage counters, monotonically non-decreasing over the lifetime of
/// one `init`..`term` span.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FsHeapStats {
    /// Completed `allocate` calls.
    pub allocs: u64,

    /// Completed `free` calls, including frees of unknown addresses.
    pub frees: u64,

    /// Clean evictions that required no store write.
    pub cache_hits: u64,

    /// Dirty evictions that persisted the region to the store.
    pub writebacks: u64,
}
