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

use std::collections::VecDeque;

/// FIFO of resident region base addresses; the front is the next eviction
/// victim. An address appears at most once. Accesses do not reorder
/// entries, a region only re-enters at the back when it faults in again.
pub(crate) struct ResidencyQueue {
    queue: VecDeque<usize>,
}

impl ResidencyQueue {
    /// `capacity` is the configured residency bound. The queue holds at
    /// most one extra entry (pushed, not yet evicted down), and that push
    /// happens inside the fault handler, so all backing memory is reserved
    /// here and never grown later.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub(crate) fn push_back(&mut self, base: usize) {
        self.queue.push_back(base);
    }

    pub(crate) fn pop_front(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod test {
    use super::ResidencyQueue;

    #[test]
    fn test_fifo_order() {
        let mut queue = ResidencyQueue::new(8);

        queue.push_back(0x1000);
        queue.push_back(0x2000);
        queue.push_back(0x3000);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop_front(), Some(0x1000));
        assert_eq!(queue.pop_front(), Some(0x2000));

        queue.push_back(0x1000);
        assert_eq!(queue.pop_front(), Some(0x3000));
        assert_eq!(queue.pop_front(), Some(0x1000));
        assert_eq!(queue.pop_front(), None);
    }
}
