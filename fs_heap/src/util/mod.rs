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

/// efficient way to calculate: ceil(x / y)
pub(crate) fn ceil_div(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

pub(crate) fn get_page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) as usize }
}

/// Aligns an address down to the start of its page.
///
/// Every region base is page-aligned, so the aligned fault address is
/// exactly the key the region table is indexed by.
pub(crate) fn page_align(addr: usize) -> usize {
    addr & !(get_page_size() - 1)
}

/// Rounds a byte count up to a multiple of the page size.
pub(crate) fn size_align(size: usize) -> usize {
    ceil_div(size, get_page_size()) * get_page_size()
}

#[cfg(test)]
mod test {
    use super::{ceil_div, get_page_size, page_align, size_align};

    #[test]
    fn test_ceil_div() {
        // just test a bunch of different values
        for y in 1..100 {
            for x in 0..y * 3 {
                let expected_value = if x % y == 0 { x / y } else { (x / y) + 1 };

                assert_eq!(ceil_div(x, y), expected_value);
            }
        }
    }

    #[test]
    fn test_page_align() {
        let page_size = get_page_size();

        assert_eq!(page_align(0), 0);
        assert_eq!(page_align(page_size), page_size);
        assert_eq!(page_align(page_size + 1), page_size);
        assert_eq!(page_align(page_size * 3 - 1), page_size * 2);
    }

    #[test]
    fn test_size_align() {
        let page_size = get_page_size();

        assert_eq!(size_align(0), 0);
        assert_eq!(size_align(1), page_size);
        assert_eq!(size_align(page_size), page_size);
        assert_eq!(size_align(page_size + 1), page_size * 2);
    }
}
