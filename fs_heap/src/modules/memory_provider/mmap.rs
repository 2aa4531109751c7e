use std::{io, ptr::null_mut};

use libc::{
    c_void, madvise, mmap, mprotect, munmap, MADV_DONTNEED, MAP_ANONYMOUS, MAP_FAILED,
    MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE,
};

use super::{MemoryProviderModule, Protection};
use crate::error::{FsHeapError, Result};

fn prot_flags(protection: Protection) -> libc::c_int {
    match protection {
        Protection::None => PROT_NONE,
        Protection::Read => PROT_READ,
        Protection::ReadWrite => PROT_READ | PROT_WRITE,
    }
}

fn vm_error(op: &'static str) -> FsHeapError {
    FsHeapError::Vm {
        op,
        source: io::Error::last_os_error(),
    }
}

pub struct MmapMemoryProvider;

impl MemoryProviderModule for MmapMemoryProvider {
    unsafe fn map_region(size: usize) -> Result<*mut u8> {
        let base_ptr = unsafe {
            mmap(
                null_mut(),
                size,
                PROT_NONE,
                MAP_PRIVATE | MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if base_ptr == MAP_FAILED {
            return Err(vm_error("mmap"));
        }

        Ok(base_ptr as *mut u8)
    }

    unsafe fn unmap_region(ptr: *mut u8, size: usize) -> Result<()> {
        if unsafe { munmap(ptr as *mut c_void, size) } != 0 {
            return Err(vm_error("munmap"));
        }

        Ok(())
    }

    unsafe fn protect(ptr: *mut u8, size: usize, protection: Protection) -> Result<()> {
        if unsafe { mprotect(ptr as *mut c_void, size, prot_flags(protection)) } != 0 {
            return Err(vm_error("mprotect"));
        }

        Ok(())
    }

    unsafe fn discard(ptr: *mut u8, size: usize) -> Result<()> {
        if unsafe { madvise(ptr as *mut c_void, size, MADV_DONTNEED) } != 0 {
            return Err(vm_error("madvise"));
        }

        Ok(())
    }
}
