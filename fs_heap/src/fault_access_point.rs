use core::mem;
use std::{io, ptr::null_mut};

use libc::{c_int, c_void};
use try_lock::TryLock;

use crate::{
    error::{FsHeapError, Result},
    modules::{cpu_fault, memory_provider::MmapMemoryProvider, region_store::FileRegionStoreModule},
    resident_region_manager::ResidentRegionManager,
};

pub(crate) type EngineManager = ResidentRegionManager<FileRegionStoreModule, MmapMemoryProvider>;

pub(crate) static FAULT_ACCESS_POINT: FaultAccessPoint = FaultAccessPoint::empty();

/// Process-wide home of the swap engine.
///
/// The OS delivers every access fault to the one installed handler, so the
/// engine state cannot live in a user-held object; `init` parks it here and
/// `term` takes it back out. The saved previous signal action is kept
/// separately so delegation still works while the engine state is locked
/// or already torn down.
pub(crate) struct FaultAccessPoint {
    manager: TryLock<Option<EngineManager>>,
    previous_action: TryLock<Option<libc::sigaction>>,
}

impl FaultAccessPoint {
    pub(crate) const fn empty() -> Self {
        Self {
            manager: TryLock::new(None),
            previous_action: TryLock::new(None),
        }
    }

    /// Swaps the parked engine, returning the old one. The allocator is
    /// single-threaded; a held lock here means the contract was broken.
    pub(crate) fn replace_manager(
        &self,
        manager: Option<EngineManager>,
    ) -> Result<Option<EngineManager>> {
        let mut guard = self.manager.try_lock().ok_or(FsHeapError::Contended)?;

        Ok(mem::replace(&mut *guard, manager))
    }

    pub(crate) fn with_manager<R>(
        &self,
        operation: impl FnOnce(&mut EngineManager) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.manager.try_lock().ok_or(FsHeapError::Contended)?;
        let manager = guard.as_mut().ok_or(FsHeapError::Uninitialized)?;

        operation(manager)
    }

    /// Installs the fault handler once per process, keeping the action
    /// that was active before. Re-initialization must not run `sigaction`
    /// again: it would save our own handler as the one to delegate to.
    pub(crate) fn ensure_handler_installed(&self) -> Result<()> {
        let mut guard = self
            .previous_action
            .try_lock()
            .ok_or(FsHeapError::Contended)?;

        if guard.is_none() {
            let mut new_action: libc::sigaction = unsafe { mem::zeroed() };
            new_action.sa_sigaction = fault_handler as usize;
            new_action.sa_flags = libc::SA_SIGINFO;
            unsafe { libc::sigemptyset(&mut new_action.sa_mask) };

            let mut previous: libc::sigaction = unsafe { mem::zeroed() };
            if unsafe { libc::sigaction(libc::SIGSEGV, &new_action, &mut previous) } != 0 {
                return Err(FsHeapError::SignalInstall(io::Error::last_os_error()));
            }

            *guard = Some(previous);
        }

        Ok(())
    }

    fn on_fault(&self, sig: c_int, info: *mut libc::siginfo_t, ctx: *mut c_void) {
        if let Some(mut guard) = self.manager.try_lock() {
            if let Some(manager) = guard.as_mut() {
                let fault_addr = unsafe { (*info).si_addr() } as usize;
                let kind = unsafe { cpu_fault::decode_access(ctx) };

                match unsafe { manager.handle_fault(fault_addr, kind) } {
                    // resolved; the faulting instruction retries
                    Ok(true) => return,
                    // the address belongs to no region
                    Ok(false) => {}
                    // returning without resolving the fault would loop
                    // forever on the same instruction
                    Err(err) => fatal(&err),
                }
            }
        }

        self.delegate(sig, info, ctx);
    }

    /// Hands a fault that is not ours to whatever was installed before
    /// `init`.
    fn delegate(&self, sig: c_int, info: *mut libc::siginfo_t, ctx: *mut c_void) {
        let previous = self
            .previous_action
            .try_lock()
            .and_then(|guard| *guard);

        let Some(previous) = previous else {
            return raise_default(sig);
        };

        match previous.sa_sigaction {
            libc::SIG_IGN => {}
            libc::SIG_DFL => raise_default(sig),
            handler => unsafe {
                if previous.sa_flags & libc::SA_SIGINFO != 0 {
                    let action: extern "C" fn(c_int, *mut libc::siginfo_t, *mut c_void) =
                        mem::transmute(handler);
                    action(sig, info, ctx);
                } else {
                    let action: extern "C" fn(c_int) = mem::transmute(handler);
                    action(sig);
                }
            },
        }
    }
}

extern "C" fn fault_handler(sig: c_int, info: *mut libc::siginfo_t, ctx: *mut c_void) {
    FAULT_ACCESS_POINT.on_fault(sig, info, ctx);
}

/// Reinstalls the default disposition and returns; the retried instruction
/// faults again and the kernel takes over.
fn raise_default(sig: c_int) {
    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = libc::SIG_DFL;

    unsafe { libc::sigaction(sig, &action, null_mut()) };
}

fn fatal(err: &FsHeapError) -> ! {
    // this runs in a signal handler, so no formatting and no allocation;
    // static bytes only
    let msg: &[u8] = match err {
        FsHeapError::Storage(_) => b"fs_heap: backing store failed while resolving an access fault\n",
        _ => b"fs_heap: virtual memory operation failed while resolving an access fault\n",
    };

    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr() as *const c_void, msg.len());
        libc::abort()
    }
}
