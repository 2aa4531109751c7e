use libc::c_void;

/// What the faulting instruction was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// Whether the running CPU can tell read faults from write faults.
///
/// Without that distinction every clean eviction would have to be treated
/// as dirty, so initialization refuses to proceed on unsupported targets.
pub(crate) const fn supported() -> bool {
    cfg!(target_arch = "x86_64")
}

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use libc::c_void;

    use super::AccessKind;

    /// Write bit of the page fault error code saved in `REG_ERR`.
    const PF_WRITE: i64 = 0x2;

    pub(super) unsafe fn decode_access(ctx: *mut c_void) -> AccessKind {
        let context = &*(ctx as *const libc::ucontext_t);

        if context.uc_mcontext.gregs[libc::REG_ERR as usize] & PF_WRITE != 0 {
            AccessKind::Write
        } else {
            AccessKind::Read
        }
    }
}

/// Extracts the access kind from the trap context the OS handed to the
/// fault handler.
///
/// ### Safety
///
/// `ctx` has to be the `ucontext_t` pointer passed to an `SA_SIGINFO`
/// signal handler on this thread.
#[cfg(target_arch = "x86_64")]
pub(crate) unsafe fn decode_access(ctx: *mut c_void) -> AccessKind {
    x86_64::decode_access(ctx)
}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) unsafe fn decode_access(_ctx: *mut c_void) -> AccessKind {
    unreachable!("initialization fails on cpus without access fault decoding")
}
