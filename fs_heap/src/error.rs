use std::io;

use thiserror::Error;

/// Errors surfaced by the allocator.
///
/// Every failure is fatal to the in-flight operation; there are no retries.
/// Failures hit while resolving an access fault cannot be surfaced to a
/// caller and terminate the process instead.
#[derive(Debug, Error)]
pub enum FsHeapError {
    /// Installing the access fault handler failed.
    #[error("installing the fault handler failed: {0}")]
    SignalInstall(#[source] io::Error),

    /// The running CPU offers no way to tell read faults from write faults.
    #[error("access fault decoding is not supported on this cpu")]
    UnsupportedCpu,

    /// The backing store could not be opened.
    #[error("opening the backing store failed: {0}")]
    StoreOpen(#[source] io::Error),

    /// A backing store operation failed.
    #[error("backing store operation failed: {0}")]
    Storage(#[source] io::Error),

    /// A mapping, protection or discard syscall failed.
    #[error("virtual memory operation `{op}` failed: {source}")]
    Vm {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// `init` has not been called (or `term` already was).
    #[error("allocator is not initialized")]
    Uninitialized,

    /// Another thread holds the allocator state. The allocator is
    /// single-threaded; this only fires on contract violations.
    #[error("allocator state is held by another thread")]
    Contended,
}

pub type Result<T> = core::result::Result<T, FsHeapError>;
