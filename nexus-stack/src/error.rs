//! Error types.

use std::alloc::Layout;

use thiserror::Error;

/// Error returned by the fallible reservation paths of the byte buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReserveError {
    /// The requested capacity cannot be described by a valid [`Layout`].
    #[error("requested capacity exceeds the maximum allocation size")]
    CapacityOverflow,
    /// The global allocator returned null.
    #[error("memory allocation of {} bytes failed", layout.size())]
    AllocFailed {
        /// Layout of the allocation that failed.
        layout: Layout,
    },
}

/// Error reported when a container diverges from the reference stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadError {
    /// An element differs from the reference at `position`.
    #[error("step {step}: element {position} is {found}, expected {expected}")]
    Mismatch {
        /// Index of the command after which the divergence was observed.
        step: usize,
        /// Position of the first differing element.
        position: usize,
        /// Debug rendering of the reference element.
        expected: String,
        /// Debug rendering of the container element.
        found: String,
    },
    /// The container yielded a different number of elements.
    #[error("step {step}: container holds {found} elements, expected {expected}")]
    LengthMismatch {
        /// Index of the command after which the divergence was observed.
        step: usize,
        /// Length of the reference stack.
        expected: usize,
        /// Number of elements the cursor yielded.
        found: usize,
    },
}

/// Error returned by [`ThreadPool`](crate::pool::ThreadPool).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool was started twice without an intervening stop.
    #[error("thread pool is already running")]
    AlreadyStarted,
    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker {worker}: {message}")]
    Spawn {
        /// Index of the worker that could not be spawned.
        worker: usize,
        /// Rendering of the underlying I/O error.
        message: String,
    },
    /// A job panicked. The worker caught it and kept draining the queue.
    #[error("a job panicked on worker {worker}")]
    WorkerPanicked {
        /// Index of the first worker on which a job panicked.
        worker: usize,
    },
}

/// Error returned by [`profile_push_pop`](crate::profile::profile_push_pop).
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The worker pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// A latency histogram could not be created.
    #[error("failed to create latency histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),
    /// Fewer results came back than jobs were submitted.
    #[error("expected {expected} job results, got {found}")]
    MissingResults {
        /// Number of jobs submitted.
        expected: usize,
        /// Number of results collected.
        found: usize,
    },
}
