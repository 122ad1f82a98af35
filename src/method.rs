//! The common lifecycle contract shared by every long-running operation in
//! this crate: file imports and signal-processing algorithms alike.
//!
//! A method conceptually moves through `Idle -> Running -> {Completed |
//! Canceled | Failed}`. The three right-hand states are terminal. Methods
//! run on whatever thread the caller drives [`Method::execute`] on; there is
//! no built-in thread pool. Cancellation and progress may be observed from
//! other threads through the shared handles a method exposes.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// A cloneable, thread-safe cancellation flag.
///
/// Cancellation is cooperative: setting the flag does not interrupt anything
/// by itself, the running operation polls it at well-defined points and
/// terminates as soon as practical, yielding no result. Once a method has
/// reached a terminal state, cancelling is a no-op.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative termination. Idempotent, callable from any thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sentinel bit pattern meaning "progress not yet determinable". Never
/// produced by [`ProgressTracker::update`], which clamps to `[0, 1]`.
const UNKNOWN: u32 = u32::MAX;

/// A cloneable, thread-safe progress fraction in `[0, 1]`, or unknown.
///
/// Stored as the bit pattern of an `f32` in an atomic so a watcher thread can
/// poll it while `execute` holds the method itself exclusively.
#[derive(Debug, Clone)]
pub struct ProgressTracker(Arc<AtomicU32>);

impl Default for ProgressTracker {
    fn default() -> Self {
        Self(Arc::new(AtomicU32::new(UNKNOWN)))
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, fraction: f32) {
        self.0
            .store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// The current fraction, or `None` while the total work is unknown.
    pub fn fraction(&self) -> Option<f32> {
        match self.0.load(Ordering::Relaxed) {
            UNKNOWN => None,
            bits => Some(f32::from_bits(bits)),
        }
    }
}

/// A cancellable, progress-reporting operation producing one result.
///
/// [`Method::execute`] blocks the calling thread for the full duration of the
/// operation and must be called exactly once; the behavior of a second call
/// is unspecified and documented as a caller error. A canceled run finishes
/// with `Ok(None)` rather than an error, and leaves [`Method::result`] empty.
pub trait Method {
    type Output;
    type Error;

    /// Run the operation to completion. Returns a reference to the finished
    /// result, `Ok(None)` if the operation was canceled, or the terminal
    /// error that stopped it.
    fn execute(&mut self) -> Result<Option<&Self::Output>, Self::Error>;

    /// Fraction of the work done in `[0, 1]`, or `None` while the total is
    /// not yet determinable.
    fn progress(&self) -> Option<f32>;

    /// The last completed result, or `None` before completion and after
    /// cancellation.
    fn result(&self) -> Option<&Self::Output>;

    /// A handle that requests cancellation of this method from any thread.
    fn cancel_token(&self) -> CancelToken;

    /// Request cooperative termination. Idempotent.
    fn cancel(&self) {
        self.cancel_token().cancel();
    }
}
