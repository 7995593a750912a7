//=========================================================================
// Thread Signal
//=========================================================================
//
// Binary wait/notify primitive shared between execution contexts.
//
// Modes:
//   AutoReset   → signal() releases exactly one waiter, then clears
//   ManualReset → signal() releases every waiter and stays raised
//                 until reset() is called
//
// Waiters suspend on a condition variable; there is no busy polling.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::trace;
use parking_lot::{Condvar, Mutex};

//=== SignalMode ==========================================================

/// Reset behavior of a [`ThreadSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// One waiter is released per signal and the signal is consumed.
    AutoReset,

    /// All waiters are released and the signal persists until reset.
    ManualReset,
}

//=== ThreadSignal ========================================================

/// Cross-thread event with auto-reset or manual-reset semantics.
///
/// Share it between threads behind an `Arc`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use zenith_runtime::core::thread::{SignalMode, ThreadSignal};
///
/// let signal = Arc::new(ThreadSignal::new("ready", SignalMode::AutoReset));
/// let remote = Arc::clone(&signal);
///
/// let handle = thread::spawn(move || remote.signal());
/// signal.wait();
/// handle.join().unwrap();
/// ```
#[derive(Debug)]
pub struct ThreadSignal {
    name: String,
    mode: SignalMode,
    pending: Mutex<bool>,
    condvar: Condvar,
}

impl ThreadSignal {
    //--- Construction -----------------------------------------------------

    /// Creates a new signal in the non-signaled state.
    pub fn new(name: impl Into<String>, mode: SignalMode) -> Self {
        Self {
            name: name.into(),
            mode,
            pending: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    //--- Accessors --------------------------------------------------------

    /// Diagnostic name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    /// Returns `true` if a signal is currently pending.
    pub fn is_signaled(&self) -> bool {
        *self.pending.lock()
    }

    //--- Waiting ----------------------------------------------------------

    /// Blocks the calling thread until the signal is raised.
    ///
    /// In auto-reset mode the pending signal is consumed by this call.
    pub fn wait(&self) {
        let mut pending = self.pending.lock();
        while !*pending {
            self.condvar.wait(&mut pending);
        }
        if self.mode == SignalMode::AutoReset {
            *pending = false;
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// Returns `true` if the signal was observed (and consumed, in
    /// auto-reset mode), `false` if the timeout elapsed first.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while !*pending {
            if self.condvar.wait_until(&mut pending, deadline).timed_out() {
                break;
            }
        }

        let observed = *pending;
        if observed && self.mode == SignalMode::AutoReset {
            *pending = false;
        }
        observed
    }

    //--- Signaling --------------------------------------------------------

    /// Raises the signal and wakes waiters.
    pub fn signal(&self) {
        let mut pending = self.pending.lock();
        *pending = true;
        trace!(target: "thread_signal", "'{}' signaled", self.name);

        match self.mode {
            SignalMode::AutoReset => {
                self.condvar.notify_one();
            }
            SignalMode::ManualReset => {
                self.condvar.notify_all();
            }
        }
    }

    /// Clears a pending signal without waking anyone.
    pub fn reset(&self) {
        *self.pending.lock() = false;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
