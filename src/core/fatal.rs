//=========================================================================
// Fatal Signal
//=========================================================================
//
// Application-owned registry of last-chance cleanup callbacks.
//
// Subsystems that hold resources needing release on a fatal error
// register a callback here. The service is passed around explicitly
// (`Arc<FatalSignal>`) rather than living in a process-wide static.
//
// Flow:
//   die(reason) ──> arm watchdog (abort after timeout)
//               ──> run_callbacks(reason)   (once; nested calls skip)
//               ──> process::exit
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, warn};
use parking_lot::Mutex;

//=== FatalSignal =========================================================

type FatalCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Cleanup callbacks run when the application hits a fatal condition.
pub struct FatalSignal {
    callbacks: Mutex<Vec<FatalCallback>>,
    timeout: Duration,
    active: AtomicBool,
}

impl FatalSignal {
    //--- Construction -----------------------------------------------------

    /// Creates the service. `timeout` bounds how long callbacks may run
    /// inside [`die`](Self::die) before the process is aborted.
    pub fn new(timeout: Duration) -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
            timeout,
            active: AtomicBool::new(false),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` once a fatal condition has been handled.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    //--- Registration -----------------------------------------------------

    /// Registers a callback, run in registration order.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.lock().push(Box::new(callback));
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    //--- Handling ---------------------------------------------------------

    /// Runs every registered callback once.
    ///
    /// Returns `false` without running anything if a fatal condition is
    /// already being handled (a callback itself failed, or two threads
    /// raced into the handler).
    pub fn run_callbacks(&self, reason: &str) -> bool {
        if self.active.swap(true, Ordering::AcqRel) {
            error!(target: "fatal", "Nested fatal error: {}", reason);
            return false;
        }

        error!(target: "fatal", "Fatal signal received: {}", reason);

        // Taken out so a callback may register more without deadlocking.
        let callbacks = std::mem::take(&mut *self.callbacks.lock());
        for callback in &callbacks {
            callback();
        }
        true
    }

    /// Runs callbacks from the panic hook, then the previously installed hook.
    pub fn install_panic_hook(self: &Arc<Self>) {
        let fatal = Arc::clone(self);
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            fatal.run_callbacks(&info.to_string());
            previous(info);
        }));
    }

    /// Handles a fatal condition and terminates the process.
    ///
    /// A watchdog aborts the process if the callbacks do not finish
    /// within the configured timeout.
    pub fn die(&self, reason: &str) -> ! {
        let timeout = self.timeout;
        let watchdog = thread::Builder::new()
            .name("Fatal Watchdog".into())
            .spawn(move || {
                thread::sleep(timeout);
                error!(target: "fatal", "Fatal signal timeout after {:?}", timeout);
                std::process::abort();
            });
        if let Err(e) = watchdog {
            warn!(target: "fatal", "Fatal watchdog unavailable: {}", e);
        }

        self.run_callbacks(reason);
        std::process::exit(1);
    }
}

impl std::fmt::Debug for FatalSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FatalSignal")
            .field("callbacks", &self.callback_count())
            .field("timeout", &self.timeout)
            .field("active", &self.is_active())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn signal() -> Arc<FatalSignal> {
        Arc::new(FatalSignal::new(Duration::from_millis(3000)))
    }

    #[test]
    fn runs_callbacks_in_registration_order() {
        let fatal = signal();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = Arc::clone(&order);
            fatal.add_callback(move || order.lock().push(id));
        }

        assert!(fatal.run_callbacks("test"));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert!(fatal.is_active());
    }

    #[test]
    fn second_fatal_is_nested_and_skips_callbacks() {
        let fatal = signal();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        fatal.add_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(fatal.run_callbacks("first"));
        assert!(!fatal.run_callbacks("second"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_can_register_without_deadlock() {
        let fatal = signal();
        let inner = Arc::clone(&fatal);
        fatal.add_callback(move || inner.add_callback(|| {}));

        assert!(fatal.run_callbacks("reentrant"));
        assert_eq!(fatal.callback_count(), 1);
    }

    #[test]
    fn inactive_until_handled() {
        let fatal = signal();
        assert!(!fatal.is_active());
        assert_eq!(fatal.callback_count(), 0);
        assert_eq!(fatal.timeout(), Duration::from_millis(3000));
    }
}
