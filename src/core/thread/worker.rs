//=========================================================================
// Worker
//=========================================================================
//
// Named background execution context.
//
// Lifecycle:
//   Worker::new(name) ──dispatch(f)──> [OS thread "name"] ──join()──> done
//
// The OS-level thread name is set at spawn time so it shows up in
// debuggers, profilers and panic messages.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread::{self, JoinHandle, ThreadId};

use log::{debug, error, info, warn};
use thiserror::Error;

//=== ThreadError =========================================================

/// Failure to create a background execution context.
///
/// Usually fatal for the caller: without the thread the engine cannot
/// run in the requested threading mode.
#[derive(Debug, Error)]
pub enum ThreadError {
    /// The OS refused to spawn the thread.
    #[error("failed to spawn thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// `dispatch` was called while the worker was still running.
    #[error("thread '{0}' is already running")]
    AlreadyRunning(String),
}

//=== Worker ==============================================================

/// A named thread that can be started once per dispatch and joined.
pub struct Worker {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    //--- Construction -----------------------------------------------------

    /// Creates a worker description. No thread is spawned yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the spawned thread, `None` if not running.
    pub fn id(&self) -> Option<ThreadId> {
        self.handle.as_ref().map(|handle| handle.thread().id())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    //--- Execution --------------------------------------------------------

    /// Spawns the thread and runs `task` on it.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::Spawn`] if the OS cannot create the thread
    /// and [`ThreadError::AlreadyRunning`] if a previous dispatch has not
    /// been joined.
    pub fn dispatch<F>(&mut self, task: F) -> Result<(), ThreadError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(ThreadError::AlreadyRunning(self.name.clone()));
        }

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(task)
            .map_err(|source| ThreadError::Spawn {
                name: self.name.clone(),
                source,
            })?;

        info!(target: "worker", "Thread '{}' started", self.name);
        self.handle = Some(handle);
        Ok(())
    }

    /// Blocks until the thread finishes.
    ///
    /// Joining a worker that was never dispatched is a no-op. A panic on
    /// the worker thread is logged, not propagated.
    pub fn join(&mut self) {
        let Some(handle) = self.handle.take() else {
            debug!(target: "worker", "Thread '{}' not running, nothing to join", self.name);
            return;
        };

        if handle.thread().id() == thread::current().id() {
            warn!(target: "worker", "Thread '{}' cannot join itself", self.name);
            return;
        }

        match handle.join() {
            Ok(()) => info!(target: "worker", "Thread '{}' joined", self.name),
            Err(e) => error!(target: "worker", "Thread '{}' panicked: {:?}", self.name, e),
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
