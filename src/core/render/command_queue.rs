//=========================================================================
// Render Command Queue
//=========================================================================
//
// Double-buffered deferred-work queue shared by producer and consumer.
//
// Architecture:
// ```text
//   buffers: [Vec<RenderCommand>; 2]      submission_index: 0 | 1
//
//   Producer ──submit()──> buffers[submission_index]          (writable)
//   Consumer ──execute──> buffers[submission_index ^ 1]       (consumable)
//
//   swap_queues(): submission_index ^= 1
// ```
//
// Ownership changes hands only at swap time. The producer never writes
// the consumable buffer and the consumer never reads the writable one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;
use parking_lot::Mutex;

//=== RenderCommand =======================================================

/// One unit of deferred rendering work.
pub type RenderCommand = Box<dyn FnOnce() + Send + 'static>;

//=== CommandQueue ========================================================

/// The queue contract the render-thread coordinator drives.
///
/// Implementations must be shareable between the producer thread and the
/// render thread.
pub trait CommandQueue: Send + Sync {
    /// Appends a command to the writable buffer.
    fn submit(&self, command: RenderCommand);

    /// Toggles which buffer is writable and which is consumable.
    fn swap_queues(&self);

    /// Runs every command in the consumable buffer, in submission order.
    fn execute_consumable(&self);
}

//=== DoubleBufferedQueue =================================================

const BUFFER_COUNT: usize = 2;

/// Two command buffers indexed by a single parity bit.
pub struct DoubleBufferedQueue {
    buffers: [Mutex<Vec<RenderCommand>>; BUFFER_COUNT],
    submission_index: AtomicUsize,
}

impl DoubleBufferedQueue {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a queue with `capacity` command slots preallocated per buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: [
                Mutex::new(Vec::with_capacity(capacity)),
                Mutex::new(Vec::with_capacity(capacity)),
            ],
            submission_index: AtomicUsize::new(0),
        }
    }

    //--- Convenience ------------------------------------------------------

    /// Submits a closure without boxing it at the call site.
    pub fn submit_fn<F>(&self, command: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(command));
    }

    //--- Inspection -------------------------------------------------------

    /// Index of the buffer currently open for recording.
    pub fn submission_index(&self) -> usize {
        self.submission_index.load(Ordering::Acquire)
    }

    /// Index of the buffer the consumer executes next.
    pub fn consumable_index(&self) -> usize {
        (self.submission_index() + 1) % BUFFER_COUNT
    }

    /// Number of commands recorded into the writable buffer so far.
    pub fn len_writable(&self) -> usize {
        self.buffers[self.submission_index()].lock().len()
    }

    /// Number of commands waiting in the consumable buffer.
    pub fn len_consumable(&self) -> usize {
        self.buffers[self.consumable_index()].lock().len()
    }

    /// Drops every pending command in both buffers without running them.
    pub fn clear(&self) {
        for buffer in &self.buffers {
            buffer.lock().clear();
        }
    }
}

impl Default for DoubleBufferedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue for DoubleBufferedQueue {
    fn submit(&self, command: RenderCommand) {
        self.buffers[self.submission_index()].lock().push(command);
    }

    fn swap_queues(&self) {
        let previous = self.submission_index.fetch_xor(1, Ordering::AcqRel);
        trace!(
            target: "command_queue",
            "Swapped queues: submission {} -> {}",
            previous,
            previous ^ 1
        );
    }

    fn execute_consumable(&self) {
        let index = self.consumable_index();

        // Run outside the lock: commands may submit follow-up work.
        let mut batch = std::mem::take(&mut *self.buffers[index].lock());
        let count = batch.len();
        for command in batch.drain(..) {
            command();
        }

        // Hand the allocation back so the next frame does not regrow it.
        let mut slot = self.buffers[index].lock();
        if slot.is_empty() {
            *slot = batch;
        }

        trace!(target: "command_queue", "Executed {} commands from buffer {}", count, index);
    }
}

impl std::fmt::Debug for DoubleBufferedQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBufferedQueue")
            .field("submission_index", &self.submission_index())
            .field("writable", &self.len_writable())
            .field("consumable", &self.len_consumable())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> RenderCommand) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |value: u32| -> RenderCommand {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().push(value))
        };
        (log, make)
    }

    //=====================================================================
    // Parity
    //=====================================================================

    #[test]
    fn starts_recording_into_buffer_zero() {
        let queue = DoubleBufferedQueue::new();
        assert_eq!(queue.submission_index(), 0);
        assert_eq!(queue.consumable_index(), 1);
    }

    #[test]
    fn swap_flips_parity() {
        let queue = DoubleBufferedQueue::new();
        queue.swap_queues();
        assert_eq!(queue.submission_index(), 1);
        assert_eq!(queue.consumable_index(), 0);

        queue.swap_queues();
        assert_eq!(queue.submission_index(), 0);
    }

    #[test]
    fn writable_and_consumable_never_coincide() {
        let queue = DoubleBufferedQueue::new();
        for _ in 0..5 {
            assert_ne!(queue.submission_index(), queue.consumable_index());
            queue.swap_queues();
        }
    }

    //=====================================================================
    // Submission & Execution
    //=====================================================================

    #[test]
    fn submitted_work_is_not_consumable_until_swap() {
        let (log, make) = recorder();
        let queue = DoubleBufferedQueue::new();

        queue.submit(make(1));
        assert_eq!(queue.len_writable(), 1);

        queue.execute_consumable();
        assert!(log.lock().is_empty(), "Writable buffer must not be executed");

        queue.swap_queues();
        assert_eq!(queue.len_consumable(), 1);
        queue.execute_consumable();
        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn executes_in_submission_order() {
        let (log, make) = recorder();
        let queue = DoubleBufferedQueue::new();

        for value in 0..5 {
            queue.submit(make(value));
        }
        queue.swap_queues();
        queue.execute_consumable();

        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn execution_empties_consumable_buffer() {
        let (log, make) = recorder();
        let queue = DoubleBufferedQueue::new();
        queue.submit(make(7));
        queue.swap_queues();

        queue.execute_consumable();
        queue.execute_consumable();

        assert_eq!(*log.lock(), vec![7], "Commands must run exactly once");
        assert_eq!(queue.len_consumable(), 0);
    }

    #[test]
    fn execution_preserves_buffer_capacity() {
        let queue = DoubleBufferedQueue::with_capacity(32);
        for _ in 0..8 {
            queue.submit_fn(|| {});
        }
        queue.swap_queues();
        queue.execute_consumable();

        let capacity = queue.buffers[queue.consumable_index()].lock().capacity();
        assert!(capacity >= 32, "Capacity should survive execution, got {}", capacity);
    }

    #[test]
    fn command_may_submit_follow_up_work() {
        let queue = Arc::new(DoubleBufferedQueue::new());
        let (log, make) = recorder();
        let follow_up = make(2);

        let inner = Arc::clone(&queue);
        let first = make(1);
        queue.submit_fn(move || {
            first();
            inner.submit(follow_up);
        });

        queue.swap_queues();
        queue.execute_consumable();
        assert_eq!(*log.lock(), vec![1]);
        assert_eq!(queue.len_writable(), 1, "Follow-up lands in the writable buffer");

        queue.swap_queues();
        queue.execute_consumable();
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn clear_drops_pending_work() {
        let (log, make) = recorder();
        let queue = DoubleBufferedQueue::new();
        queue.submit(make(1));
        queue.swap_queues();
        queue.submit(make(2));

        queue.clear();
        queue.execute_consumable();

        assert!(log.lock().is_empty());
        assert_eq!(queue.len_writable(), 0);
    }
}
