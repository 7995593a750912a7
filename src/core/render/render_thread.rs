//=========================================================================
// Render Thread
//=========================================================================
//
// Producer/consumer coordinator between the frame loop and the render
// thread.
//
// Architecture:
// ```text
//  Producer (frame loop)                Consumer ("Render Thread")
//  ─────────────────────                ─────────────────────────
//  submit() → writable buffer
//  pump():
//    next_frame()  ── swap_queues()
//    kick()        ── state = Kicked ──>  wait_and_set(Kicked, Running)
//                                         execute_consumable()
//    block_until_render_complete() <───── set(Idle)
//       (wait for Idle)                   running? loop : exit
// ```
//
// SingleThreaded policy: no consumer thread exists. kick() executes the
// consumable buffer inline and every wait/set is a no-op, so the same
// commands run in the same order without overlap.
//
// Misuse (double kick, pumping after the consumer died) blocks forever.
// There is no timeout here; liveness is the application's concern.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::{debug, info, trace, warn};
use parking_lot::{Condvar, Mutex};

//=== Internal Dependencies ===============================================

use super::command_queue::CommandQueue;
use super::state::{RenderState, ThreadingPolicy};
use crate::core::thread::{ThreadError, Worker};

//=== ConsumerProbe =======================================================

/// Cloneable answer to "am I on the render thread?".
///
/// Handed to subsystems that must assert which context they run on,
/// e.g. to forbid GPU calls from the frame loop.
#[derive(Debug, Clone, Default)]
pub struct ConsumerProbe {
    consumer: Arc<Mutex<Option<ThreadId>>>,
}

impl ConsumerProbe {
    /// Returns `true` iff the calling thread is the recorded consumer.
    pub fn is_current(&self) -> bool {
        *self.consumer.lock() == Some(thread::current().id())
    }

    /// The recorded consumer identity, `None` before run / after terminate.
    pub fn consumer_id(&self) -> Option<ThreadId> {
        *self.consumer.lock()
    }

    fn record(&self, id: Option<ThreadId>) {
        *self.consumer.lock() = id;
    }
}

//=== RenderSync ==========================================================
//
// State shared with the consumer thread. The policy check lives in
// RenderThread; these methods always block.
//
struct RenderSync {
    state: Mutex<RenderState>,
    state_changed: Condvar,
    running: AtomicBool,

    #[cfg(test)]
    history: Mutex<Vec<RenderState>>,
}

impl RenderSync {
    fn new() -> Self {
        Self {
            state: Mutex::new(RenderState::Idle),
            state_changed: Condvar::new(),
            running: AtomicBool::new(false),
            #[cfg(test)]
            history: Mutex::new(vec![RenderState::Idle]),
        }
    }

    fn wait(&self, target: RenderState) {
        let mut state = self.state.lock();
        while *state != target {
            self.state_changed.wait(&mut state);
        }
    }

    fn set(&self, next: RenderState) {
        let mut state = self.state.lock();
        self.assign(&mut state, next);
    }

    fn wait_and_set(&self, target: RenderState, next: RenderState) {
        let mut state = self.state.lock();
        while *state != target {
            self.state_changed.wait(&mut state);
        }
        self.assign(&mut state, next);
    }

    // Caller holds the lock.
    fn assign(&self, state: &mut RenderState, next: RenderState) {
        if !state.can_transition_to(next) {
            warn!(
                target: "render_thread",
                "Illegal render state transition {:?} -> {:?}",
                *state,
                next
            );
        }
        *state = next;

        #[cfg(test)]
        self.history.lock().push(next);

        self.state_changed.notify_all();
    }

    fn current(&self) -> RenderState {
        *self.state.lock()
    }
}

//=== Consumer Loop =======================================================
//
// Runs on the render thread under MultiThreaded. The running flag is
// sampled before returning to Idle: the producer is still blocked then,
// so it cannot clear the flag between the sample and its next kick. The
// terminate pump is therefore always serviced before the thread exits.
//
fn render_thread_loop(sync: &RenderSync, queue: &dyn CommandQueue) {
    debug!(target: "render_thread", "Render loop entered");

    loop {
        sync.wait_and_set(RenderState::Kicked, RenderState::Running);
        queue.execute_consumable();

        let keep_running = sync.running.load(Ordering::Acquire);
        sync.set(RenderState::Idle);

        if !keep_running {
            break;
        }
    }

    debug!(target: "render_thread", "Render loop exited");
}

//=== RenderThread ========================================================

/// Frame-boundary coordinator between the producer and the render thread.
///
/// Created once with a fixed [`ThreadingPolicy`], started with
/// [`run`](Self::run), pumped once per frame and torn down with
/// [`terminate`](Self::terminate) (also invoked on drop).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use zenith_runtime::core::render::{DoubleBufferedQueue, RenderThread, ThreadingPolicy};
///
/// let queue = Arc::new(DoubleBufferedQueue::new());
/// let mut render_thread = RenderThread::new(ThreadingPolicy::MultiThreaded, queue.clone());
/// render_thread.run().unwrap();
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&counter);
/// queue.submit_fn(move || { c.fetch_add(1, Ordering::SeqCst); });
///
/// render_thread.pump();
/// assert_eq!(counter.load(Ordering::SeqCst), 1);
///
/// render_thread.terminate();
/// ```
pub struct RenderThread {
    policy: ThreadingPolicy,
    sync: Arc<RenderSync>,
    queue: Arc<dyn CommandQueue>,
    worker: Worker,
    consumer: ConsumerProbe,
    frame: u64,
}

impl RenderThread {
    //--- Construction -----------------------------------------------------

    /// Creates the coordinator. No thread is spawned until [`run`](Self::run).
    pub fn new(policy: ThreadingPolicy, queue: Arc<dyn CommandQueue>) -> Self {
        debug!(target: "render_thread", "Render thread coordinator created ({:?})", policy);
        Self {
            policy,
            sync: Arc::new(RenderSync::new()),
            queue,
            worker: Worker::new("Render Thread"),
            consumer: ConsumerProbe::default(),
            frame: 0,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Starts the coordinator, spawning the render thread if multi-threaded.
    ///
    /// Calling `run` on a coordinator that is already running is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError`] if the render thread could not be spawned.
    /// The coordinator is left stopped in that case.
    pub fn run(&mut self) -> Result<(), ThreadError> {
        if self.sync.running.swap(true, Ordering::AcqRel) {
            warn!(target: "render_thread", "run() called on a running render thread");
            return Ok(());
        }

        match self.policy {
            ThreadingPolicy::MultiThreaded => {
                let sync = Arc::clone(&self.sync);
                let queue = Arc::clone(&self.queue);

                if let Err(e) = self
                    .worker
                    .dispatch(move || render_thread_loop(&sync, queue.as_ref()))
                {
                    self.sync.running.store(false, Ordering::Release);
                    return Err(e);
                }

                self.consumer.record(self.worker.id());
            }
            ThreadingPolicy::SingleThreaded => {
                self.consumer.record(Some(thread::current().id()));
            }
        }

        info!(target: "render_thread", "Render thread running ({:?})", self.policy);
        Ok(())
    }

    /// Flushes outstanding work and stops the render thread.
    ///
    /// Idempotent: later calls, or a call without a prior
    /// [`run`](Self::run), return immediately.
    pub fn terminate(&mut self) {
        if !self.sync.running.swap(false, Ordering::AcqRel) {
            debug!(target: "render_thread", "terminate() on a stopped render thread ignored");
            return;
        }

        // Final pump wakes the consumer so it can observe the cleared flag.
        self.pump();

        if self.policy.is_multi_threaded() {
            self.worker.join();
        }

        self.consumer.record(None);
        info!(target: "render_thread", "Render thread terminated after {} frames", self.frame);
    }

    //--- Synchronization --------------------------------------------------

    /// Blocks until the render state equals `target`.
    pub fn wait(&self, target: RenderState) {
        if !self.policy.is_multi_threaded() {
            return;
        }
        self.sync.wait(target);
    }

    /// Assigns `next` and wakes all waiters.
    pub fn set(&self, next: RenderState) {
        if !self.policy.is_multi_threaded() {
            return;
        }
        self.sync.set(next);
    }

    /// Waits for `target` and assigns `next` under the same lock.
    pub fn wait_and_set(&self, target: RenderState, next: RenderState) {
        if !self.policy.is_multi_threaded() {
            return;
        }
        self.sync.wait_and_set(target, next);
    }

    //--- Frame Protocol ---------------------------------------------------

    /// Advances the frame counter and swaps the command buffers.
    pub fn next_frame(&mut self) {
        self.frame += 1;
        self.queue.swap_queues();
    }

    /// Hands the consumable buffer to the consumer.
    ///
    /// Single-threaded: executes the buffer on the calling thread.
    pub fn kick(&self) {
        match self.policy {
            ThreadingPolicy::MultiThreaded => self.set(RenderState::Kicked),
            ThreadingPolicy::SingleThreaded => self.queue.execute_consumable(),
        }
    }

    /// Blocks until the consumer is idle again.
    pub fn block_until_render_complete(&self) {
        if !self.policy.is_multi_threaded() {
            return;
        }
        self.wait(RenderState::Idle);
    }

    /// Per-frame handoff: `next_frame`, `kick`, then block until done.
    ///
    /// On return every command recorded before the call has executed.
    pub fn pump(&mut self) {
        trace!(target: "render_thread", "Pump frame {}", self.frame + 1);
        self.next_frame();
        self.kick();
        self.block_until_render_complete();
    }

    //--- Queries ----------------------------------------------------------

    /// Returns `true` iff the caller is the consumer context.
    pub fn is_current_thread_consumer(&self) -> bool {
        self.consumer.is_current()
    }

    /// Cloneable consumer-identity probe for other subsystems.
    pub fn consumer_probe(&self) -> ConsumerProbe {
        self.consumer.clone()
    }

    pub fn policy(&self) -> ThreadingPolicy {
        self.policy
    }

    /// Number of completed `next_frame` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.sync.running.load(Ordering::Acquire)
    }

    /// Snapshot of the handshake state, for diagnostics only.
    pub fn state(&self) -> RenderState {
        self.sync.current()
    }

    #[cfg(test)]
    fn state_history(&self) -> Vec<RenderState> {
        self.sync.history.lock().clone()
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderThread")
            .field("policy", &self.policy)
            .field("frame", &self.frame)
            .field("running", &self.is_running())
            .field("worker", &self.worker)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::DoubleBufferedQueue;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn coordinator(policy: ThreadingPolicy) -> (Arc<DoubleBufferedQueue>, RenderThread) {
        let queue = Arc::new(DoubleBufferedQueue::new());
        let render_thread = RenderThread::new(policy, queue.clone());
        (queue, render_thread)
    }

    fn counting_command(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    //=====================================================================
    // Lifecycle
    //=====================================================================

    #[test]
    fn new_coordinator_is_idle_and_stopped() {
        let (_queue, render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        assert_eq!(render_thread.state(), RenderState::Idle);
        assert_eq!(render_thread.frame(), 0);
        assert!(!render_thread.is_running());
        assert!(render_thread.consumer_probe().consumer_id().is_none());
    }

    #[test]
    fn run_twice_is_ignored() {
        let (_queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        render_thread.run().unwrap();
        let first = render_thread.consumer_probe().consumer_id();

        render_thread.run().unwrap();
        assert_eq!(render_thread.consumer_probe().consumer_id(), first);

        render_thread.terminate();
    }

    #[test]
    fn terminate_without_run_is_noop() {
        let (_queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        render_thread.terminate();
        assert_eq!(render_thread.frame(), 0, "No pump should happen when never started");
    }

    #[test]
    fn terminate_flushes_pending_commands() {
        for policy in [ThreadingPolicy::SingleThreaded, ThreadingPolicy::MultiThreaded] {
            let (queue, mut render_thread) = coordinator(policy);
            let counter = Arc::new(AtomicUsize::new(0));
            render_thread.run().unwrap();

            queue.submit_fn(counting_command(&counter));
            render_thread.terminate();

            assert_eq!(counter.load(Ordering::SeqCst), 1, "{:?}: terminate must flush", policy);
        }
    }

    #[test]
    fn drop_terminates_render_thread() {
        let (queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        let counter = Arc::new(AtomicUsize::new(0));
        render_thread.run().unwrap();

        queue.submit_fn(counting_command(&counter));
        drop(render_thread);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    //=====================================================================
    // Policy No-ops
    //=====================================================================

    #[test]
    fn single_threaded_wait_and_set_never_block() {
        let (_queue, render_thread) = coordinator(ThreadingPolicy::SingleThreaded);

        // Nobody will ever set Running; multi-threaded this would hang.
        render_thread.wait(RenderState::Running);
        render_thread.wait_and_set(RenderState::Kicked, RenderState::Running);
        render_thread.set(RenderState::Kicked);

        assert_eq!(render_thread.state(), RenderState::Idle, "Single-threaded set is a no-op");
    }

    #[test]
    fn single_threaded_kick_executes_inline() {
        let (queue, render_thread) = coordinator(ThreadingPolicy::SingleThreaded);
        let counter = Arc::new(AtomicUsize::new(0));

        queue.submit_fn(counting_command(&counter));
        queue.swap_queues();
        render_thread.kick();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    //=====================================================================
    // Frame Protocol
    //=====================================================================

    #[test]
    fn next_frame_counts_and_swaps() {
        let (queue, mut render_thread) = coordinator(ThreadingPolicy::SingleThreaded);
        render_thread.next_frame();
        assert_eq!(render_thread.frame(), 1);
        assert_eq!(queue.submission_index(), 1);

        render_thread.next_frame();
        assert_eq!(render_thread.frame(), 2);
        assert_eq!(queue.submission_index(), 0);
    }

    #[test]
    fn pump_advances_frame_once_per_call() {
        let (_queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        render_thread.run().unwrap();

        for _ in 0..10 {
            render_thread.pump();
        }
        assert_eq!(render_thread.frame(), 10);

        render_thread.terminate();
        assert_eq!(render_thread.frame(), 11, "Terminate pumps one final frame");
    }

    #[test]
    fn state_sequence_follows_cycle() {
        let (queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        render_thread.run().unwrap();

        for _ in 0..5 {
            queue.submit_fn(|| thread::sleep(Duration::from_millis(1)));
            render_thread.pump();
        }
        render_thread.terminate();

        let history = render_thread.state_history();
        assert_eq!(history.first(), Some(&RenderState::Idle));
        for pair in history.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "Illegal transition {:?} -> {:?} in {:?}",
                pair[0],
                pair[1],
                history
            );
        }
        // Initial Idle + 6 pumps (5 + terminate) × 3 transitions.
        assert_eq!(history.len(), 1 + 6 * 3);
        assert_eq!(history.last(), Some(&RenderState::Idle));
    }

    #[test]
    fn wait_and_set_blocks_until_target() {
        let (_queue, render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        let sync = Arc::clone(&render_thread.sync);

        let waiter = thread::spawn(move || {
            sync.wait_and_set(RenderState::Kicked, RenderState::Running);
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(render_thread.state(), RenderState::Idle, "Waiter must not fire early");

        render_thread.set(RenderState::Kicked);
        waiter.join().unwrap();
        assert_eq!(render_thread.state(), RenderState::Running);
    }

    //=====================================================================
    // Consumer Identity
    //=====================================================================

    #[test]
    fn multi_threaded_consumer_is_render_thread() {
        let (queue, mut render_thread) = coordinator(ThreadingPolicy::MultiThreaded);
        render_thread.run().unwrap();
        assert!(!render_thread.is_current_thread_consumer());

        let probe = render_thread.consumer_probe();
        let observed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&observed);
        queue.submit_fn(move || flag.store(probe.is_current(), Ordering::SeqCst));

        render_thread.pump();
        assert!(observed.load(Ordering::SeqCst), "Commands must run on the consumer");

        render_thread.terminate();
        assert!(render_thread.consumer_probe().consumer_id().is_none());
    }

    #[test]
    fn single_threaded_consumer_is_caller() {
        let (_queue, mut render_thread) = coordinator(ThreadingPolicy::SingleThreaded);
        render_thread.run().unwrap();
        assert!(render_thread.is_current_thread_consumer());

        let probe = render_thread.consumer_probe();
        let other = thread::spawn(move || probe.is_current()).join().unwrap();
        assert!(!other);

        render_thread.terminate();
        assert!(!render_thread.is_current_thread_consumer());
    }
}
