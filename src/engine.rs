//=========================================================================
// Zenith Application
//
// Main entry point and frame-loop coordinator.
//
// Architecture:
// ```text
//     AppConfig ──Application::new()──>  Application  ──run()──>  [Frame Loop]
//                    │                      │
//                    ├─ WindowBackend       ├─ RenderThread::run()
//                    └─ PresentBackend      ├─ frame() until close
//                                           └─ RenderThread::terminate()
//
//   frame():
//     (a) FrameTimer::tick()          clamped timestep
//     (b) poll + handle WindowEvents  close / resize / minimize / input
//     (c) begin_frame → layers → end_frame      (skipped while minimized)
//     (d) RenderThread::pump()        every frame, minimized or not
//     (e) present                     (skipped while minimized)
//     (f) InputState::clear_released()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, error, info};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::config::{AppConfig, ConfigError};
use crate::core::fatal::FatalSignal;
use crate::core::input::InputState;
use crate::core::layer::{FrameContext, Layer, LayerStack};
use crate::core::platform_bridge::{PlatformError, PresentBackend, WindowBackend, WindowEvent};
use crate::core::render::{CommandQueue, ConsumerProbe, DoubleBufferedQueue, RenderThread};
use crate::core::thread::ThreadError;
use crate::core::time::FrameTimer;

//=== AppError ============================================================

/// Application setup and startup failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("render thread failed to start: {0}")]
    Thread(#[from] ThreadError),
}

//=== Application =========================================================

/// Owns the frame loop, the render-thread coordinator and the layer stack.
///
/// # Examples
///
/// ```
/// use zenith_runtime::core::config::AppConfigBuilder;
/// use zenith_runtime::core::render::ThreadingPolicy;
/// use zenith_runtime::platform::{HeadlessBackend, HeadlessWindow};
/// use zenith_runtime::Application;
///
/// let config = AppConfigBuilder::new()
///     .with_threading_policy(ThreadingPolicy::SingleThreaded)
///     .build();
/// let window = HeadlessWindow::new(320, 240).with_frame_limit(3);
///
/// let mut app = Application::new(config, window, HeadlessBackend::new())?;
/// app.run()?;
///
/// assert_eq!(app.backend().frames_presented(), 3);
/// # Ok::<(), zenith_runtime::AppError>(())
/// ```
pub struct Application<W: WindowBackend, P: PresentBackend> {
    config: AppConfig,
    window: W,
    backend: P,
    queue: Arc<DoubleBufferedQueue>,
    render_thread: RenderThread,
    probe: ConsumerProbe,
    layers: LayerStack,
    input: InputState,
    timer: FrameTimer,
    fatal: Arc<FatalSignal>,
    events: Vec<WindowEvent>,
    running: bool,
    minimized: bool,
}

impl<W: WindowBackend, P: PresentBackend> Application<W, P> {
    //--- Construction -----------------------------------------------------

    /// Validates `config` and wires the subsystems together.
    ///
    /// No thread is started until [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `config` fails validation.
    pub fn new(config: AppConfig, window: W, mut backend: P) -> Result<Self, AppError> {
        config.validate()?;
        backend.set_vsync(config.vsync);

        let queue = Arc::new(DoubleBufferedQueue::with_capacity(config.command_capacity));
        let render_thread = RenderThread::new(
            config.threading_policy,
            Arc::clone(&queue) as Arc<dyn CommandQueue>,
        );
        let probe = render_thread.consumer_probe();

        let fatal = Arc::new(FatalSignal::new(config.fatal_timeout()));
        let pending = Arc::clone(&queue);
        fatal.add_callback(move || pending.clear());

        info!(
            target: "engine",
            "Application '{}' created ({:?}, vsync {}, max step {:.1} ms)",
            config.name,
            config.threading_policy,
            config.vsync,
            config.max_timestep().millis()
        );

        Ok(Self {
            timer: FrameTimer::new(config.max_timestep()),
            config,
            window,
            backend,
            queue,
            render_thread,
            probe,
            layers: LayerStack::new(),
            input: InputState::new(),
            fatal,
            events: Vec::with_capacity(32),
            running: false,
            minimized: false,
        })
    }

    //--- Layers -----------------------------------------------------------

    pub fn push_layer(&mut self, layer: impl Layer + 'static) {
        self.layers.push_layer(Box::new(layer));
    }

    pub fn push_overlay(&mut self, overlay: impl Layer + 'static) {
        self.layers.push_overlay(Box::new(overlay));
    }

    //--- Execution --------------------------------------------------------

    /// Runs frames until a close request, then shuts the render thread down.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Thread`] if the render thread could not be
    /// started; fatal callbacks have run by then.
    pub fn run(&mut self) -> Result<(), AppError> {
        if let Err(e) = self.render_thread.run() {
            error!(target: "engine", "Render thread startup failed: {}", e);
            self.fatal.run_callbacks(&e.to_string());
            return Err(e.into());
        }

        info!(target: "engine", "Entering frame loop");
        self.running = true;
        while self.running {
            self.frame();
        }

        self.shutdown();
        Ok(())
    }

    /// Stops the loop after the current frame.
    pub fn close(&mut self) {
        self.running = false;
    }

    fn frame(&mut self) {
        //--- (a) Timing ---------------------------------------------------
        let time = self.timer.tick();

        //--- (b) Events ---------------------------------------------------
        self.input.begin_frame();
        self.process_events();

        //--- (c) Update and record ----------------------------------------
        if !self.minimized {
            self.backend.begin_frame();

            let mut context = FrameContext::new(
                &self.queue,
                &self.input,
                &self.probe,
                time,
                self.render_thread.frame(),
            );
            self.layers.update(&mut context);
            if context.close_requested() {
                info!(target: "engine", "Close requested by a layer");
                self.running = false;
            }

            self.backend.end_frame();
        }

        //--- (d) Hand off to the render thread ----------------------------
        self.render_thread.pump();

        //--- (e) Present --------------------------------------------------
        if !self.minimized {
            self.backend.present();
        }

        //--- (f) Transient input ------------------------------------------
        self.input.clear_released();
    }

    fn process_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        events.clear();
        self.window.poll_events(&mut events);

        for event in &events {
            self.handle_event(event);
        }

        self.events = events;
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::CloseRequested => {
                info!(target: "engine", "Window close requested");
                self.running = false;
            }
            WindowEvent::Resized { width, height } => {
                if width == 0 || height == 0 {
                    debug!(target: "engine", "Zero-size resize, treating as minimized");
                    self.minimized = true;
                } else {
                    self.minimized = false;
                    self.backend.resize(width, height);
                }
            }
            WindowEvent::Minimized(minimized) => {
                debug!(target: "engine", "Minimized: {}", minimized);
                self.minimized = minimized;
            }
            WindowEvent::Focused(_) => {}
            WindowEvent::Input(input) => self.input.process_event(&input),
        }

        self.layers.dispatch_event(event);
    }

    fn shutdown(&mut self) {
        info!(target: "engine", "Frame loop exited after {} frames", self.render_thread.frame());
        self.render_thread.terminate();
        self.layers.clear();
        info!(target: "engine", "Application shutdown complete");
    }

    //--- Accessors --------------------------------------------------------

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared command queue, for subsystems that record outside layers.
    pub fn queue(&self) -> &Arc<DoubleBufferedQueue> {
        &self.queue
    }

    pub fn render_thread(&self) -> &RenderThread {
        &self.render_thread
    }

    /// Fatal-signal service; register cleanup or install the panic hook here.
    pub fn fatal(&self) -> &Arc<FatalSignal> {
        &self.fatal
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfigBuilder;
    use crate::core::input::{InputEvent, KeyCode, Modifiers};
    use crate::core::render::ThreadingPolicy;
    use crate::platform::{HeadlessBackend, HeadlessWindow};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(policy: ThreadingPolicy) -> AppConfig {
        AppConfigBuilder::new().with_threading_policy(policy).build()
    }

    fn app(policy: ThreadingPolicy, frames: u64) -> Application<HeadlessWindow, HeadlessBackend> {
        let window = HeadlessWindow::new(640, 480).with_frame_limit(frames);
        Application::new(config(policy), window, HeadlessBackend::new()).unwrap()
    }

    /// Submits one counting command per update.
    struct Recorder {
        executed: Arc<AtomicUsize>,
    }

    impl Layer for Recorder {
        fn on_update(&mut self, context: &mut FrameContext<'_>) {
            let executed = Arc::clone(&self.executed);
            context.submit(move || {
                executed.fetch_add(1, Ordering::SeqCst);
            });
        }
    }

    //=====================================================================
    // Construction
    //=====================================================================

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.window_width = 0;

        let result = Application::new(config, HeadlessWindow::new(1, 1), HeadlessBackend::new());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn oversized_command_capacity_is_rejected() {
        let mut config = AppConfig::default();
        config.command_capacity = usize::MAX;

        let result = Application::new(config, HeadlessWindow::new(1, 1), HeadlessBackend::new());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn vsync_mode_reaches_the_backend() {
        for vsync in [true, false] {
            let config = AppConfigBuilder::new().with_vsync(vsync).build();
            let window = HeadlessWindow::new(1, 1).with_frame_limit(1);
            let app = Application::new(config, window, HeadlessBackend::new()).unwrap();
            assert_eq!(app.backend().vsync(), Some(vsync));
        }
    }

    #[test]
    fn fatal_signal_discards_pending_commands() {
        let app = app(ThreadingPolicy::SingleThreaded, 1);
        app.queue().submit_fn(|| {});
        assert_eq!(app.queue().len_writable(), 1);

        assert!(app.fatal().run_callbacks("test"));
        assert_eq!(app.queue().len_writable(), 0);
    }

    //=====================================================================
    // Frame Loop
    //=====================================================================

    #[test]
    fn each_frame_brackets_and_presents() {
        let mut app = app(ThreadingPolicy::SingleThreaded, 4);
        app.run().unwrap();

        assert_eq!(app.backend().frames_begun(), 4);
        assert_eq!(app.backend().frames_ended(), 4);
        assert_eq!(app.backend().frames_presented(), 4);
        // Four frame pumps plus the terminate pump.
        assert_eq!(app.render_thread().frame(), 5);
        assert!(!app.render_thread().is_running());
    }

    #[test]
    fn recorded_commands_run_under_both_policies() {
        for policy in [ThreadingPolicy::SingleThreaded, ThreadingPolicy::MultiThreaded] {
            let executed = Arc::new(AtomicUsize::new(0));
            let mut app = app(policy, 5);
            app.push_layer(Recorder { executed: Arc::clone(&executed) });

            app.run().unwrap();
            assert_eq!(executed.load(Ordering::SeqCst), 5, "{:?}", policy);
        }
    }

    #[test]
    fn commands_execute_on_the_consumer() {
        struct Checker {
            on_consumer: Arc<Mutex<Vec<bool>>>,
        }

        impl Layer for Checker {
            fn on_update(&mut self, context: &mut FrameContext<'_>) {
                let probe = context.consumer_probe().clone();
                let on_consumer = Arc::clone(&self.on_consumer);
                context.submit(move || on_consumer.lock().push(probe.is_current()));
            }
        }

        let on_consumer = Arc::new(Mutex::new(Vec::new()));
        let mut app = app(ThreadingPolicy::MultiThreaded, 3);
        app.push_layer(Checker { on_consumer: Arc::clone(&on_consumer) });
        app.run().unwrap();

        assert_eq!(*on_consumer.lock(), vec![true, true, true]);
    }

    #[test]
    fn layer_can_request_close() {
        struct Quitter;

        impl Layer for Quitter {
            fn on_update(&mut self, context: &mut FrameContext<'_>) {
                if context.frame() == 1 {
                    context.request_close();
                }
            }
        }

        let mut app = app(ThreadingPolicy::SingleThreaded, 100);
        app.push_layer(Quitter);
        app.run().unwrap();

        assert_eq!(app.backend().frames_presented(), 2);
    }

    //=====================================================================
    // Window Events
    //=====================================================================

    #[test]
    fn minimized_frames_skip_update_but_still_pump() {
        let executed = Arc::new(AtomicUsize::new(0));
        let mut app = app(ThreadingPolicy::MultiThreaded, 3);
        app.push_layer(Recorder { executed: Arc::clone(&executed) });
        app.window().injector().send(WindowEvent::Minimized(true));

        app.run().unwrap();

        assert!(app.is_minimized());
        assert_eq!(app.backend().frames_begun(), 0);
        assert_eq!(app.backend().frames_presented(), 0);
        assert_eq!(executed.load(Ordering::SeqCst), 0);
        assert_eq!(app.render_thread().frame(), 4);
    }

    #[test]
    fn zero_resize_minimizes_and_real_resize_restores() {
        let mut app = app(ThreadingPolicy::SingleThreaded, 1);
        let injector = app.window().injector();
        injector.send(WindowEvent::Resized { width: 0, height: 0 });
        injector.send(WindowEvent::Resized { width: 800, height: 600 });

        app.run().unwrap();

        assert!(!app.is_minimized());
        assert_eq!(app.backend().resizes(), &[(800, 600)]);
        assert_eq!(app.backend().frames_presented(), 1);
    }

    #[test]
    fn input_events_reach_input_state_and_layers() {
        struct Watcher {
            saw_key: Arc<Mutex<bool>>,
            seen: Arc<AtomicUsize>,
        }

        impl Layer for Watcher {
            fn on_update(&mut self, context: &mut FrameContext<'_>) {
                if context.input().is_key_pressed(KeyCode::Space) {
                    *self.saw_key.lock() = true;
                }
            }

            fn on_event(&mut self, _event: &WindowEvent) -> bool {
                self.seen.fetch_add(1, Ordering::SeqCst);
                false
            }
        }

        let saw_key = Arc::new(Mutex::new(false));
        let seen = Arc::new(AtomicUsize::new(0));
        let mut app = app(ThreadingPolicy::SingleThreaded, 1);
        app.push_layer(Watcher {
            saw_key: Arc::clone(&saw_key),
            seen: Arc::clone(&seen),
        });
        app.window().injector().send(WindowEvent::Input(InputEvent::KeyDown {
            key: KeyCode::Space,
            modifiers: Modifiers::NONE,
        }));

        app.run().unwrap();

        assert!(*saw_key.lock());
        // KeyDown plus the frame-limit close request.
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
