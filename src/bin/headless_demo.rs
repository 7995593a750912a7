//=========================================================================
// Headless Demo
//=========================================================================
//
// Runs the frame loop without a display and reports what the render
// thread executed.
//
// Usage:
//   headless_demo [CONFIG.toml] [--frames N] [--window]
//
// `--window` swaps the headless window for a Winit window (desktop only);
// presentation stays headless either way.
//
//=========================================================================

use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{error, info};

use zenith_runtime::core::config::AppConfig;
use zenith_runtime::platform::{HeadlessBackend, HeadlessWindow};
use zenith_runtime::prelude::*;

const DEFAULT_FRAMES: u64 = 120;

//=== Demo Layer ==========================================================

/// Records one command per frame that checks it runs on the render thread.
struct SpinLayer {
    executed: Arc<AtomicU64>,
    misplaced: Arc<AtomicU64>,
}

impl Layer for SpinLayer {
    fn name(&self) -> &str {
        "Spin"
    }

    fn on_attach(&mut self) {
        info!(target: "demo", "Spin layer attached");
    }

    fn on_update(&mut self, context: &mut FrameContext<'_>) {
        let probe = context.consumer_probe().clone();
        let executed = Arc::clone(&self.executed);
        let misplaced = Arc::clone(&self.misplaced);

        context.submit(move || {
            if !probe.is_current() {
                misplaced.fetch_add(1, Ordering::Relaxed);
            }
            executed.fetch_add(1, Ordering::Relaxed);
        });

        if context.input().is_key_pressed(KeyCode::Escape) {
            context.request_close();
        }
    }
}

//=== Arguments ===========================================================

struct Args {
    config: Option<String>,
    frames: u64,
    windowed: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        frames: DEFAULT_FRAMES,
        windowed: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--window" => args.windowed = true,
            "--frames" => {
                let value = iter.next().ok_or("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .map_err(|_| format!("invalid frame count '{}'", value))?;
                if args.frames == 0 {
                    return Err("frame count must be positive".into());
                }
            }
            path => args.config = Some(path.to_owned()),
        }
    }
    Ok(args)
}

//=== Entry Point =========================================================

fn run<W: WindowBackend>(config: AppConfig, window: W) -> Result<(), AppError> {
    let executed = Arc::new(AtomicU64::new(0));
    let misplaced = Arc::new(AtomicU64::new(0));

    let mut app = Application::new(config, window, HeadlessBackend::new())?;
    app.fatal().install_panic_hook();
    app.push_layer(SpinLayer {
        executed: Arc::clone(&executed),
        misplaced: Arc::clone(&misplaced),
    });

    app.run()?;

    info!(
        target: "demo",
        "{} frames presented, {} commands executed ({} off the render thread)",
        app.backend().frames_presented(),
        executed.load(Ordering::Relaxed),
        misplaced.load(Ordering::Relaxed)
    );
    Ok(())
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn run_windowed(config: AppConfig) -> Result<(), AppError> {
    let window = zenith_runtime::platform::WinitWindow::new(&config)?;
    run(config, window)
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn run_windowed(config: AppConfig) -> Result<(), AppError> {
    error!(target: "demo", "Windowed mode is not available on this platform");
    Err(zenith_runtime::core::platform_bridge::PlatformError::EventLoopCreation(
        "unsupported platform".into(),
    )
    .into())
}

fn main() -> ExitCode {
    zenith_runtime::logging::init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            error!(target: "demo", "{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(target: "demo", "Could not load '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    info!(target: "demo", "Starting '{}' ({:?})", config.name, config.threading_policy);

    let result = if args.windowed {
        run_windowed(config)
    } else {
        let window = HeadlessWindow::new(config.window_width, config.window_height)
            .with_frame_limit(args.frames);
        run(config, window)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "demo", "{}", e);
            ExitCode::FAILURE
        }
    }
}
