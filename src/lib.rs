//=========================================================================
// Zenith Runtime Library Root
//
// Frame-loop runtime with a dedicated render thread.
//
// Responsibilities:
// - Expose the application facade (`Application`)
// - Expose the render-thread coordinator and command queue (`core::render`)
// - Provide window/presentation backends (`platform`)
//
// Typical usage:
// ```no_run
// use zenith_runtime::core::config::AppConfig;
// use zenith_runtime::platform::{HeadlessBackend, HeadlessWindow};
// use zenith_runtime::Application;
//
// fn main() -> Result<(), zenith_runtime::AppError> {
//     zenith_runtime::logging::init_logging();
//     let window = HeadlessWindow::new(1280, 720).with_frame_limit(60);
//     Application::new(AppConfig::default(), window, HeadlessBackend::new())?.run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the engine systems: render-thread synchronization,
// command queue, timing, input, layers, configuration.
//
pub mod core;

// `platform` contains the concrete window/presentation backends
// (Winit on desktop, headless everywhere).
//
pub mod platform;

// `logging` installs the global subscriber.
//
pub mod logging;

pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the application entry point and frame loop.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{AppError, Application};
