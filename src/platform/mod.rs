//=========================================================================
// Platform Subsystem
//
// Concrete window and presentation backends for the frame loop.
//
// Architecture:
// ```text
//  Producer Thread:
//  ┌──────────────────────────────┐
//  │  Application::run()          │
//  │   ↓ poll_events()            │
//  │  WindowBackend               │
//  │   ├─ WinitWindow  (desktop)  │
//  │   └─ HeadlessWindow (tests)  │
//  │   ↓ Vec<WindowEvent>         │
//  │  Layers / InputState         │
//  │   ↓ begin / end / present    │
//  │  PresentBackend              │
//  │   └─ HeadlessBackend         │
//  └──────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Pumped, not run**: the window never owns the thread; the frame loop
//   polls it once per frame and keeps control of pacing
// - **Sticky modifiers**: modifier state persists across events until
//   explicitly changed (matches platform behavior)
// - **Main thread requirement**: Winit mandates the main thread on macOS,
//   so `WinitWindow` is created and polled there
//
//=========================================================================

//=== Submodules ==========================================================

mod headless;

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod input_processor;

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod winit_window;

//=== Public API ==========================================================

pub use headless::{EventInjector, HeadlessBackend, HeadlessWindow};

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use winit_window::WinitWindow;
