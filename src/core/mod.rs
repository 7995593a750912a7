//=========================================================================
// Core Systems
//
// Engine subsystems shared by the frame loop and the render thread.
//
// Responsibilities:
// - Producer/consumer render synchronization (`render`, `thread`)
// - Frame timing and input state (`time`, `input`)
// - Per-frame application logic (`layer`)
// - Window/presentation contracts (`platform_bridge`)
// - Startup settings and crash cleanup (`config`, `fatal`)
//
// Notes:
// Only `render` and `thread` cross the producer/consumer boundary. Every
// other subsystem is owned by the frame loop and touched on the producer
// thread only.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod fatal;
pub mod input;
pub mod layer;
pub mod platform_bridge;
pub mod render;
pub mod thread;
pub mod time;
