//=========================================================================
// Application Configuration
//=========================================================================
//
// Startup settings, loaded once from TOML or built in code.
//
// Example `zenith.toml`:
// ```toml
// name = "Sandbox"
// window_width = 1280
// window_height = 720
// threading_policy = "single_threaded"
// max_timestep_secs = 0.05
// ```
//
// Missing keys take their defaults.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::render::ThreadingPolicy;
use crate::core::time::Timestep;

/// Upper bound on commands preallocated per buffer.
pub const MAX_COMMAND_CAPACITY: usize = 1 << 20;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

//=== AppConfig ===========================================================

/// Application startup settings.
///
/// # Default Values
///
/// - **Window**: "Zenith", 1920x1080, vsync on, resizable
/// - **Threading**: multi-threaded
/// - **Max timestep**: 0.0333 s
/// - **Fatal timeout**: 3000 ms
/// - **Command capacity**: 256 per buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    pub resizable: bool,
    pub threading_policy: ThreadingPolicy,
    pub max_timestep_secs: f32,
    pub fatal_timeout_ms: u64,
    pub command_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Zenith".to_owned(),
            window_width: 1920,
            window_height: 1080,
            vsync: true,
            resizable: true,
            threading_policy: ThreadingPolicy::MultiThreaded,
            max_timestep_secs: 0.0333,
            fatal_timeout_ms: 3000,
            command_capacity: 256,
        }
    }
}

impl AppConfig {
    //--- Loading ----------------------------------------------------------

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if !(self.max_timestep_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_timestep_secs must be positive, got {}",
                self.max_timestep_secs
            )));
        }
        if self.command_capacity > MAX_COMMAND_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "command_capacity must be at most {}, got {}",
                MAX_COMMAND_CAPACITY, self.command_capacity
            )));
        }
        Ok(())
    }

    //--- Derived Values ---------------------------------------------------

    pub fn max_timestep(&self) -> Timestep {
        Timestep::from_seconds(self.max_timestep_secs)
    }

    pub fn fatal_timeout(&self) -> Duration {
        Duration::from_millis(self.fatal_timeout_ms)
    }
}

//=== AppConfigBuilder ====================================================

/// Fluent builder for [`AppConfig`].
///
/// ```
/// use zenith_runtime::core::config::AppConfigBuilder;
/// use zenith_runtime::core::render::ThreadingPolicy;
///
/// let config = AppConfigBuilder::new()
///     .with_name("Sandbox")
///     .with_threading_policy(ThreadingPolicy::SingleThreaded)
///     .with_max_timestep(0.05)
///     .build();
///
/// assert_eq!(config.name, "Sandbox");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be non-zero, got {}x{}", width, height);
        self.config.window_width = width;
        self.config.window_height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.config.resizable = resizable;
        self
    }

    pub fn with_threading_policy(mut self, policy: ThreadingPolicy) -> Self {
        self.config.threading_policy = policy;
        self
    }

    /// # Panics
    ///
    /// Panics if `seconds <= 0.0`.
    pub fn with_max_timestep(mut self, seconds: f32) -> Self {
        assert!(seconds > 0.0, "Max timestep must be positive, got {}", seconds);
        self.config.max_timestep_secs = seconds;
        self
    }

    pub fn with_fatal_timeout(mut self, timeout: Duration) -> Self {
        self.config.fatal_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_COMMAND_CAPACITY`].
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        assert!(
            capacity <= MAX_COMMAND_CAPACITY,
            "Command capacity must be at most {}, got {}",
            MAX_COMMAND_CAPACITY,
            capacity
        );
        self.config.command_capacity = capacity;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
