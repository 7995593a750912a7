//=========================================================================
// Logging
//=========================================================================
//
// Installs the global subscriber for the `log` records emitted by every
// module (targets: "render_thread", "platform", "engine", ...).
//
// Filtering follows RUST_LOG; without it the default below applies.
//
//=========================================================================

//=== External Dependencies ===============================================

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,zenith_runtime=debug";

/// Installs a formatted subscriber and bridges `log` into it.
///
/// Thread names are printed so producer and "Render Thread" lines can be
/// told apart. Returns `false` if a global logger was already installed,
/// in which case the existing one is kept.
///
/// # Example
/// ```
/// zenith_runtime::logging::init_logging();
/// log::info!(target: "engine", "Logging ready");
/// ```
pub fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .try_init()
        .is_ok()
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_logging();
        assert!(!init_logging(), "Global subscriber can only be installed once");
    }
}
