//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a stderr subscriber at `level` unless `RUST_LOG` is set.
///
/// Later calls are ignored, so tests may call it freely.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
