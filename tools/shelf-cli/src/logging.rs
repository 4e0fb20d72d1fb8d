//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level; `--verbose` raises the
/// configured level to `debug`. Logs go to stderr so `--json` output on
/// stdout stays parseable.
pub fn init(config: &LogConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry.with(fmt.json()).try_init(),
        LogFormat::Pretty => registry.with(fmt.with_target(false)).try_init(),
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {}", err);
    }
}
