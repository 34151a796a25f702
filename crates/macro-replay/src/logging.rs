//! Tracing setup: stdout plus a daily-rolling log file.

use std::path::Path;

use tracing::warn;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "macro_replay=debug,macro_replay_core=debug";

/// Initialize tracing. `RUST_LOG` overrides the default filter.
///
/// With a `log_dir`, output is also written to `macro-replay.<date>.log` in
/// that directory; the returned guard flushes it and must live until exit.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let appender = log_dir.map(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("macro-replay")
            .filename_suffix("log")
            .build(dir)
    });

    match appender {
        Some(Ok(file_appender)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            registry
                .with(fmt::layer().with_target(true))
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();

            Some(guard)
        }
        Some(Err(e)) => {
            registry.with(fmt::layer().with_target(true)).init();
            warn!(error = %e, "File logging unavailable, logging to stdout only");
            None
        }
        None => {
            registry.with(fmt::layer().with_target(true)).init();
            None
        }
    }
}
