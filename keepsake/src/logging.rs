//! File-backed tracing setup.
//!
//! The terminal owns stderr, so nothing may log to it while the TUI is up. All
//! events go to a daily-rolling file under `$XDG_STATE_HOME/keepsake/logs`
//! through a non-blocking writer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_DIRECTIVES: [&str; 3] = ["warn", "keepsake=debug", "keepsake_core=debug"];

/// Installs the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
///
/// `RUST_LOG` directives are applied on top of the defaults.
///
/// # Errors
///
/// Returns `Err` if the log directory cannot be created.
pub fn init(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, "keepsake.log"));

    let filter = DEFAULT_DIRECTIVES
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .init();

    Ok(guard)
}
