//! Logging setup for the command line tool
//!
//! - Human-readable output on stderr, so stdout stays clean for results
//! - Optional JSON log file with size-based and daily rotation (10MB per file)

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "menousdb=debug,menousdb_rs=debug"
    } else {
        "menousdb=info,menousdb_rs=info"
    }
}

/// Colour only when a human is watching
fn ansi_enabled(stream: &impl IsTerminal) -> bool {
    stream.is_terminal()
}

/// Initialize tracing.
///
/// When `log_dir` is set, returns a guard that must be kept alive to ensure
/// the file log is flushed.
pub fn init_telemetry(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled(&std::io::stderr()))
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            // Rotates when file reaches 10MB or daily, whichever comes first
            let file_appender = RollingFileAppender::new(
                dir.join("menousdb.log"),
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024),
                9,
            )?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_current_span(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("File logging to {:?}", dir);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("menousdb_rs=debug"));
        assert!(default_filter(false).contains("menousdb_rs=info"));
    }

    #[test]
    fn test_no_ansi_when_redirected() {
        let file = tempfile::tempfile().unwrap();
        assert!(!ansi_enabled(&file));
    }
}
