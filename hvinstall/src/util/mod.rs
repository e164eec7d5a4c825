//! Logging setup shared by the library and the CLI.

use std::path::Path;

use hvinstall_shared::errors::{InstallerError, InstallerResult};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the rotated log inside the log directory.
pub const LOG_FILE_NAME: &str = "hvinstall.log";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`. With a
/// `log_dir` the output goes to a daily-rotated file there, otherwise to
/// stderr. The returned guard flushes pending lines on drop and must be held
/// for as long as logging is needed.
pub fn init_logging(log_dir: Option<&Path>, default_filter: &str) -> InstallerResult<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| {
            InstallerError::Internal(format!("Invalid log filter {:?}: {}", default_filter, e))
        })?;

    let guard = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                InstallerError::Internal(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            register_to_tracing(non_blocking, env_filter, false);
            guard
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
            register_to_tracing(non_blocking, env_filter, true);
            guard
        }
    };
    Ok(guard)
}

pub fn register_to_tracing(non_blocking: NonBlocking, env_filter: EnvFilter, ansi: bool) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(ansi),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_creates_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");

        let guard = init_logging(Some(&dir), "info").unwrap();
        tracing::info!("written to file");
        drop(guard);

        assert!(dir.is_dir());
    }
}
