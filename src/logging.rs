//! Logging setup.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging with the given level.
///
/// Logs go to stderr so command output on stdout stays parseable. With a
/// log file the returned guard must be held until exit to flush it.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "wikifolio.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);

            if json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .init();
            } else {
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
            Some(guard)
        }
        None => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            if json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.pretty())
                    .init();
            }
            None
        }
    }
}
