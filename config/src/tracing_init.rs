//! Shared tracing setup for binaries: stderr output plus an optional log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// When set, log lines are also written (without ANSI colors) to this file.
pub const LOG_FILE_ENV: &str = "REALTOR_LOG_FILE";

/// Keeps the file writer alive; drop it on exit to flush buffered lines.
pub struct TracingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter` (e.g. `"warn"`).
pub fn init_tracing(default_filter: &str) -> Result<TracingGuard, Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match std::env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let path = Path::new(&path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| format!("{} has no file name", LOG_FILE_ENV))?;
            std::fs::create_dir_all(dir)?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(TracingGuard { _file: guard })
}
