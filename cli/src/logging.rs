//! Tracing setup for the CLI
//!
//! Logs go to stderr and, when the data directory is known, to
//! `<data_dir>/logs/blogimport.log` through a non-blocking writer.

use config::PathManager;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,blogimport={level},blogimport_core={level},remote={level},traffic={level}"
        ))
    })
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(level: &str) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let file = PathManager::log_file_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("[blogimport] Failed to create log directory {:?}: {}", parent, e);
                return None;
            }
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("[blogimport] Failed to open log file {:?}: {}", path, e);
                None
            }
        }
    });

    match file {
        Some(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            let subscriber = tracing_subscriber::registry()
                .with(filter(level))
                .with(stderr_layer)
                .with(file_layer);
            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                eprintln!("[blogimport] Failed to set tracing subscriber: {}", e);
            }
            Some(guard)
        }
        None => {
            let subscriber = tracing_subscriber::registry()
                .with(filter(level))
                .with(stderr_layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
            None
        }
    }
}
