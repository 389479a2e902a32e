use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info,nba_terminal=debug";
const LOG_FILE: &str = "nba_terminal.log";

/// File-only logging for the TUI; writing to stdout would tear the screen.
/// Returns false when the directory isn't writable and logging is off.
pub fn init_file_logging(log_dir: Option<&Path>) -> bool {
    let Some(dir) = log_dir else {
        return false;
    };
    // rolling::daily panics if it can't create the file, so check first.
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write_test");
    if fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
        .is_err()
    {
        return false;
    }
    let _ = fs::remove_file(&probe);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    // The guard flushes on drop; the process owns it until exit.
    Box::leak(Box::new(guard));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}

/// Warnings and above to stderr, for the non-interactive binaries.
pub fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
