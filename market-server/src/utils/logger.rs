//! Logging Infrastructure
//!
//! tracing-subscriber setup for development and production.

use tracing_subscriber::EnvFilter;

/// Initialize the logger, reading the filter from `RUST_LOG`
pub fn init_logger() {
    init_logger_with_file(None);
}

/// Initialize the logger with an optional daily-rolling file appender
pub fn init_logger_with_file(log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && std::path::Path::new(dir).exists()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "market-server");
        subscriber.with_writer(file_appender).init();
        return;
    }

    subscriber.init();
}
