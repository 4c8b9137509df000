//! Logging Infrastructure
//!
//! `tracing-subscriber` fmt output, optionally to a daily-rolling file.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level`. Returns `false` when a global
/// subscriber was already installed.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&Path>) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // 有日志目录时写文件
    if let Some(dir) = log_dir
        && dir.exists()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "arbora-map");
        return subscriber
            .with_ansi(false)
            .with_writer(file_appender)
            .try_init()
            .is_ok();
    }

    subscriber.try_init().is_ok()
}
