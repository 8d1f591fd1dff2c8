use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to console and a daily-rotated file under ./logs.
/// Filter level comes from RUST_LOG, defaulting to info.
pub fn init_logging() {
    std::fs::create_dir_all("./logs").expect("Failed to create logs directory");

    let file_appender = RollingFileAppender::new(Rotation::DAILY, "./logs", "delta-analyzer.log");

    tracing_subscriber::registry()
        .with(
            // Console output
            tracing_subscriber::fmt::layer().with_target(true).with_ansi(true),
        )
        .with(
            // File output, JSON lines
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_target(true)
                .with_ansi(false)
                .json(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_logging_creates_log_dir() {
        init_logging();

        info!("info message");
        warn!("warn message");

        assert!(std::path::Path::new("./logs").exists());
    }
}
