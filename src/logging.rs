use std::env;
use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: terse console output plus a daily rolling
/// file that also captures prompts and raw model responses.
pub fn configure_logging() {
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    if let Err(e) = install_subscriber(&log_dir) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

fn install_subscriber(log_dir: &str) -> Result<(), TryInitError> {
    // Console log lines go to stderr; stdout belongs to the session.
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new("info,web_request=warn,llm_request=info"));

    let file_appender = rolling::daily(log_dir, "newslens.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new(
            "info,web_request=debug,llm_request=debug,hyper=info,reqwest=info",
        ));

    // Fails instead of panicking when a global subscriber is already set.
    tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_str().unwrap();
        let _ = install_subscriber(log_dir);
        assert!(install_subscriber(log_dir).is_err());
    }
}
