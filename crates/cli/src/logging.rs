use std::error::Error;
use std::io;

use parley_core::config::{AppConfig, LogFormat};
use tracing::Level;

pub type InitError = Box<dyn Error + Send + Sync + 'static>;

/// Installs the global subscriber. Logs go to stderr so the conversation on
/// stdout stays clean.
pub fn init(config: &AppConfig) -> Result<(), InitError> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

#[cfg(test)]
mod tests {
    use parley_core::config::AppConfig;

    use super::init;

    #[test]
    fn second_install_in_one_process_is_reported() {
        let config = AppConfig::default();
        assert!(init(&config).is_ok());
        assert!(init(&config).is_err(), "a global subscriber is already set");
    }
}
