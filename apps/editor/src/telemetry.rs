use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs structured logging for the host process.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `config.rust_log`.
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            &config.rust_log
        ))
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Newsflow editor v{} logging initialised", env!("CARGO_PKG_VERSION"));
    }
    installed
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = Config {
            anthropic_api_key: "test".to_string(),
            data_dir: "data".into(),
            scan_debounce: Duration::from_millis(500),
            llm_timeout: Duration::from_secs(30),
            sensitive_keywords: vec![],
            rust_log: "debug".to_string(),
        };
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
