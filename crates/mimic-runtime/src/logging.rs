//! Logging setup for hosts embedding the runtime

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use mimic_core::{MimicError, MimicResult};

/// Subscriber settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info,mimic_state=debug"`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Install a global `tracing` subscriber. `RUST_LOG` wins over `config.level`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> MimicResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| MimicError::InvalidConfig(format!("log filter: {e}")))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| MimicError::InvalidConfig(format!("logging: {e}")))
}
