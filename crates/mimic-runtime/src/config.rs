//! Runtime configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mimic_core::{MimicError, MimicResult};
use mimic_state::{RateLimiter, DEFAULT_UPDATES_PER_SECOND};

use crate::LoggingConfig;

/// Per-entity replication settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Sampling passes per second
    pub updates_per_second: f32,
    /// Ask the transport for reliable delivery of parameter snapshots
    pub parameters_reliable: bool,
    /// Ask the transport for reliable delivery of state changes
    pub state_reliable: bool,
    /// Re-send the current state this often even without a change.
    /// Off by default: a lost state change then persists until the next one.
    pub state_refresh_secs: Option<f32>,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        ReplicationConfig {
            updates_per_second: DEFAULT_UPDATES_PER_SECOND,
            parameters_reliable: false,
            state_reliable: false,
            state_refresh_secs: None,
        }
    }
}

impl ReplicationConfig {
    pub fn validate(&self) -> MimicResult<()> {
        RateLimiter::interval_for(self.updates_per_second)
            .and_then(|_| self.state_refresh_interval())
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(error = %e, "invalid replication config");
                e
            })
    }

    /// Refresh interval, if enabled
    pub fn state_refresh_interval(&self) -> MimicResult<Option<Duration>> {
        let Some(secs) = self.state_refresh_secs else {
            return Ok(None);
        };
        if !secs.is_finite() || secs <= 0.0 {
            return Err(MimicError::InvalidConfig(format!(
                "state_refresh_secs must be positive, got {secs}"
            )));
        }
        Duration::try_from_secs_f32(secs)
            .map(Some)
            .map_err(|e| MimicError::InvalidConfig(format!("state refresh interval: {e}")))
    }
}

/// Peer configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Defaults for every spawned entity
    pub replication: ReplicationConfig,
    pub logging: LoggingConfig,
}

impl PeerConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> MimicResult<Self> {
        let config: PeerConfig =
            serde_json::from_str(json).map_err(|e| MimicError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MimicResult<()> {
        self.replication.validate()
    }
}
