// =============================================================================
// Crosslight Backend - Configuration
// =============================================================================

use std::env;
use std::time::Duration;

use crosslight_common::SweepConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STALE_AFTER_MS: u64 = 60_000;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 30_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3000")
    pub bind_address: String,

    /// Locations not updated for this many milliseconds are evicted
    pub stale_after_ms: u64,

    /// Milliseconds between staleness sweeps
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `BIND_ADDRESS` wins over `HOST`/`PORT`. Unparseable numbers fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(addr) => addr,
            None => {
                let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into());
                let port = lookup("PORT")
                    .and_then(|p| p.parse::<u16>().ok())
                    .unwrap_or(DEFAULT_PORT);
                format!("{}:{}", host, port)
            }
        };

        let stale_after_ms = lookup("STALE_AFTER_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STALE_AFTER_MS);
        let sweep_interval_ms = lookup("SWEEP_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_MS);

        if sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid("SWEEP_INTERVAL_MS", "must be greater than zero"));
        }

        Ok(Self {
            bind_address,
            stale_after_ms,
            sweep_interval_ms,
        })
    }

    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            interval: Duration::from_millis(self.sweep_interval_ms),
            max_age: Duration::from_millis(self.stale_after_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            stale_after_ms: DEFAULT_STALE_AFTER_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
