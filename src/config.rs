//! Runtime configuration.
//!
//! Every value has a default; environment variables override them:
//!
//! - `EVENT_DELETES_QUEUE_TO_SQL`: queue mutation requests are sent to
//! - `EVENT_DELETES_ACK_TIMEOUT_SECS`: how long the channel gateway waits for an
//!   acknowledgment (unset or `0` waits forever)
//! - `EVENT_DELETES_UPWARD_CASCADE`: `first` or `any`, see [`UpwardCascadePolicy`]
//! - `EVENT_DELETES_CHANNEL_CAPACITY`: buffer size of the outbound channel

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::cascade::UpwardCascadePolicy;

/// Default queue for mutation requests.
pub const DEFAULT_QUEUE_TO_SQL: &str = "data-platform-api-event-sql-updates";

/// Default outbound channel buffer.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

const QUEUE_VAR: &str = "EVENT_DELETES_QUEUE_TO_SQL";
const ACK_TIMEOUT_VAR: &str = "EVENT_DELETES_ACK_TIMEOUT_SECS";
const UPWARD_CASCADE_VAR: &str = "EVENT_DELETES_UPWARD_CASCADE";
const CHANNEL_CAPACITY_VAR: &str = "EVENT_DELETES_CHANNEL_CAPACITY";

/// A configuration value that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Queue every mutation request is published to.
    pub queue_to_sql: String,

    /// Acknowledgment timeout enforced by the channel gateway.
    ///
    /// `None` waits indefinitely, which is also what the cascade core assumes.
    pub ack_timeout: Option<Duration>,

    /// How campaign/game batches decide whether to restore the header.
    pub upward_cascade: UpwardCascadePolicy,

    /// Outbound channel buffer size.
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates a `Config` with default values.
    pub fn new() -> Self {
        Config {
            queue_to_sql: DEFAULT_QUEUE_TO_SQL.to_string(),
            ack_timeout: None,
            upward_cascade: UpwardCascadePolicy::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Reads the configuration from the environment, falling back to defaults
    /// (with a warning) when a value is malformed.
    pub fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed configuration, using defaults");
                Self::new()
            }
        }
    }

    /// Reads the configuration from the environment, rejecting malformed values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(queue) = lookup(QUEUE_VAR).filter(|q| !q.trim().is_empty()) {
            config.queue_to_sql = queue.trim().to_string();
        }

        if let Some(raw) = lookup(ACK_TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError {
                var: ACK_TIMEOUT_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            config.ack_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(UPWARD_CASCADE_VAR) {
            config.upward_cascade =
                UpwardCascadePolicy::parse(raw.trim()).ok_or_else(|| ConfigError {
                    var: UPWARD_CASCADE_VAR,
                    value: raw.clone(),
                    reason: "expected `first` or `any`".to_string(),
                })?;
        }

        if let Some(raw) = lookup(CHANNEL_CAPACITY_VAR) {
            let capacity = raw.trim().parse::<usize>().map_err(|e| ConfigError {
                var: CHANNEL_CAPACITY_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            if capacity == 0 {
                return Err(ConfigError {
                    var: CHANNEL_CAPACITY_VAR,
                    value: raw,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.channel_capacity = capacity;
        }

        Ok(config)
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = Some(timeout);
        self
    }

    pub fn with_upward_cascade(mut self, policy: UpwardCascadePolicy) -> Self {
        self.upward_cascade = policy;
        self
    }
}
