//! # Runtime Configuration
//!
//! Settings of one host session, read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `QI_NESTING_LEVEL` | `1` |
//! | `QI_REQUEST_ID_BASE` | `1000000` |
//! | `QI_MAX_PENDING_REQUESTS` | `256` |
//! | `QI_OUTBOX_CAPACITY` | `1000` |

use qi_01_channel_transport::RequestIdMapper;
use qi_02_frame_controller::ControllerConfig;
use shared_types::RequestId;
use std::env;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Settings handed to every child controller.
    pub controller: ControllerConfig,
    /// Upstream request relay settings.
    pub proxy: ProxyConfig,
}

/// Upstream request relay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyConfig {
    /// First id of the out-of-band range used toward the host.
    pub request_id_base: RequestId,
    /// Relayed requests in flight before the oldest is evicted.
    pub max_pending_requests: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            request_id_base: RequestIdMapper::<()>::DEFAULT_BASE,
            max_pending_requests: RequestIdMapper::<()>::DEFAULT_MAX_PENDING,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Nesting level must be at least 1")]
    NestingLevelZero,

    #[error("Request id base must be non-zero")]
    RequestIdBaseZero,

    #[error("At least one pending request must be allowed")]
    NoPendingRequests,

    #[error("Outbox capacity must be non-zero")]
    OutboxCapacityZero,
}

impl RuntimeConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Read the configuration through `lookup`, defaulting unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = parse_var(&lookup, "QI_NESTING_LEVEL")? {
            config.controller.nesting_level = level;
        }
        if let Some(base) = parse_var(&lookup, "QI_REQUEST_ID_BASE")? {
            config.proxy.request_id_base = base;
        }
        if let Some(max) = parse_var(&lookup, "QI_MAX_PENDING_REQUESTS")? {
            config.proxy.max_pending_requests = max;
        }
        if let Some(capacity) = parse_var(&lookup, "QI_OUTBOX_CAPACITY")? {
            config.controller.outbox_capacity = capacity;
        }

        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.nesting_level == 0 {
            return Err(ConfigError::NestingLevelZero);
        }
        if self.controller.outbox_capacity == 0 {
            return Err(ConfigError::OutboxCapacityZero);
        }
        if self.proxy.request_id_base == 0 {
            return Err(ConfigError::RequestIdBaseZero);
        }
        if self.proxy.max_pending_requests == 0 {
            return Err(ConfigError::NoPendingRequests);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
