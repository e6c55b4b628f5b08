//! # Interactive Telemetry
//!
//! Structured logging for the frame runtime, built on `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use interactive_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // every tracing event from the frame crates is now emitted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QI_SERVICE_NAME` | `quantum-interactives` | Service name in the startup record |
//! | `QI_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `QI_JSON_LOGS` | `false` | JSON output instead of the pretty format |

mod config;
mod subscriber;

pub use config::TelemetryConfig;
pub use subscriber::build_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber.
///
/// Returns a guard to hold for the lifetime of the application. Fails when
/// the filter does not parse or a subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    subscriber::init_subscriber(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Span carrying the sub-interactive id, for work done on behalf of one child.
///
/// ```rust,ignore
/// let _span = interactive_span!("flush", subinteractive_id = %id).entered();
/// ```
#[macro_export]
macro_rules! interactive_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
