//! # Frame Runtime
//!
//! Runs a composite interactive as the child of a host page.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` from `QI_*` environment variables
//! - `host/` - `HostSession` (the outer protocol) and `HostPlatform`
//! - `demo` - scripted loopback host and children
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load and validate `RuntimeConfig`
//! 3. Connect the host link
//! 4. Start the `HostSession`; children mount on the first `initInteractive`

pub mod config;
pub mod demo;
pub mod host;

pub use config::{ConfigError, ProxyConfig, RuntimeConfig};
pub use host::{HostPlatform, HostReporter, HostSession, SessionError, SessionPorts};
