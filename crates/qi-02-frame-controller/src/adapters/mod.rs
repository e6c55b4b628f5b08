//! Adapters layer: concrete implementations of the outbound ports.

pub mod platform;
pub mod upstream_proxy;

pub use platform::{RecordingPlatform, TracingPlatform};
pub use upstream_proxy::UpstreamProxy;
