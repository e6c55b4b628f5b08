//! The composite's side of the link to its host.

pub mod platform;
pub mod session;

pub use platform::{HostPlatform, HostReporter};
pub use session::{HostSession, SessionError, SessionPorts};
