//! Domain layer: reload decision, state reconciliation and flush bookkeeping.
//! No I/O; nothing here touches a channel.

pub mod config;
pub mod flush;
pub mod reload;
pub mod synchronizer;

pub use config::ControllerConfig;
pub use flush::{FlushSlot, PendingFlush};
pub use reload::{should_reload, DesiredFrame, ReloadDecision, ReloadReason};
pub use synchronizer::{RuntimeCell, StateSynchronizer};
