//! Handler layer: routing of inbound child events.

pub mod router;

pub use router::{merge_log_context, unsupported_modal_message};
