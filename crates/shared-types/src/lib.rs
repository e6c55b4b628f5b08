//! # Shared Types Crate
//!
//! This crate contains the protocol vocabulary exchanged between a parent
//! interactive and the child interactives it embeds in frames, as well as
//! between the top-level interactive and the host platform one level up.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every event name and payload shape lives here.
//! - **Opaque State**: authored and runtime state are arbitrary JSON values;
//!   nothing in the frame runtime interprets their contents.
//! - **Structural Comparison**: authored state is compared with
//!   [`structurally_equal`], never by identity.

pub mod entities;
pub mod envelope;
pub mod equality;
pub mod errors;
pub mod ids;
pub mod ipc;
pub mod state;

pub use entities::*;
pub use envelope::FrameMessage;
pub use equality::structurally_equal;
pub use errors::*;
pub use ids::*;
pub use ipc::*;
pub use state::{parse_state, parse_state_or_default};
