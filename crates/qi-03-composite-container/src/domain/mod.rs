//! Domain layer: composite kinds, authored and aggregated state, navigation.

pub mod authored;
pub mod catalog;
pub mod kind;
pub mod navigation;
pub mod state;

pub use authored::{CompositeAuthoredState, SubInteractive};
pub use catalog::LibraryCatalog;
pub use kind::CompositeKind;
pub use navigation::{current_or_first, next_id, previous_id};
pub use state::CompositeInteractiveState;
