//! # Reload Decision
//!
//! A live child cannot be reconfigured in place: the protocol has no
//! "patch authored state" message. The only way to hand a child a new
//! URL or a new authored configuration is to navigate its frame again.
//!
//! ```text
//! reload = current_src != desired.url
//!       OR NOT structurally_equal(last_known_child_authored, desired.authored_state)
//! ```
//!
//! Runtime state never takes part in this decision.

use shared_types::{structurally_equal, AuthoredConfig, InteractiveMode, LinkedInteractive};
use std::fmt;

/// What the parent wants a child frame to show.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredFrame {
    /// Source URL of the child.
    pub url: String,
    /// Authored configuration of the child.
    pub authored_state: AuthoredConfig,
    /// Mode passed in the handshake.
    pub mode: InteractiveMode,
    /// Linked interactives passed in the handshake.
    pub linked_interactives: Option<Vec<LinkedInteractive>>,
}

impl DesiredFrame {
    /// Runtime-mode frame for `url` with `authored_state`.
    pub fn new(url: impl Into<String>, authored_state: AuthoredConfig) -> Self {
        Self {
            url: url.into(),
            authored_state,
            mode: InteractiveMode::Runtime,
            linked_interactives: None,
        }
    }

    /// Set the handshake mode.
    #[must_use]
    pub fn with_mode(mut self, mode: InteractiveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the linked interactives passed in the handshake.
    #[must_use]
    pub fn with_linked_interactives(mut self, linked: Vec<LinkedInteractive>) -> Self {
        self.linked_interactives = Some(linked);
        self
    }
}

/// Why a frame is navigated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// Nothing loaded yet.
    InitialLoad,
    /// The frame points at a different URL.
    UrlChanged,
    /// Authored configuration differs structurally from what the child has.
    AuthoredStateChanged,
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InitialLoad => "initial load",
            Self::UrlChanged => "url changed",
            Self::AuthoredStateChanged => "authored state changed",
        })
    }
}

/// Outcome of [`should_reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadDecision {
    /// Navigate the frame and reconnect.
    Reload(ReloadReason),
    /// Leave the frame and its channel untouched.
    Keep,
}

impl ReloadDecision {
    /// Whether this decision requires a reload.
    #[must_use]
    pub fn is_reload(&self) -> bool {
        matches!(self, Self::Reload(_))
    }
}

/// Decide whether a child frame must be navigated again.
pub fn should_reload(
    current_src: Option<&str>,
    last_known_child_authored: Option<&AuthoredConfig>,
    desired: &DesiredFrame,
) -> ReloadDecision {
    let (Some(src), Some(known)) = (current_src, last_known_child_authored) else {
        return ReloadDecision::Reload(ReloadReason::InitialLoad);
    };
    if src != desired.url {
        return ReloadDecision::Reload(ReloadReason::UrlChanged);
    }
    if !structurally_equal(known, &desired.authored_state) {
        return ReloadDecision::Reload(ReloadReason::AuthoredStateChanged);
    }
    ReloadDecision::Keep
}
