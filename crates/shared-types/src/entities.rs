//! # Core Entities
//!
//! Value types shared by every layer of the frame runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authoring-time configuration of a sub-interactive.
///
/// Opaque to the parent. Compared structurally to decide reloads.
pub type AuthoredConfig = serde_json::Value;

/// Student-facing state of a sub-interactive.
///
/// Opaque to the parent. Never compared for reload purposes.
pub type RuntimeState = serde_json::Value;

/// The mode an interactive is initialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveMode {
    /// Author is editing the interactive's configuration.
    Authoring,
    /// Student is using the interactive.
    #[default]
    Runtime,
    /// Teacher report view of a student's answer.
    Report,
}

impl InteractiveMode {
    /// Wire name of the mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authoring => "authoring",
            Self::Runtime => "runtime",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for InteractiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of modal a child may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    /// Simple text alert.
    Alert,
    /// Image or content lightbox.
    Lightbox,
    /// Dialog hosting another interactive.
    Dialog,
    /// Anything this runtime does not know about.
    #[serde(other)]
    Unknown,
}

impl ModalKind {
    /// Wire name of the modal kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Lightbox => "lightbox",
            Self::Dialog => "dialog",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
