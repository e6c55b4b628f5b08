//! # Frame Protocol Payloads
//!
//! Event names and payload shapes of the cross-frame protocol.
//!
//! ## Directions
//!
//! - **parent → child**: `initInteractive`, `getInteractiveState`,
//!   `linkedInteractiveState`, and the replies to proxied requests
//!   (`attachmentUrl`, `firebaseJWT`, `interactiveList`).
//! - **child → parent**: `interactiveState`, `authoredState`, `height`,
//!   `hint`, `log`, `showModal`, `closeModal`, linked-state listener
//!   management, and proxied requests (`getAttachmentUrl`,
//!   `getFirebaseJWT`, `getInteractiveList`).
//!
//! The same vocabulary is spoken one level up, between the top-level
//! interactive and the host platform.

use crate::entities::{AuthoredConfig, InteractiveMode, ModalKind, RuntimeState};
use crate::ids::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event names.
pub mod events {
    // =========================================================================
    // PARENT → CHILD
    // =========================================================================
    /// Initialization handshake, sent once per connection.
    pub const INIT_INTERACTIVE: &str = "initInteractive";
    /// Flush request ahead of unload.
    pub const GET_INTERACTIVE_STATE: &str = "getInteractiveState";
    /// Sibling data push (side-by-side).
    pub const LINKED_INTERACTIVE_STATE: &str = "linkedInteractiveState";
    /// Reply to `getAttachmentUrl`.
    pub const ATTACHMENT_URL: &str = "attachmentUrl";
    /// Reply to `getFirebaseJWT`.
    pub const FIREBASE_JWT: &str = "firebaseJWT";
    /// Reply to `getInteractiveList`.
    pub const INTERACTIVE_LIST: &str = "interactiveList";

    // =========================================================================
    // CHILD → PARENT
    // =========================================================================
    /// Child reports its runtime state.
    pub const INTERACTIVE_STATE: &str = "interactiveState";
    /// Child reports its authored state (authoring mode).
    pub const AUTHORED_STATE: &str = "authoredState";
    /// Child reports its content height.
    pub const HEIGHT: &str = "height";
    /// Child sets or clears its hint.
    pub const HINT: &str = "hint";
    /// Child emits a log event.
    pub const LOG: &str = "log";
    /// Child asks for a modal.
    pub const SHOW_MODAL: &str = "showModal";
    /// Child closes a modal.
    pub const CLOSE_MODAL: &str = "closeModal";
    /// Child subscribes to a sibling's state.
    pub const ADD_LINKED_INTERACTIVE_STATE_LISTENER: &str = "addLinkedInteractiveStateListener";
    /// Child unsubscribes from a sibling's state.
    pub const REMOVE_LINKED_INTERACTIVE_STATE_LISTENER: &str =
        "removeLinkedInteractiveStateListener";
    /// Child asks for an attachment URL.
    pub const GET_ATTACHMENT_URL: &str = "getAttachmentUrl";
    /// Child asks for an auth token.
    pub const GET_FIREBASE_JWT: &str = "getFirebaseJWT";
    /// Child asks for the list of interactives on the page.
    pub const GET_INTERACTIVE_LIST: &str = "getInteractiveList";
}

// =============================================================================
// HANDSHAKE
// =============================================================================

/// Payload of `initInteractive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitInteractive {
    /// Mode the child runs in.
    pub mode: InteractiveMode,

    /// Authored configuration of the child.
    #[serde(default)]
    pub authored_state: AuthoredConfig,

    /// Current runtime state, `Null` when there is none yet.
    #[serde(default)]
    pub interactive_state: RuntimeState,

    /// Interactives this one is linked to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_interactives: Option<Vec<LinkedInteractive>>,

    /// Host-specific fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a linked interactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInteractive {
    /// Id of the linked interactive.
    pub id: String,
    /// Author-facing label of the link.
    #[serde(default)]
    pub label: String,
}

// =============================================================================
// UNLOAD / FLUSH
// =============================================================================

/// Payload of `getInteractiveState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInteractiveState {
    /// Whether the enclosing page is about to unload.
    #[serde(default)]
    pub unloading: bool,
}

// =============================================================================
// UI EVENTS
// =============================================================================

/// Payload of `log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    /// Action name.
    pub action: String,
    /// Free-form event data.
    #[serde(default)]
    pub data: Value,
}

/// Payload of `showModal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowModalRequest {
    /// Requested modal kind.
    #[serde(rename = "type")]
    pub kind: ModalKind,
    /// Remaining modal options, forwarded untouched.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

// =============================================================================
// LINKED INTERACTIVE STATE
// =============================================================================

/// Payload of `addLinkedInteractiveStateListener`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLinkedInteractiveStateListener {
    /// Sibling whose state is wanted.
    pub interactive_item_id: String,
    /// Child-chosen id echoed back in every push.
    pub listener_id: String,
}

/// Payload of `removeLinkedInteractiveStateListener`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLinkedInteractiveStateListener {
    /// Id given when the listener was added.
    pub listener_id: String,
}

/// Payload of `linkedInteractiveState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInteractiveState {
    /// Id given when the listener was added.
    pub listener_id: String,
    /// Latest state of the sibling, `Null` if none.
    pub interactive_state: RuntimeState,
}

// =============================================================================
// PROXIED REQUESTS
// =============================================================================

/// Requests a parent relays to the host on behalf of a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxiedKind {
    /// `getAttachmentUrl` → `attachmentUrl`.
    AttachmentUrl,
    /// `getFirebaseJWT` → `firebaseJWT`.
    FirebaseJwt,
    /// `getInteractiveList` → `interactiveList`.
    InteractiveList,
}

impl ProxiedKind {
    /// All proxied kinds.
    pub const ALL: [ProxiedKind; 3] = [
        ProxiedKind::AttachmentUrl,
        ProxiedKind::FirebaseJwt,
        ProxiedKind::InteractiveList,
    ];

    /// Event name of the request (child → parent → host).
    #[must_use]
    pub fn request_event(&self) -> &'static str {
        match self {
            Self::AttachmentUrl => events::GET_ATTACHMENT_URL,
            Self::FirebaseJwt => events::GET_FIREBASE_JWT,
            Self::InteractiveList => events::GET_INTERACTIVE_LIST,
        }
    }

    /// Event name of the response (host → parent → child).
    #[must_use]
    pub fn response_event(&self) -> &'static str {
        match self {
            Self::AttachmentUrl => events::ATTACHMENT_URL,
            Self::FirebaseJwt => events::FIREBASE_JWT,
            Self::InteractiveList => events::INTERACTIVE_LIST,
        }
    }
}

/// A request or response carrying a `requestId`.
///
/// Everything but the id is opaque and relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxiedMessage {
    /// Correlation id chosen by the requester.
    pub request_id: RequestId,
    /// Remaining fields.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ProxiedMessage {
    /// Copy of this message carrying a different id.
    #[must_use]
    pub fn with_request_id(&self, request_id: RequestId) -> Self {
        Self {
            request_id,
            body: self.body.clone(),
        }
    }
}
