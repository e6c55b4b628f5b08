//! Platform sinks and state reporting over the host link.
//!
//! A composite has no platform of its own: logs, modals and state changes
//! all go one level up as messages on the link to its host.

use qi_01_channel_transport::{ChannelHandle, MessageChannel};
use qi_02_frame_controller::PlatformSinks;
use qi_03_composite_container::{
    CompositeAuthoredState, CompositeInteractiveState, CompositeObserver,
};
use serde_json::{json, Map, Value};
use shared_types::{events, FrameMessage, LogRequest, ModalKind, ShowModalRequest};
use tracing::{debug, warn};

/// Posts platform requests to the host.
#[derive(Debug, Clone)]
pub struct HostPlatform {
    link: ChannelHandle,
}

impl HostPlatform {
    pub fn new(link: ChannelHandle) -> Self {
        Self { link }
    }

    fn send(&self, message: Result<FrameMessage, shared_types::ProtocolError>) {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Host message not serializable");
                return;
            }
        };
        let event = message.event.clone();
        if let Err(e) = self.link.post_message(message) {
            debug!(event = %event, error = %e, "Host link unavailable");
        }
    }
}

impl PlatformSinks for HostPlatform {
    fn log(&self, action: &str, data: &Value) {
        let request = LogRequest {
            action: action.to_string(),
            data: data.clone(),
        };
        self.send(FrameMessage::typed(events::LOG, &request));
    }

    fn show_modal(&self, request: &ShowModalRequest) {
        self.send(FrameMessage::typed(events::SHOW_MODAL, request));
    }

    fn close_modal(&self, options: &Value) {
        self.send(Ok(FrameMessage::new(events::CLOSE_MODAL, options.clone())));
    }

    /// Alerts become an informational alert modal on the host.
    fn alert(&self, message: &str) {
        warn!(message, "Alert raised by child");
        let mut options = Map::new();
        options.insert("style".to_string(), json!("info"));
        options.insert("text".to_string(), json!(message));
        let request = ShowModalRequest {
            kind: ModalKind::Alert,
            options,
        };
        self.send(FrameMessage::typed(events::SHOW_MODAL, &request));
    }
}

/// Reports composite state changes to the host.
#[derive(Debug, Clone)]
pub struct HostReporter {
    link: ChannelHandle,
}

impl HostReporter {
    pub fn new(link: ChannelHandle) -> Self {
        Self { link }
    }

    fn post(&self, event: &str, payload: Value) {
        if let Err(e) = self.link.post(event, payload) {
            debug!(event, error = %e, "Host link unavailable");
        }
    }
}

impl CompositeObserver for HostReporter {
    fn interactive_state_changed(&self, state: &CompositeInteractiveState) {
        self.post(events::INTERACTIVE_STATE, state.to_value());
    }

    fn authored_state_changed(&self, authored: &CompositeAuthoredState) {
        match serde_json::to_value(authored) {
            Ok(value) => self.post(events::AUTHORED_STATE, value),
            Err(e) => warn!(error = %e, "Authored state not serializable"),
        }
    }
}
