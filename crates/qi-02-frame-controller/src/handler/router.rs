//! # Event Router
//!
//! Maps every named event a child posts to the parent-side action.
//!
//! | event | action |
//! |---|---|
//! | `interactiveState` | functional update of the authoritative state, settles a pending flush |
//! | `authoredState` | new authored baseline, reported upward |
//! | `height` | frame height |
//! | `hint` | hint slot |
//! | `log` | platform log, merged with sub-interactive context |
//! | `showModal` / `closeModal` | platform modal API; unsupported kinds alert instead |
//! | `add/removeLinkedInteractiveStateListener` | sibling-state registry |
//! | `getAttachmentUrl` / `getFirebaseJWT` / `getInteractiveList` | proxied upstream |
//!
//! Malformed payloads are logged and dropped; nothing propagates back to
//! the child.

use qi_01_channel_transport::{ChannelHandle, ListenerRegistration, MessageChannel};
use serde_json::{Map, Value};
use shared_types::envelope::decode_payload;
use shared_types::{
    events, AddLinkedInteractiveStateListener, LogRequest, ProxiedKind, ProxiedMessage,
    RemoveLinkedInteractiveStateListener, ShowModalRequest, SubInteractiveId,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::FrameError;
use crate::service::ControllerShared;

/// Register every router listener on `handle`.
///
/// The returned registrations are owned by the connection and removed
/// when it is torn down.
pub(crate) fn wire(shared: &Arc<ControllerShared>, handle: &ChannelHandle) -> Vec<ListenerRegistration> {
    let mut registrations = vec![
        listen(shared, handle, events::INTERACTIVE_STATE, |s, _, payload| {
            s.on_interactive_state(payload.clone());
        }),
        listen(shared, handle, events::AUTHORED_STATE, |s, _, payload| {
            s.on_authored_state(payload.clone());
        }),
        listen(shared, handle, events::HEIGHT, on_height),
        listen(shared, handle, events::HINT, |s, _, payload| {
            s.on_hint(payload.clone());
        }),
        listen(shared, handle, events::LOG, on_log),
        listen(shared, handle, events::SHOW_MODAL, on_show_modal),
        listen(shared, handle, events::CLOSE_MODAL, |s, _, payload| {
            s.ports.platform.close_modal(payload);
        }),
        listen(
            shared,
            handle,
            events::ADD_LINKED_INTERACTIVE_STATE_LISTENER,
            on_add_linked_listener,
        ),
        listen(
            shared,
            handle,
            events::REMOVE_LINKED_INTERACTIVE_STATE_LISTENER,
            on_remove_linked_listener,
        ),
    ];

    for kind in ProxiedKind::ALL {
        registrations.push(listen(shared, handle, kind.request_event(), move |s, channel, payload| {
            on_proxied_request(s, channel, kind, payload);
        }));
    }

    debug!(
        subinteractive_id = %shared.id,
        channel = handle.id(),
        listeners = registrations.len(),
        "Router wired"
    );
    registrations
}

fn listen<F>(
    shared: &Arc<ControllerShared>,
    handle: &ChannelHandle,
    event: &str,
    action: F,
) -> ListenerRegistration
where
    F: Fn(&ControllerShared, &ChannelHandle, &Value) + Send + Sync + 'static,
{
    let weak = Arc::downgrade(shared);
    let channel = handle.clone();
    handle.add_listener(
        event,
        Arc::new(move |payload: &Value| {
            if let Some(shared) = weak.upgrade() {
                action(&shared, &channel, payload);
            }
        }),
    )
}

// =============================================================================
// HANDLERS
// =============================================================================

fn on_height(shared: &ControllerShared, _channel: &ChannelHandle, payload: &Value) {
    let height = payload
        .as_f64()
        .or_else(|| payload.get("height").and_then(Value::as_f64));
    match height {
        Some(height) if height.is_finite() && height >= 0.0 => shared.on_height(height),
        _ => warn!(subinteractive_id = %shared.id, %payload, "Ignoring invalid height"),
    }
}

fn on_log(shared: &ControllerShared, _channel: &ChannelHandle, payload: &Value) {
    let request: LogRequest = match decode_payload(events::LOG, payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(subinteractive_id = %shared.id, error = %e, "Dropping malformed log event");
            return;
        }
    };
    let url = shared.current_url();
    let data = merge_log_context(
        &request.data,
        &shared.id,
        url.as_deref(),
        shared.config.nesting_level,
    );
    shared.ports.platform.log(&request.action, &data);
}

fn on_show_modal(shared: &ControllerShared, _channel: &ChannelHandle, payload: &Value) {
    let request: ShowModalRequest = match decode_payload(events::SHOW_MODAL, payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(subinteractive_id = %shared.id, error = %e, "Dropping malformed showModal");
            return;
        }
    };

    if shared.config.supports_modal(request.kind) {
        shared.ports.platform.show_modal(&request);
        return;
    }

    let requested = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or(request.kind.as_str());
    warn!(
        subinteractive_id = %shared.id,
        kind = requested,
        "Unsupported modal kind in nested context"
    );
    shared.ports.platform.alert(&unsupported_modal_message(requested));
}

fn on_add_linked_listener(shared: &ControllerShared, channel: &ChannelHandle, payload: &Value) {
    let request: AddLinkedInteractiveStateListener =
        match decode_payload(events::ADD_LINKED_INTERACTIVE_STATE_LISTENER, payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(subinteractive_id = %shared.id, error = %e, "Dropping malformed linked listener request");
                return;
            }
        };
    match &shared.ports.linked {
        Some(linked) => linked.add_listener(&shared.id, request, channel.clone()),
        None => debug!(
            subinteractive_id = %shared.id,
            "No linked state registry; listener request ignored"
        ),
    }
}

fn on_remove_linked_listener(shared: &ControllerShared, _channel: &ChannelHandle, payload: &Value) {
    let request: RemoveLinkedInteractiveStateListener =
        match decode_payload(events::REMOVE_LINKED_INTERACTIVE_STATE_LISTENER, payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(subinteractive_id = %shared.id, error = %e, "Dropping malformed linked listener removal");
                return;
            }
        };
    if let Some(linked) = &shared.ports.linked {
        linked.remove_listener(&shared.id, &request.listener_id);
    }
}

fn on_proxied_request(
    shared: &ControllerShared,
    channel: &ChannelHandle,
    kind: ProxiedKind,
    payload: &Value,
) {
    let request: ProxiedMessage = match decode_payload(kind.request_event(), payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(subinteractive_id = %shared.id, error = %e, "Dropping malformed proxied request");
            return;
        }
    };
    let original_id = request.request_id;

    let relayed = match &shared.ports.upstream {
        Some(upstream) => upstream.relay(kind, request, channel.clone()),
        None => Err(FrameError::UpstreamUnavailable {
            event: kind.request_event().to_string(),
        }),
    };
    match relayed {
        Ok(upstream_id) => debug!(
            subinteractive_id = %shared.id,
            event = kind.request_event(),
            request_id = original_id,
            upstream_id,
            "Proxied request relayed"
        ),
        Err(e) => warn!(
            subinteractive_id = %shared.id,
            request_id = original_id,
            error = %e,
            "Proxied request not relayed"
        ),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Merge the fixed sub-interactive context into a child's log data.
///
/// Object data keeps its fields; any other non-null value is kept under
/// `value`. Context fields always win.
pub fn merge_log_context(
    data: &Value,
    subinteractive: &SubInteractiveId,
    url: Option<&str>,
    nesting_level: u32,
) -> Value {
    let mut merged = match data {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    };
    merged.insert(
        "subinteractiveId".to_string(),
        Value::String(subinteractive.to_string()),
    );
    if let Some(url) = url {
        merged.insert("subinteractiveUrl".to_string(), Value::String(url.to_string()));
    }
    merged.insert("nestingLevel".to_string(), Value::from(nesting_level));
    Value::Object(merged)
}

/// Text of the alert shown instead of an unsupported modal.
#[must_use]
pub fn unsupported_modal_message(kind: &str) -> String {
    format!("Modal type \"{kind}\" is not supported inside this interactive.")
}
