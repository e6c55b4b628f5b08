//! Scripted loopback peers for the harness and tests.

use qi_01_channel_transport::Responder;
use serde_json::{json, Value};
use shared_types::{events, FrameMessage, ProxiedKind, ProxiedMessage};
use std::sync::Arc;

/// A child that reports its height after the handshake and answers every
/// state request with `answer`.
pub fn scripted_child(answer: Value) -> Responder {
    Arc::new(move |message: &FrameMessage| match message.event.as_str() {
        events::INIT_INTERACTIVE => vec![FrameMessage::new(events::HEIGHT, json!(240))],
        events::GET_INTERACTIVE_STATE => {
            vec![FrameMessage::new(events::INTERACTIVE_STATE, answer.clone())]
        }
        _ => Vec::new(),
    })
}

/// A host that answers every relayed request.
///
/// Attachments resolve to `https://files.example/<name>`, tokens to a fixed
/// string and interactive lists to an empty list.
pub fn scripted_host() -> Responder {
    Arc::new(|message: &FrameMessage| {
        let Some(kind) = ProxiedKind::ALL
            .into_iter()
            .find(|k| k.request_event() == message.event)
        else {
            return Vec::new();
        };
        let Ok(request) = message.decode::<ProxiedMessage>() else {
            return Vec::new();
        };

        let mut body = serde_json::Map::new();
        match kind {
            ProxiedKind::AttachmentUrl => {
                let name = request
                    .body
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("unnamed");
                body.insert("url".to_string(), json!(format!("https://files.example/{name}")));
            }
            ProxiedKind::FirebaseJwt => {
                body.insert("token".to_string(), json!("demo-token"));
            }
            ProxiedKind::InteractiveList => {
                body.insert("interactives".to_string(), json!([]));
            }
        }
        let response = ProxiedMessage {
            request_id: request.request_id,
            body,
        };
        FrameMessage::typed(kind.response_event(), &response)
            .map(|m| vec![m])
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_answers_attachment() {
        let host = scripted_host();
        let replies = host(&FrameMessage::new(
            events::GET_ATTACHMENT_URL,
            json!({ "requestId": 9, "name": "a.png" }),
        ));
        assert_eq!(replies[0].event, events::ATTACHMENT_URL);
        assert_eq!(replies[0].payload["requestId"], json!(9));
        assert_eq!(replies[0].payload["url"], json!("https://files.example/a.png"));
    }

    #[test]
    fn test_host_ignores_other_events() {
        let host = scripted_host();
        assert!(host(&FrameMessage::new(events::LOG, json!({}))).is_empty());
    }

    #[test]
    fn test_child_answers_state_request() {
        let child = scripted_child(json!({ "x": 1 }));
        let replies = child(&FrameMessage::new(events::GET_INTERACTIVE_STATE, json!({})));
        assert_eq!(replies[0].payload, json!({ "x": 1 }));
    }
}
