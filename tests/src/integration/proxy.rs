//! # Proxied Requests
//!
//! A child's request id survives the trip to the host even though the
//! upstream leg uses an out-of-band id.

#[cfg(test)]
mod tests {
    use frame_runtime::demo::scripted_host;
    use qi_01_channel_transport::{ChannelHandle, LoopbackFrame, LoopbackWindow, MessageChannel};
    use qi_02_frame_controller::{
        ChildFrameController, ControllerConfig, ControllerPorts, DesiredFrame, RecordingPlatform,
        UpstreamProxy,
    };
    use serde_json::json;
    use shared_types::{events, ProxiedKind};
    use std::sync::Arc;

    struct TwoLevels {
        host: Arc<LoopbackWindow>,
        proxy: Arc<UpstreamProxy>,
        child: Arc<LoopbackWindow>,
        controller: ChildFrameController,
    }

    fn two_levels(answering_host: bool) -> TwoLevels {
        let host = LoopbackWindow::auto_ready();
        if answering_host {
            host.set_responder(scripted_host());
        }
        let link = ChannelHandle::new();
        link.connect(Some(&LoopbackFrame::new(Arc::clone(&host))), || {})
            .unwrap();
        let upstream: Arc<dyn MessageChannel> = Arc::new(link);
        let proxy = UpstreamProxy::new(upstream);
        proxy.listen();

        let child = LoopbackWindow::auto_ready();
        let controller = ChildFrameController::new(
            "q1".into(),
            ControllerConfig::default(),
            ControllerPorts::new(Arc::new(RecordingPlatform::new())).with_upstream(proxy.clone()),
        );
        controller.attach_element(Arc::new(LoopbackFrame::new(Arc::clone(&child))));
        controller.render(DesiredFrame::new("A", json!({})));

        TwoLevels {
            host,
            proxy,
            child,
            controller,
        }
    }

    #[test]
    fn test_attachment_id_round_trip() {
        let t = two_levels(true);
        t.child.emit(
            events::GET_ATTACHMENT_URL,
            json!({ "requestId": 42, "name": "photo.png", "operation": "read" }),
        );

        let upstream = t.host.received_named(events::GET_ATTACHMENT_URL);
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].payload["requestId"], json!(1_000_000));
        assert_eq!(upstream[0].payload["name"], json!("photo.png"));

        let answers = t.child.received_named(events::ATTACHMENT_URL);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].payload["requestId"], json!(42));
        assert_eq!(answers[0].payload["url"], json!("https://files.example/photo.png"));
        assert_eq!(t.proxy.pending(), 0);
    }

    #[test]
    fn test_every_proxied_kind_round_trips() {
        let t = two_levels(true);
        for (n, kind) in ProxiedKind::ALL.into_iter().enumerate() {
            t.child
                .emit(kind.request_event(), json!({ "requestId": n, "name": "x" }));
            let answers = t.child.received_named(kind.response_event());
            assert_eq!(answers.len(), 1, "{}", kind.response_event());
            assert_eq!(answers[0].payload["requestId"], json!(n));
        }
    }

    #[test]
    fn test_same_child_ids_do_not_collide_upstream() {
        let t = two_levels(false);
        t.child.emit(events::GET_ATTACHMENT_URL, json!({ "requestId": 1 }));
        t.child.emit(events::GET_FIREBASE_JWT, json!({ "requestId": 1 }));

        let ids: Vec<_> = t
            .host
            .received()
            .iter()
            .filter(|m| m.event == events::GET_ATTACHMENT_URL || m.event == events::GET_FIREBASE_JWT)
            .map(|m| m.payload["requestId"].clone())
            .collect();
        assert_eq!(ids, vec![json!(1_000_000), json!(1_000_001)]);
        assert_eq!(t.proxy.pending(), 2);
    }

    #[test]
    fn test_reload_releases_pending_requests() {
        let t = two_levels(false);
        t.child.emit(events::GET_ATTACHMENT_URL, json!({ "requestId": 1 }));
        assert_eq!(t.proxy.pending(), 1);

        t.controller.render(DesiredFrame::new("B", json!({})));
        assert_eq!(t.proxy.pending(), 0);

        t.host.emit(
            events::ATTACHMENT_URL,
            json!({ "requestId": 1_000_000, "url": "late" }),
        );
        assert!(t.child.received_named(events::ATTACHMENT_URL).is_empty());
    }

    #[test]
    fn test_in_band_response_left_alone() {
        let t = two_levels(false);
        t.host
            .emit(events::ATTACHMENT_URL, json!({ "requestId": 7, "url": "x" }));
        assert!(t.child.received_named(events::ATTACHMENT_URL).is_empty());
    }
}
