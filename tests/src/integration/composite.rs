//! # Composite End to End
//!
//! A host session drives a composite: ids key the children, unmounted
//! levels keep their state, and side-by-side children see each other.

#[cfg(test)]
mod tests {
    use frame_runtime::demo::{scripted_child, scripted_host};
    use frame_runtime::{HostSession, RuntimeConfig, SessionPorts};
    use qi_01_channel_transport::{ChannelHandle, LoopbackFrame, LoopbackWindow};
    use qi_03_composite_container::{CompositeInteractiveState, CompositeKind, LoopbackFrameFactory};
    use serde_json::{json, Value};
    use shared_types::{events, InitInteractive, LinkedInteractiveState, SubInteractiveId};
    use std::sync::Arc;

    struct Page {
        session: HostSession,
        host: Arc<LoopbackWindow>,
        frames: Arc<LoopbackFrameFactory>,
    }

    fn page(kind: CompositeKind) -> Page {
        let host = LoopbackWindow::auto_ready();
        host.set_responder(scripted_host());
        let link = ChannelHandle::new();
        link.connect(Some(&LoopbackFrame::new(Arc::clone(&host))), || {})
            .unwrap();
        let frames = Arc::new(
            LoopbackFrameFactory::auto_ready().with_responder(scripted_child(json!({ "flushed": true }))),
        );
        let session = HostSession::new(
            kind,
            link,
            SessionPorts::new(frames.clone()),
            RuntimeConfig::default(),
        )
        .unwrap();
        session.start();
        Page {
            session,
            host,
            frames,
        }
    }

    fn init(page: &Page, subinteractives: Value, state: Value) {
        page.host.emit(
            events::INIT_INTERACTIVE,
            json!({
                "mode": "runtime",
                "authoredState": { "subinteractives": subinteractives },
                "interactiveState": state
            }),
        );
    }

    fn id(s: &str) -> SubInteractiveId {
        SubInteractiveId::new(s)
    }

    fn last_reported(host: &LoopbackWindow) -> CompositeInteractiveState {
        let reports = host.received_named(events::INTERACTIVE_STATE);
        CompositeInteractiveState::from_host(&reports.last().expect("no state reported").payload)
    }

    #[test]
    fn test_reorder_keeps_every_child() {
        let p = page(CompositeKind::Carousel);
        let subs = json!([
            { "id": "a", "url": "https://a.example/", "authoredState": { "n": 1 } },
            { "id": "b", "url": "https://b.example/", "authoredState": { "n": 2 } },
            { "id": "c", "url": "https://c.example/", "authoredState": { "n": 3 } }
        ]);
        init(&p, subs.clone(), Value::Null);

        let mut reversed = subs.as_array().unwrap().clone();
        reversed.reverse();
        init(&p, Value::Array(reversed), Value::Null);

        assert_eq!(p.frames.created(), 3);
        for child in ["a", "b", "c"] {
            assert_eq!(p.frames.window(&id(child)).unwrap().count(events::INIT_INTERACTIVE), 1);
        }
    }

    #[test]
    fn test_child_state_reaches_host() {
        let p = page(CompositeKind::Carousel);
        init(
            &p,
            json!([{ "id": "a", "url": "https://a.example/" }]),
            Value::Null,
        );

        p.frames
            .window(&id("a"))
            .unwrap()
            .emit(events::INTERACTIVE_STATE, json!({ "answer": 42 }));

        let state = last_reported(&p.host);
        assert_eq!(state.state_of(&id("a")), json!({ "answer": 42 }));
        assert_eq!(state.current_subinteractive_id, Some(id("a")));
    }

    #[test]
    fn test_child_log_carries_context() {
        let p = page(CompositeKind::Carousel);
        init(
            &p,
            json!([{ "id": "a", "url": "https://a.example/" }]),
            Value::Null,
        );

        p.frames
            .window(&id("a"))
            .unwrap()
            .emit(events::LOG, json!({ "action": "clicked", "data": { "button": "ok" } }));

        let logged = &p.host.received_named(events::LOG)[0].payload;
        assert_eq!(logged["action"], json!("clicked"));
        assert_eq!(logged["data"]["button"], json!("ok"));
        assert_eq!(logged["data"]["subinteractiveId"], json!("a"));
        assert_eq!(logged["data"]["subinteractiveUrl"], json!("https://a.example/"));
        assert_eq!(logged["data"]["nestingLevel"], json!(1));
    }

    #[test]
    fn test_dialog_modal_becomes_alert() {
        let p = page(CompositeKind::Carousel);
        init(
            &p,
            json!([{ "id": "a", "url": "https://a.example/" }]),
            Value::Null,
        );

        let child = p.frames.window(&id("a")).unwrap();
        child.emit(events::SHOW_MODAL, json!({ "type": "dialog", "url": "x" }));
        child.emit(events::SHOW_MODAL, json!({ "type": "lightbox", "url": "y" }));

        let modals = p.host.received_named(events::SHOW_MODAL);
        assert_eq!(modals.len(), 2);
        assert_eq!(modals[0].payload["type"], json!("alert"));
        assert_eq!(modals[1].payload["type"], json!("lightbox"));
        assert_eq!(modals[1].payload["url"], json!("y"));
    }

    #[test]
    fn test_scaffolded_levels_keep_state() {
        let p = page(CompositeKind::ScaffoldedQuestion);
        init(
            &p,
            json!([
                { "id": "l1", "url": "https://l.example/1" },
                { "id": "l2", "url": "https://l.example/2" }
            ]),
            json!({ "subinteractiveStates": { "l1": { "tries": 1 } } }),
        );
        let container = p.session.container().unwrap();
        assert_eq!(container.mounted(), vec![id("l1")]);

        let level1 = p.frames.window(&id("l1")).unwrap();
        let init: InitInteractive = level1.received_named(events::INIT_INTERACTIVE)[0].decode().unwrap();
        assert_eq!(init.interactive_state, json!({ "tries": 1 }));
        level1.emit(events::INTERACTIVE_STATE, json!({ "tries": 2 }));

        container.advance().unwrap();
        assert_eq!(container.mounted(), vec![id("l2")]);

        let state = last_reported(&p.host);
        assert_eq!(state.state_of(&id("l1")), json!({ "tries": 2 }));
        assert_eq!(state.current_subinteractive_id, Some(id("l2")));
    }

    #[test]
    fn test_side_by_side_linked_state() {
        let p = page(CompositeKind::SideBySide);
        init(
            &p,
            json!([
                { "id": "left", "url": "https://left.example/" },
                { "id": "right", "url": "https://right.example/" }
            ]),
            json!({ "subinteractiveStates": { "left": { "dataset": [1] } } }),
        );
        let left = p.frames.window(&id("left")).unwrap();
        let right = p.frames.window(&id("right")).unwrap();

        right.emit(
            events::ADD_LINKED_INTERACTIVE_STATE_LISTENER,
            json!({ "interactiveItemId": "left", "listenerId": "watch-left" }),
        );
        left.emit(events::INTERACTIVE_STATE, json!({ "dataset": [1, 2] }));

        let pushes: Vec<LinkedInteractiveState> = right
            .received_named(events::LINKED_INTERACTIVE_STATE)
            .iter()
            .map(|m| m.decode().unwrap())
            .collect();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[0].interactive_state, json!({ "dataset": [1] }));
        assert_eq!(pushes[1].interactive_state, json!({ "dataset": [1, 2] }));
        assert!(pushes.iter().all(|p| p.listener_id == "watch-left"));

        right.emit(
            events::REMOVE_LINKED_INTERACTIVE_STATE_LISTENER,
            json!({ "listenerId": "watch-left" }),
        );
        left.emit(events::INTERACTIVE_STATE, json!({ "dataset": [] }));
        assert_eq!(right.received_named(events::LINKED_INTERACTIVE_STATE).len(), 2);
    }

    #[tokio::test]
    async fn test_unload_flushes_every_child() {
        let p = page(CompositeKind::Carousel);
        init(
            &p,
            json!([
                { "id": "a", "url": "https://a.example/" },
                { "id": "b", "url": "https://b.example/" }
            ]),
            Value::Null,
        );

        let state = p.session.report_state(true).await.unwrap();
        assert_eq!(state.state_of(&id("a")), json!({ "flushed": true }));
        assert_eq!(state.state_of(&id("b")), json!({ "flushed": true }));
        assert_eq!(last_reported(&p.host), state);
    }
}
