//! # Reload Decisions
//!
//! A child reloads only when its URL changes or its authored state differs
//! structurally. Runtime state never causes a reload.

#[cfg(test)]
mod tests {
    use super::super::fixtures::mounted;
    use qi_01_channel_transport::{ChannelState, FrameElement};
    use qi_02_frame_controller::{DesiredFrame, ReloadReason, SyncOutcome};
    use serde_json::json;
    use shared_types::events;

    // =============================================================================
    // IDEMPOTENCE
    // =============================================================================

    #[test]
    fn test_unchanged_frame_initializes_once() {
        let m = mounted("q1");
        for _ in 0..10 {
            m.controller
                .render(DesiredFrame::new("https://a.example/", json!({ "x": 1, "list": [1, 2] })));
        }

        assert_eq!(m.controller.connection_count(), 1);
        assert_eq!(m.window.count(events::INIT_INTERACTIVE), 1);
        assert_eq!(m.frame.navigations(), 1);
    }

    #[test]
    fn test_deep_equal_authored_state_keeps_frame() {
        let m = mounted("q1");
        let first = json!({ "a": { "b": [1, { "c": null }] }, "d": "e" });
        let copy: serde_json::Value = serde_json::from_str(&first.to_string()).unwrap();

        m.controller.render(DesiredFrame::new("https://a.example/", first));
        let outcome = m.controller.render(DesiredFrame::new("https://a.example/", copy));

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(m.controller.connection_count(), 1);
    }

    #[test]
    fn test_nested_difference_reloads_once() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new(
            "https://a.example/",
            json!({ "a": { "b": [1, { "c": null }] } }),
        ));
        let old = m.controller.channel().unwrap();

        let outcome = m.controller.render(DesiredFrame::new(
            "https://a.example/",
            json!({ "a": { "b": [1, { "c": 0 }] } }),
        ));

        assert_eq!(outcome, SyncOutcome::Reloaded(ReloadReason::AuthoredStateChanged));
        assert_eq!(old.state(), ChannelState::Disconnected);
        assert_eq!(m.controller.connection_count(), 2);
        assert_eq!(m.controller.channel_state(), Some(ChannelState::Ready));
    }

    #[test]
    fn test_url_change_reloads() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("https://a.example/", json!({})));
        let outcome = m.controller.render(DesiredFrame::new("https://b.example/", json!({})));

        assert_eq!(outcome, SyncOutcome::Reloaded(ReloadReason::UrlChanged));
        assert_eq!(m.frame.current_src(), Some("https://b.example/".to_string()));
    }

    // =============================================================================
    // RUNTIME STATE
    // =============================================================================

    #[test]
    fn test_runtime_state_never_reloads() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("https://a.example/", json!({ "x": 1 })));
        let handle = m.controller.channel().unwrap();

        m.controller.set_interactive_state(json!({ "answer": 1 }));
        m.window.emit(events::INTERACTIVE_STATE, json!({ "answer": 2 }));
        m.controller.update_interactive_state(|_| json!({ "answer": 3 }));
        m.controller.render(DesiredFrame::new("https://a.example/", json!({ "x": 1 })));

        assert!(m.controller.channel().unwrap().same_channel(&handle));
        assert_eq!(handle.state(), ChannelState::Ready);
        assert_eq!(m.controller.connection_count(), 1);
    }

    // =============================================================================
    // CONCRETE SCENARIO
    // =============================================================================

    #[test]
    fn test_concrete_scenario() {
        let m = mounted("q1");

        m.controller.render(DesiredFrame::new("A", json!({ "x": 1 })));
        assert_eq!(m.controller.connection_count(), 1);

        let outcome = m.controller.render(DesiredFrame::new("A", json!({ "x": 1 })));
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(m.controller.connection_count(), 1);

        let first = m.controller.channel().unwrap();
        let outcome = m.controller.render(DesiredFrame::new("A", json!({ "x": 2 })));
        assert!(matches!(outcome, SyncOutcome::Reloaded(_)));
        assert_eq!(first.state(), ChannelState::Disconnected);
        assert_eq!(m.controller.connection_count(), 2);

        m.window.emit(events::INTERACTIVE_STATE, json!({ "y": 5 }));
        assert_eq!(m.controller.interactive_state(), json!({ "y": 5 }));
        assert_eq!(m.controller.connection_count(), 2);
    }

    #[test]
    fn test_handshake_carries_latest_runtime_state() {
        let window = qi_01_channel_transport::LoopbackWindow::new();
        let m = super::super::fixtures::mounted_in("q1", window);
        m.controller.render(DesiredFrame::new("A", json!({ "x": 1 })));

        // Child not ready yet: the state set now must be the one handed over.
        m.controller.set_interactive_state(json!({ "late": true }));
        m.window.signal_ready();

        let init: shared_types::InitInteractive = m.window.received_named(events::INIT_INTERACTIVE)[0]
            .decode()
            .unwrap();
        assert_eq!(init.interactive_state, json!({ "late": true }));
        assert_eq!(init.authored_state, json!({ "x": 1 }));
    }
}
