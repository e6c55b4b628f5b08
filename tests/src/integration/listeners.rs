//! # Listener Symmetry
//!
//! Every listener registered for a connection is gone once that connection
//! is disconnected, and a torn-down controller reacts to nothing.

#[cfg(test)]
mod tests {
    use super::super::fixtures::mounted;
    use qi_01_channel_transport::ChannelState;
    use qi_02_frame_controller::DesiredFrame;
    use serde_json::json;
    use shared_types::events;

    #[test]
    fn test_reload_leaves_no_listener_behind() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({ "v": 1 })));
        let first = m.controller.channel().unwrap();
        let wired = first.listener_count();
        assert!(wired > 0);

        for v in 2..6 {
            m.controller.render(DesiredFrame::new("A", json!({ "v": v })));
        }

        assert_eq!(first.listener_count(), 0);
        let current = m.controller.channel().unwrap();
        assert_eq!(current.listener_count(), wired);
    }

    #[test]
    fn test_one_handler_call_per_event_after_reloads() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({ "v": 1 })));
        m.controller.render(DesiredFrame::new("A", json!({ "v": 2 })));
        m.controller.render(DesiredFrame::new("A", json!({ "v": 3 })));

        m.window.emit(events::LOG, json!({ "action": "clicked", "data": {} }));
        assert_eq!(m.platform.logs().len(), 1);
    }

    #[test]
    fn test_teardown_silences_child() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({})));
        let handle = m.controller.channel().unwrap();

        m.controller.teardown();
        m.window.emit(events::LOG, json!({ "action": "late", "data": {} }));
        m.window.emit(events::HEIGHT, json!(500));
        m.window.emit(events::INTERACTIVE_STATE, json!({ "late": true }));

        assert_eq!(handle.state(), ChannelState::Disconnected);
        assert_eq!(handle.listener_count(), 0);
        assert!(m.platform.logs().is_empty());
        assert_eq!(m.controller.height(), None);
        assert_eq!(m.controller.interactive_state(), serde_json::Value::Null);
    }
}
