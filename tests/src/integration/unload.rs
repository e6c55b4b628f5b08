//! # Unload Flush
//!
//! `flush` asks a live child for its state and resolves with the reply; with
//! no live channel it resolves at once with the authoritative state.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{mounted, mounted_in};
    use qi_01_channel_transport::LoopbackWindow;
    use qi_02_frame_controller::{
        ChildFrameController, ControllerConfig, ControllerPorts, DesiredFrame, FrameError,
        RecordingPlatform,
    };
    use serde_json::json;
    use shared_types::{events, GetInteractiveState};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_flush_resolves_with_child_reply() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({})));
        m.controller.set_interactive_state(json!({ "stale": true }));

        let pending = m.controller.flush(true);
        let request: GetInteractiveState = m.window.received_named(events::GET_INTERACTIVE_STATE)[0]
            .decode()
            .unwrap();
        assert!(request.unloading);

        m.window.emit(events::INTERACTIVE_STATE, json!({ "fresh": 1 }));

        let state = timeout(Duration::from_secs(1), pending)
            .await
            .expect("flush timed out")
            .unwrap();
        assert_eq!(state, json!({ "fresh": 1 }));
        assert_eq!(m.controller.interactive_state(), json!({ "fresh": 1 }));
    }

    #[tokio::test]
    async fn test_flush_without_channel_is_immediate() {
        let controller = ChildFrameController::with_state(
            "q1".into(),
            ControllerConfig::default(),
            ControllerPorts::new(Arc::new(RecordingPlatform::new())),
            json!({ "saved": true }),
        );

        let state = timeout(Duration::from_millis(100), controller.flush(true))
            .await
            .expect("flush should not wait")
            .unwrap();
        assert_eq!(state, json!({ "saved": true }));
    }

    #[tokio::test]
    async fn test_flush_while_connecting_is_immediate() {
        let m = mounted_in("q1", LoopbackWindow::new());
        m.controller.render(DesiredFrame::new("A", json!({})));
        m.controller.set_interactive_state(json!({ "kept": 1 }));

        let state = timeout(Duration::from_millis(100), m.controller.flush(false))
            .await
            .expect("flush should not wait")
            .unwrap();
        assert_eq!(state, json!({ "kept": 1 }));
    }

    #[tokio::test]
    async fn test_second_flush_supersedes_first() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({})));

        let first = m.controller.flush(false);
        let second = m.controller.flush(true);
        m.window.emit(events::INTERACTIVE_STATE, json!({ "n": 2 }));

        assert_eq!(first.await, Err(FrameError::FlushSuperseded));
        assert_eq!(second.await.unwrap(), json!({ "n": 2 }));
    }

    #[tokio::test]
    async fn test_reload_resolves_pending_flush() {
        let m = mounted("q1");
        m.controller.render(DesiredFrame::new("A", json!({ "v": 1 })));
        m.controller.set_interactive_state(json!({ "last": true }));

        let pending = m.controller.flush(true);
        m.controller.render(DesiredFrame::new("A", json!({ "v": 2 })));

        let state = timeout(Duration::from_secs(1), pending)
            .await
            .expect("flush timed out")
            .unwrap();
        assert_eq!(state, json!({ "last": true }));
    }
}
