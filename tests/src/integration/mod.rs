//! Integration scenarios.

pub mod composite;
pub mod listeners;
pub mod proxy;
pub mod reload;
pub mod unload;

#[cfg(test)]
pub(crate) mod fixtures {
    use qi_01_channel_transport::{LoopbackFrame, LoopbackWindow};
    use qi_02_frame_controller::{
        ChildFrameController, ControllerConfig, ControllerPorts, RecordingPlatform,
    };
    use std::sync::Arc;

    /// A controller mounted in a loopback frame whose child completes the
    /// handshake on attach.
    pub(crate) struct Mounted {
        pub controller: ChildFrameController,
        pub frame: Arc<LoopbackFrame>,
        pub window: Arc<LoopbackWindow>,
        pub platform: Arc<RecordingPlatform>,
    }

    pub(crate) fn mounted(id: &str) -> Mounted {
        let window = LoopbackWindow::auto_ready();
        mounted_in(id, window)
    }

    pub(crate) fn mounted_in(id: &str, window: Arc<LoopbackWindow>) -> Mounted {
        let frame = Arc::new(LoopbackFrame::new(Arc::clone(&window)));
        let platform = Arc::new(RecordingPlatform::new());
        let controller = ChildFrameController::new(
            id.into(),
            ControllerConfig::default(),
            ControllerPorts::new(platform.clone()),
        );
        controller.attach_element(frame.clone());
        Mounted {
            controller,
            frame,
            window,
            platform,
        }
    }
}
