//! # Frame Ports
//!
//! The two things a channel needs from its environment: the frame element
//! it is bound to, and that element's content window.
//!
//! In a browser these are an `<iframe>` and its `contentWindow`. Native
//! hosts and tests use [`crate::loopback`].

use crate::channel::ParentPort;
use shared_types::FrameMessage;
use std::sync::Arc;

/// The document living inside a frame element.
pub trait ContentWindow: Send + Sync {
    /// Bind the parent end of a channel.
    ///
    /// The window calls [`ParentPort::ready`] once the child document has
    /// completed the transport handshake, and [`ParentPort::receive`] for
    /// every message the child posts afterwards.
    fn attach(&self, port: ParentPort);

    /// Deliver one message into the child document.
    fn deliver(&self, message: FrameMessage);

    /// Forget the parent end bound by `attach`.
    fn detach(&self);
}

/// One frame element, exclusively owned by a single controller.
pub trait FrameElement: Send + Sync {
    /// Source the frame currently points at, if any.
    fn current_src(&self) -> Option<String>;

    /// Point the frame at a new source. Always navigates, even to the same URL.
    fn set_src(&self, url: &str);

    /// Set the rendered height in CSS pixels.
    fn set_height(&self, height: f64);

    /// The window of the document currently loaded in the frame.
    fn content_window(&self) -> Option<Arc<dyn ContentWindow>>;
}
