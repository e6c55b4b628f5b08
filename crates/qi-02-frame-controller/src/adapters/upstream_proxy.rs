//! # Upstream Proxy
//!
//! Relays attachment, token and interactive-list requests from children to
//! the host one level up, and routes each response back to the child that
//! asked.
//!
//! ```text
//! child ──getAttachmentUrl{requestId: 3}──→ proxy ──getAttachmentUrl{requestId: 1000000}──→ host
//! child ←──attachmentUrl{requestId: 3}───── proxy ←──attachmentUrl{requestId: 1000000}───── host
//! ```
//!
//! Upstream ids come from an out-of-band range so they never collide with
//! requests the parent itself has in flight with the host.

use parking_lot::Mutex;
use qi_01_channel_transport::{
    ChannelHandle, ListenerRegistration, MessageChannel, PendingRequest, RequestIdMapper,
};
use serde_json::Value;
use shared_types::envelope::decode_payload;
use shared_types::{FrameMessage, ProxiedKind, ProxiedMessage, RequestId};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::FrameError;
use crate::ports::UpstreamRequests;

type Route = (ProxiedKind, ChannelHandle);

/// Request/response relay over a link to the upstream host.
pub struct UpstreamProxy {
    host: Arc<dyn MessageChannel>,
    mapper: Mutex<RequestIdMapper<Route>>,
    registrations: Mutex<Vec<ListenerRegistration>>,
}

impl UpstreamProxy {
    /// Proxy over `host` with the default id range and bound.
    pub fn new(host: Arc<dyn MessageChannel>) -> Arc<Self> {
        Self::with_config(
            host,
            RequestIdMapper::<Route>::DEFAULT_BASE,
            RequestIdMapper::<Route>::DEFAULT_MAX_PENDING,
        )
    }

    /// Proxy over `host` allocating ids from `base`, at most `max_pending` in flight.
    pub fn with_config(host: Arc<dyn MessageChannel>, base: RequestId, max_pending: usize) -> Arc<Self> {
        Arc::new(Self {
            host,
            mapper: Mutex::new(RequestIdMapper::with_config(base, max_pending)),
            registrations: Mutex::new(Vec::new()),
        })
    }

    /// Subscribe to the host's responses. Idempotent.
    pub fn listen(self: &Arc<Self>) {
        let mut registrations = self.registrations.lock();
        if !registrations.is_empty() {
            return;
        }
        for kind in ProxiedKind::ALL {
            let weak = Arc::downgrade(self);
            registrations.push(self.host.add_listener(
                kind.response_event(),
                Arc::new(move |payload: &Value| {
                    if let Some(proxy) = weak.upgrade() {
                        proxy.handle_response(kind, payload);
                    }
                }),
            ));
        }
    }

    /// Remove the response listeners added by `listen`.
    pub fn stop_listening(&self) {
        let registrations = std::mem::take(&mut *self.registrations.lock());
        for registration in &registrations {
            self.host.remove_listener(registration);
        }
    }

    /// Route one host response back to the child that asked.
    ///
    /// Returns whether the response was delivered. Responses to ids this
    /// proxy did not issue are left alone.
    pub fn handle_response(&self, kind: ProxiedKind, payload: &Value) -> bool {
        let response: ProxiedMessage = match decode_payload(kind.response_event(), payload) {
            Ok(response) => response,
            Err(e) => {
                warn!(event = kind.response_event(), error = %e, "Malformed proxied response");
                return false;
            }
        };

        let restored = {
            let mut mapper = self.mapper.lock();
            if !mapper.is_out_of_band(response.request_id) {
                return false;
            }
            let requested = mapper.route(response.request_id).map(|(requested, _)| *requested);
            match requested {
                Some(requested) if requested != kind => {
                    warn!(
                        event = kind.response_event(),
                        request_id = response.request_id,
                        requested = requested.response_event(),
                        "Proxied response kind does not match request"
                    );
                    return false;
                }
                Some(_) => mapper.restore(response.request_id),
                None => None,
            }
        };
        let Some(PendingRequest {
            original_id,
            route: (_, child),
        }) = restored
        else {
            warn!(
                event = kind.response_event(),
                request_id = response.request_id,
                "Stray proxied response"
            );
            return false;
        };

        let delivered = FrameMessage::typed(kind.response_event(), &response.with_request_id(original_id))
            .map_err(FrameError::from)
            .and_then(|message| child.post_message(message).map_err(FrameError::from));
        match delivered {
            Ok(()) => {
                debug!(
                    event = kind.response_event(),
                    request_id = original_id,
                    upstream_id = response.request_id,
                    "Proxied response delivered"
                );
                true
            }
            Err(e) => {
                debug!(request_id = original_id, error = %e, "Child gone before proxied response");
                false
            }
        }
    }

    /// Requests awaiting a host response.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.mapper.lock().pending()
    }
}

impl UpstreamRequests for UpstreamProxy {
    fn relay(
        &self,
        kind: ProxiedKind,
        request: ProxiedMessage,
        child: ChannelHandle,
    ) -> Result<RequestId, FrameError> {
        let upstream_id = self
            .mapper
            .lock()
            .rewrite(request.request_id, (kind, child));

        let posted = FrameMessage::typed(kind.request_event(), &request.with_request_id(upstream_id))
            .map_err(FrameError::from)
            .and_then(|message| {
                self.host
                    .post(&message.event, message.payload)
                    .map_err(FrameError::from)
            });
        if let Err(e) = posted {
            self.mapper.lock().restore(upstream_id);
            return Err(e);
        }
        Ok(upstream_id)
    }

    fn release(&self, child: &ChannelHandle) -> usize {
        self.mapper
            .lock()
            .forget_matching(|(_, route)| route == child)
    }
}

impl Drop for UpstreamProxy {
    fn drop(&mut self) {
        self.stop_listening();
    }
}
