//! # Linked State Hub
//!
//! Lets one child subscribe to a sibling's runtime state without a round
//! trip through the host. Used by side-by-side.
//!
//! On subscription the sibling's current state is pushed at once; every
//! later change is pushed as `linkedInteractiveState`. Subscriptions die
//! with the subscriber's channel.

use parking_lot::RwLock;
use qi_01_channel_transport::ChannelHandle;
use qi_02_frame_controller::LinkedStateRegistry;
use serde_json::Value;
use shared_types::{
    events, AddLinkedInteractiveStateListener, FrameMessage, LinkedInteractiveState,
    RuntimeState, SubInteractiveId,
};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Subscription {
    subscriber: SubInteractiveId,
    source: SubInteractiveId,
    listener_id: String,
    channel: ChannelHandle,
}

/// In-process registry of sibling subscriptions.
#[derive(Debug, Default)]
pub struct LinkedStateHub {
    subscriptions: RwLock<Vec<Subscription>>,
    latest: RwLock<HashMap<SubInteractiveId, RuntimeState>>,
}

impl LinkedStateHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the known state of `source` without pushing it.
    pub fn seed(&self, source: &SubInteractiveId, state: RuntimeState) {
        self.latest.write().insert(source.clone(), state);
    }

    /// Forget a removed child: its state and its subscriptions either way.
    pub fn forget(&self, id: &SubInteractiveId) {
        self.latest.write().remove(id);
        self.subscriptions
            .write()
            .retain(|s| s.subscriber != *id && s.source != *id);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    fn push(subscription: &Subscription, state: &RuntimeState) {
        let message = LinkedInteractiveState {
            listener_id: subscription.listener_id.clone(),
            interactive_state: state.clone(),
        };
        let posted = FrameMessage::typed(events::LINKED_INTERACTIVE_STATE, &message)
            .map(|m| subscription.channel.post_message(m));
        match posted {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(
                subscriber = %subscription.subscriber,
                error = %e,
                "Linked state push dropped"
            ),
            Err(e) => warn!(error = %e, "Linked state not serializable"),
        }
    }
}

impl LinkedStateRegistry for LinkedStateHub {
    fn add_listener(
        &self,
        subscriber: &SubInteractiveId,
        request: AddLinkedInteractiveStateListener,
        channel: ChannelHandle,
    ) {
        let source = SubInteractiveId::new(request.interactive_item_id);
        let subscription = Subscription {
            subscriber: subscriber.clone(),
            source: source.clone(),
            listener_id: request.listener_id,
            channel,
        };
        {
            let mut subscriptions = self.subscriptions.write();
            subscriptions.retain(|s| {
                !(s.subscriber == subscription.subscriber && s.listener_id == subscription.listener_id)
            });
            subscriptions.push(subscription.clone());
        }
        debug!(
            subscriber = %subscriber,
            source = %source,
            listener_id = %subscription.listener_id,
            "Linked state listener added"
        );

        let current = self
            .latest
            .read()
            .get(&source)
            .cloned()
            .unwrap_or(Value::Null);
        Self::push(&subscription, &current);
    }

    fn remove_listener(&self, subscriber: &SubInteractiveId, listener_id: &str) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| !(s.subscriber == *subscriber && s.listener_id == listener_id));
        before != subscriptions.len()
    }

    fn remove_all(&self, subscriber: &SubInteractiveId) -> usize {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.subscriber != *subscriber);
        before - subscriptions.len()
    }

    fn publish(&self, source: &SubInteractiveId, state: &RuntimeState) {
        self.latest.write().insert(source.clone(), state.clone());
        let targets: Vec<Subscription> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.source == *source)
            .cloned()
            .collect();
        for subscription in &targets {
            Self::push(subscription, state);
        }
    }
}
