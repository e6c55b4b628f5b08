//! # Frame Runtime Harness
//!
//! Drives a carousel through one full session over loopback frames:
//! initialize, re-initialize with reordered children, answer a student,
//! relay an attachment request, then flush for unload.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use frame_runtime::demo::{scripted_child, scripted_host};
use frame_runtime::{HostSession, RuntimeConfig, SessionPorts};
use interactive_telemetry::{init_telemetry, TelemetryConfig};
use qi_01_channel_transport::{ChannelHandle, LoopbackFrame, LoopbackWindow};
use qi_03_composite_container::{CompositeKind, LibraryCatalog, LoopbackFrameFactory};
use shared_types::{events, SubInteractiveId};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env().for_service("frame-runtime"))
        .context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid runtime configuration")?;
    config.validate().context("Invalid runtime configuration")?;
    info!(
        nesting_level = config.controller.nesting_level,
        request_id_base = config.proxy.request_id_base,
        "Starting frame runtime harness"
    );

    // Host one level up
    let host = LoopbackWindow::auto_ready();
    host.set_responder(scripted_host());
    let link = ChannelHandle::new();
    link.connect(Some(&LoopbackFrame::new(Arc::clone(&host))), || {})
        .context("Failed to connect to host")?;

    // Children
    let frames = Arc::new(
        LoopbackFrameFactory::auto_ready().with_responder(scripted_child(json!({ "answered": true }))),
    );
    let catalog = LibraryCatalog::new().with_entry("open-response", "https://open-response.example/");
    let session = HostSession::new(
        CompositeKind::Carousel,
        link.clone(),
        SessionPorts::new(frames.clone()).with_catalog(catalog),
        config,
    )
    .context("Failed to create host session")?;
    session.start();

    let authored = json!({
        "subinteractives": [
            { "id": "intro", "url": "https://text.example/", "authoredState": { "text": "Read this" } },
            { "id": "question", "libraryInteractiveId": "open-response", "authoredState": { "prompt": "Why?" } },
            { "id": "outro", "url": "https://text.example/", "authoredState": { "text": "Thanks" } }
        ]
    });
    host.emit(
        events::INIT_INTERACTIVE,
        json!({ "mode": "runtime", "authoredState": authored, "interactiveState": null }),
    );
    info!(frames = frames.created(), "Initialized");

    // Reordering keeps every child alive
    let mut reordered = authored.clone();
    if let Some(list) = reordered["subinteractives"].as_array_mut() {
        list.reverse();
    }
    let report = session
        .handle_init(&json!({ "mode": "runtime", "authoredState": reordered }))
        .context("Re-initialization failed")?;
    info!(
        reloaded = report.reloaded.len(),
        unchanged = report.unchanged.len(),
        frames = frames.created(),
        "Re-initialized with reordered children"
    );

    let question = SubInteractiveId::new("question");
    let child = frames
        .window(&question)
        .context("Question child was not mounted")?;
    child.emit(events::INTERACTIVE_STATE, json!({ "answerText": "Because." }));
    child.emit(
        events::GET_ATTACHMENT_URL,
        json!({ "requestId": 1, "name": "sketch.png", "operation": "read" }),
    );
    if let Some(reply) = child.received_named(events::ATTACHMENT_URL).last() {
        info!(url = %reply.payload["url"], "Attachment relayed");
    }

    let state = session
        .report_state(true)
        .await
        .context("Final flush failed")?;
    info!(
        children = state.subinteractive_states.len(),
        state = %state.to_value(),
        "Flushed for unload"
    );

    let stats = link.stats();
    info!(
        posted = stats.posted,
        received = stats.received,
        dropped = stats.dropped,
        "Host link counters"
    );

    session.stop();
    Ok(())
}
