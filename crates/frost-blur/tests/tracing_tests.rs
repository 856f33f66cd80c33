#![forbid(unsafe_code)]

//! Structured logging tests for the blur controller.
//!
//! Captures events emitted under the `frost.blur` target with a test layer
//! and checks the lifecycle and failure events carry the expected fields.
//!
//! Run with: cargo test -p frost-blur --test tracing_tests

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::{FakeRoot, FakeTarget, ProviderMode, RootMode, rig};
use frost_blur::{BlurConfig, BlurViewFacade};
use frost_core::geometry::Size;
use frost_render::PackedRgba;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event with its level and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

/// A tracing Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Visitor that extracts event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run `f` with event capture and return the `frost.blur` events.
fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
        .into_iter()
        .filter(|e| e.target == "frost.blur")
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn render_failure_emits_warning_with_error() {
    let events = with_captured_events(|| {
        let r = rig(
            FakeTarget::new(64, 64),
            FakeRoot::new(RootMode::Fail("bad child")),
            ProviderMode::InPlace,
            BlurConfig::default(),
        );
        r.handle.update_blur().unwrap();
    });

    let warnings: Vec<_> = events.iter().filter(|e| e.level == Level::WARN).collect();
    assert_eq!(warnings.len(), 1, "events: {events:?}");
    let warning = warnings[0];
    assert!(warning.message().contains("hierarchy render failed"));
    assert!(
        warning.fields.get("error").is_some_and(|e| e.contains("bad child")),
        "fields: {:?}",
        warning.fields
    );
    assert_eq!(warning.fields.get("failures").map(String::as_str), Some("1"));
}

#[test]
fn allocation_logs_buffer_geometry() {
    let events = with_captured_events(|| {
        let _r = rig(
            FakeTarget::new(300, 450),
            FakeRoot::filling(PackedRgba::RED),
            ProviderMode::InPlace,
            BlurConfig::default(),
        );
    });

    let alloc = events
        .iter()
        .find(|e| e.message() == "offscreen buffer allocated")
        .expect("allocation event");
    assert_eq!(alloc.level, Level::DEBUG);
    assert_eq!(alloc.fields.get("buffer_w").map(String::as_str), Some("64"));
    assert_eq!(alloc.fields.get("buffer_h").map(String::as_str), Some("64"));
    assert_eq!(alloc.fields.get("measured_w").map(String::as_str), Some("300"));
}

#[test]
fn deferral_and_destroy_are_logged_once() {
    let events = with_captured_events(|| {
        let mut r = rig(
            FakeTarget::new(0, 0),
            FakeRoot::filling(PackedRgba::RED),
            ProviderMode::InPlace,
            BlurConfig::default(),
        );
        r.handle.destroy();
        r.handle.destroy();
    });

    let count = |msg: &str| events.iter().filter(|e| e.message() == msg).count();
    assert_eq!(count("target not laid out; deferring initialization"), 1);
    assert_eq!(count("destroyed"), 1);
}

#[test]
fn healthy_frames_emit_no_warnings() {
    let events = with_captured_events(|| {
        let r = rig(
            FakeTarget::new(128, 128),
            FakeRoot::filling(PackedRgba::BLUE),
            ProviderMode::InPlace,
            BlurConfig::default(),
        );
        for _ in 0..3 {
            r.handle.update_blur().unwrap();
        }
        r.handle
            .with_mut(|c| c.resize(Size::new(128, 128)))
            .unwrap()
            .unwrap();
    });
    assert!(events.iter().all(|e| e.level != Level::WARN), "events: {events:?}");
}

#[test]
fn facade_call_during_update_warns_and_is_dropped() {
    let events = with_captured_events(|| {
        let r = rig(
            FakeTarget::new(64, 64),
            FakeRoot::filling(PackedRgba::RED),
            ProviderMode::InPlace,
            BlurConfig::default(),
        );
        *r.root.mode.borrow_mut() = RootMode::Destroy(r.handle.downgrade());
        r.handle.update_blur().unwrap();
    });

    let busy: Vec<_> = events
        .iter()
        .filter(|e| e.message() == "controller busy; call ignored")
        .collect();
    assert_eq!(busy.len(), 1, "events: {events:?}");
    assert_eq!(busy[0].level, Level::WARN);
    assert_eq!(busy[0].fields.get("op").map(String::as_str), Some("destroy"));
    assert!(events.iter().all(|e| e.message() != "destroyed"));
}

#[test]
fn mismatched_provider_output_is_logged() {
    let events = with_captured_events(|| {
        let (provider, _log) = common::RecordingProvider::new(ProviderMode::InPlace);
        let handle = frost_blur::BlurHandle::new(
            FakeTarget::new(64, 64),
            FakeRoot::filling(PackedRgba::RED),
            provider.claiming_in_place(false),
            BlurConfig::default(),
        )
        .unwrap();
        assert!(handle.update_blur().is_err());
    });

    let rejected = events
        .iter()
        .find(|e| e.message() == "blur output rejected")
        .expect("rejection event");
    assert_eq!(rejected.level, Level::WARN);
    assert!(
        rejected.fields.get("error").is_some_and(|e| e.contains("recording")),
        "fields: {:?}",
        rejected.fields
    );
}
