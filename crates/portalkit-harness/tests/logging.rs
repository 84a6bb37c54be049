#![forbid(unsafe_code)]

//! Integration tests: what the engine reports through `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex};

use portalkit_core::dom::SurfaceElement;
use portalkit_harness::PortalHarness;
use portalkit_widgets::{BottomSheetConfig, BottomSheetRef, GuardError, SnapPoint};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct Warnings(Arc<Mutex<Vec<String>>>);

impl Warnings {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.0.lock().unwrap().push(message);
    }
}

fn with_warnings(f: impl FnOnce()) -> Vec<String> {
    let warnings = Warnings::default();
    let subscriber = Registry::default().with(warnings.clone());
    tracing::subscriber::with_default(subscriber, f);
    warnings.messages()
}

fn open(h: &PortalHarness, config: BottomSheetConfig) -> BottomSheetRef<(), ()> {
    h.sheets.open(config, |_| ())
}

#[test]
fn invalid_snap_points_warn_and_fall_back() {
    let cases: Vec<Vec<SnapPoint>> = vec![
        vec![],
        vec![SnapPoint::from(-0.5)],
        vec![SnapPoint::from(0.5), SnapPoint::from("tall")],
        vec![SnapPoint::from(f64::NAN)],
    ];
    for points in cases {
        let h = PortalHarness::new(1000.0, 900.0);
        let warnings = with_warnings(|| {
            let sheet = open(&h, BottomSheetConfig::new().snap_points(points.clone()));
            assert_eq!(sheet.current_snap_point_index(), 0);
        });
        assert_eq!(
            warnings,
            vec!["Invalid snap points, using defaults: [0.5, 1.0]".to_owned()],
            "{points:?}"
        );
        // Default 50% stop on a 900px sheet.
        let surface = h.host.last().unwrap().surface_element();
        assert_eq!(surface.translate_y(), Some(400.0));
    }
}

#[test]
fn valid_snap_points_open_quietly() {
    let h = PortalHarness::new(1000.0, 900.0);
    let warnings = with_warnings(|| {
        open(&h, BottomSheetConfig::new().snap_points(["250px", "40%", "0.9"]));
    });
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn guard_error_is_warned_but_denial_is_not() {
    let h = PortalHarness::new(1000.0, 900.0);
    let warnings = with_warnings(|| {
        let denied = open(&h, BottomSheetConfig::new());
        denied.set_before_close_guard(|| Ok(false));
        assert!(!denied.close(None));

        let failing = open(&h, BottomSheetConfig::new());
        failing.set_before_close_guard(|| Err(GuardError::new("autosave failed")));
        assert!(!failing.close(None));
    });
    assert_eq!(warnings, vec!["close guard failed; close denied".to_owned()]);
}
