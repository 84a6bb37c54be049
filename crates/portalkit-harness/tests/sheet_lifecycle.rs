#![forbid(unsafe_code)]

//! Integration tests: opening, stacking and closing bottom sheets.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use portalkit_a11y::AriaAttributes;
use portalkit_core::dom::{Document, StyleTarget, SurfaceElement};
use portalkit_core::event::{Key, NodeId};
use portalkit_harness::PortalHarness;
use portalkit_widgets::{BottomSheetConfig, BottomSheetRef, GuardError, OverlayHandle};

const VIEWPORT: f64 = 1000.0;
const SHEET_HEIGHT: f64 = 900.0;
const DURATION: Duration = Duration::from_millis(300);

fn harness() -> PortalHarness {
    PortalHarness::new(VIEWPORT, SHEET_HEIGHT)
}

fn config() -> BottomSheetConfig {
    BottomSheetConfig::new()
}

fn open(h: &PortalHarness, config: BottomSheetConfig) -> BottomSheetRef<(), String> {
    h.sheets.open(config, |_| ())
}

fn record_closed(sheet: &BottomSheetRef<(), String>) -> Rc<RefCell<Vec<Option<String>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    sheet
        .after_closed()
        .subscribe(move |result: &Option<String>| sink.borrow_mut().push(result.clone()))
        .detach();
    log
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn open_sets_up_surface() {
    let h = harness();
    let sheet = open(
        &h,
        config()
            .panel_class("menu")
            .aria(AriaAttributes::new().label("Actions").described_by("hint")),
    );
    let overlay = h.host.last().unwrap();
    let surface = overlay.surface_element();

    assert_eq!(sheet.level(), 0);
    assert!(sheet.id().starts_with("bottom-sheet-"));
    assert!(surface.has_class("bottom-sheet-container"));
    assert!(surface.has_class("menu"));
    assert_eq!(surface.style("position").as_deref(), Some("fixed"));
    assert_eq!(surface.style("bottom").as_deref(), Some("0"));
    assert_eq!(surface.style("max-height").as_deref(), Some("90vh"));
    assert_eq!(surface.attribute("role").as_deref(), Some("dialog"));
    assert_eq!(surface.attribute("aria-modal").as_deref(), Some("true"));
    assert_eq!(surface.attribute("aria-label").as_deref(), Some("Actions"));
    assert_eq!(surface.attribute("aria-describedby").as_deref(), Some("hint"));
    assert_eq!(surface.attribute("aria-labelledby"), None);

    let backdrop = overlay.backdrop_element().unwrap();
    assert!(backdrop.has_class("bottom-sheet-backdrop"));
    assert_eq!(backdrop.style("z-index").as_deref(), Some("1000"));
    assert_eq!(surface.style("z-index").as_deref(), Some("1001"));
}

#[test]
fn open_defaults_to_first_snap_point() {
    let h = harness();
    let sheet = open(&h, config());
    let surface = h.host.last().unwrap().surface_element();
    // 50% of the viewport visible out of a 900px sheet.
    assert_eq!(sheet.current_snap_point_index(), 0);
    assert_eq!(surface.translate_y(), Some(400.0));
}

#[test]
fn mount_receives_data_and_handle() {
    let h = harness();
    let seen = Rc::new(Cell::new(None));
    let seen_in = Rc::clone(&seen);
    let sheet: BottomSheetRef<String, ()> = h.sheets.open(
        BottomSheetConfig::new().data(42u32),
        move |ctx| {
            seen_in.set(ctx.data);
            ctx.surface.set_attribute("data-mounted", "yes");
            format!("component for {}", ctx.sheet.id())
        },
    );
    assert_eq!(seen.get(), Some(42));
    let surface = h.host.last().unwrap().surface_element();
    assert_eq!(surface.attribute("data-mounted").as_deref(), Some("yes"));
    assert_eq!(
        sheet.with_component(Clone::clone),
        Some(format!("component for {}", sheet.id()))
    );
}

#[test]
fn opening_classes_settle_after_duration() {
    let h = harness();
    open(&h, config());
    let overlay = h.host.last().unwrap();
    let surface = overlay.surface_element();
    let backdrop = overlay.backdrop_element().unwrap();

    assert!(surface.has_class("bottom-sheet-opening"));
    assert!(backdrop.has_class("bottom-sheet-backdrop-opening"));
    assert!(surface.has_class("bottom-sheet-snapping"));
    assert_eq!(
        surface.style("--bottom-sheet-animation-duration").as_deref(),
        Some("300ms")
    );

    h.advance(DURATION);
    assert!(!surface.has_class("bottom-sheet-opening"));
    assert!(surface.has_class("bottom-sheet-opened"));
    assert!(backdrop.has_class("bottom-sheet-backdrop-opened"));
    assert!(!surface.has_class("bottom-sheet-snapping"));
}

#[test]
fn without_animation_sheet_opens_in_place() {
    let h = harness();
    let sheet = open(&h, config().animation(false).snap_points([0.3, 0.6]).initial_snap_point(1));
    let surface = h.host.last().unwrap().surface_element();
    assert!(surface.has_class("bottom-sheet-opened"));
    assert!(!surface.has_class("bottom-sheet-snapping"));
    assert_eq!(surface.translate_y(), Some(300.0));
    assert_eq!(sheet.current_snap_point_index(), 1);
    assert_eq!(h.timers.pending(), 0);
}

#[test]
fn no_backdrop_when_disabled() {
    let h = harness();
    open(&h, config().has_backdrop(false));
    let overlay = h.host.last().unwrap();
    assert!(overlay.backdrop_element().is_none());
    assert!(!overlay.config().has_backdrop);
}

// ============================================================================
// Stacking
// ============================================================================

#[test]
fn levels_and_z_bands_follow_open_order() {
    let h = harness();
    let sheets: Vec<_> = (0..3).map(|_| open(&h, config())).collect();
    let levels: Vec<usize> = sheets.iter().map(|s| s.level()).collect();
    assert_eq!(levels, vec![0, 1, 2]);
    assert_eq!(h.sheets.open_count().get(), 3);

    let surfaces: Vec<String> = h
        .host
        .created()
        .iter()
        .map(|o| o.surface_element().style("z-index").unwrap())
        .collect();
    assert_eq!(surfaces, vec!["1001", "1011", "1021"]);

    assert!(h.sheets.is_topmost(sheets[2].id()));
    assert!(!h.sheets.is_topmost(sheets[0].id()));
    let ids: Vec<String> = h
        .sheets
        .open_bottom_sheets()
        .iter()
        .map(|s| s.id().to_owned())
        .collect();
    assert_eq!(ids, sheets.iter().map(|s| s.id().to_owned()).collect::<Vec<_>>());
}

#[test]
fn ids_are_never_reused() {
    let h = harness();
    let first = open(&h, config().animation(false));
    let first_id = first.id().to_owned();
    first.close(None);
    let other = harness();
    let second = open(&other, config());
    let third = open(&h, config());
    assert_ne!(first_id, second.id());
    assert_ne!(first_id, third.id());
    assert_ne!(second.id(), third.id());
}

#[test]
fn open_count_tracks_closes() {
    let h = harness();
    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&counts);
    let _sub = h
        .sheets
        .open_count()
        .subscribe(move |n: &usize| sink.borrow_mut().push(*n));

    let a = open(&h, config());
    let b = open(&h, config());
    b.close(None);
    h.settle();
    a.close(None);
    h.settle();
    assert_eq!(*counts.borrow(), vec![1, 2, 1, 0]);
}

// ============================================================================
// Closing
// ============================================================================

#[test]
fn close_delivers_result_after_animation() {
    let h = harness();
    let sheet = open(&h, config());
    h.settle();
    let closed = record_closed(&sheet);
    let overlay = h.host.last().unwrap();
    let surface = overlay.surface_element();

    assert!(sheet.close(Some("saved".to_owned())));
    assert!(sheet.is_closing());
    assert!(surface.has_class("bottom-sheet-closing"));
    assert!(!surface.has_class("bottom-sheet-opened"));
    assert!(closed.borrow().is_empty());

    h.advance(DURATION - Duration::from_millis(1));
    assert!(closed.borrow().is_empty());
    assert!(!overlay.is_disposed());

    h.advance(Duration::from_millis(1));
    assert_eq!(*closed.borrow(), vec![Some("saved".to_owned())]);
    assert!(surface.has_class("bottom-sheet-closed"));
    assert!(overlay.is_disposed());
    assert_eq!(h.sheets.open_count().get(), 0);
}

#[test]
fn close_is_idempotent() {
    let h = harness();
    let sheet = open(&h, config());
    let closed = record_closed(&sheet);
    assert!(sheet.close(Some("first".to_owned())));
    assert!(!sheet.close(Some("second".to_owned())));
    assert!(!sheet.force_close(None));
    assert!(!sheet.dismiss());
    h.settle();
    assert!(!sheet.close(None));
    assert_eq!(*closed.borrow(), vec![Some("first".to_owned())]);
    assert!(h.sheets.open_bottom_sheets().is_empty());
}

#[test]
fn without_animation_close_completes_synchronously() {
    let h = harness();
    let sheet = open(&h, config().animation(false));
    let closed = record_closed(&sheet);
    sheet.close(Some("done".to_owned()));
    assert_eq!(*closed.borrow(), vec![Some("done".to_owned())]);
    assert_eq!(h.sheets.open_count().get(), 0);
}

#[test]
fn closing_during_open_cancels_opening_transition() {
    let h = harness();
    let sheet = open(&h, config());
    let surface = h.host.last().unwrap().surface_element();
    h.advance(Duration::from_millis(100));
    sheet.close(None);
    assert!(!surface.has_class("bottom-sheet-opening"));
    h.advance(Duration::from_millis(250));
    // The opening timer would have fired at 300ms.
    assert!(!surface.has_class("bottom-sheet-opened"));
    assert!(surface.has_class("bottom-sheet-closing"));
    h.settle();
    assert!(surface.has_class("bottom-sheet-closed"));
}

#[test]
fn component_dropped_when_overlay_disposed() {
    struct Probe(Rc<Cell<bool>>);
    impl Drop for Probe {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let h = harness();
    let dropped = Rc::new(Cell::new(false));
    let flag = Rc::clone(&dropped);
    let sheet: BottomSheetRef<Probe, ()> = h.sheets.open(config(), move |_| Probe(flag));
    sheet.close(None);
    assert!(!dropped.get());
    assert!(sheet.with_component(|_| ()).is_some());
    h.settle();
    assert!(dropped.get());
    assert!(sheet.with_component(|_| ()).is_none());
}

#[test]
fn dismiss_notifies_both_streams() {
    let h = harness();
    let sheet = open(&h, config());
    let closed = record_closed(&sheet);
    let dismissed = Rc::new(Cell::new(0));
    let d = Rc::clone(&dismissed);
    sheet
        .after_dismissed()
        .subscribe(move |_| d.set(d.get() + 1))
        .detach();

    assert!(sheet.dismiss());
    assert_eq!(dismissed.get(), 1);
    h.settle();
    assert_eq!(*closed.borrow(), vec![None]);
    assert!(sheet.after_dismissed().is_completed());
}

#[test]
fn dismissal_is_reported_before_close_with_or_without_animation() {
    for animated in [true, false] {
        let h = harness();
        let sheet = open(&h, config().animation(animated));
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&order), Rc::clone(&order));
        sheet
            .after_dismissed()
            .subscribe(move |_| a.borrow_mut().push("dismissed"))
            .detach();
        sheet
            .after_closed()
            .subscribe(move |_: &Option<String>| b.borrow_mut().push("closed"))
            .detach();

        assert!(sheet.dismiss());
        h.settle();
        assert_eq!(*order.borrow(), vec!["dismissed", "closed"], "animated: {animated}");
    }
}

#[test]
fn plain_close_does_not_report_dismissal() {
    let h = harness();
    let sheet = open(&h, config());
    let dismissed = Rc::new(Cell::new(false));
    let d = Rc::clone(&dismissed);
    sheet
        .after_dismissed()
        .subscribe(move |_| d.set(true))
        .detach();
    sheet.close(None);
    h.settle();
    assert!(!dismissed.get());
}

// ============================================================================
// Close guard
// ============================================================================

#[test]
fn guard_denial_keeps_sheet_open() {
    let h = harness();
    let sheet = open(&h, config());
    let allow = Rc::new(Cell::new(false));
    let calls = Rc::new(Cell::new(0));
    let (a, c) = (Rc::clone(&allow), Rc::clone(&calls));
    sheet.set_before_close_guard(move || {
        c.set(c.get() + 1);
        Ok(a.get())
    });

    assert!(!sheet.close(None));
    assert!(!sheet.dismiss());
    assert!(!sheet.is_closing());
    assert_eq!(calls.get(), 2);
    assert_eq!(h.sheets.open_count().get(), 1);

    allow.set(true);
    assert!(sheet.close(None));
    h.settle();
    assert_eq!(h.sheets.open_count().get(), 0);
}

#[test]
fn guard_error_denies_close() {
    let h = harness();
    let sheet = open(&h, config());
    sheet.set_before_close_guard(|| Err(GuardError::new("draft not saved")));
    assert!(!sheet.close(None));
    assert!(!sheet.is_closing());
    sheet.clear_before_close_guard();
    assert!(sheet.close(None));
}

#[test]
fn force_close_ignores_guard() {
    let h = harness();
    let sheet = open(&h, config());
    sheet.set_before_close_guard(|| Ok(false));
    let closed = record_closed(&sheet);
    assert!(sheet.force_close(Some("forced".to_owned())));
    h.settle();
    assert_eq!(*closed.borrow(), vec![Some("forced".to_owned())]);
}

#[test]
fn dismiss_all_respects_guards() {
    let h = harness();
    let a = open(&h, config());
    let b = open(&h, config());
    let c = open(&h, config());
    b.set_before_close_guard(|| Ok(false));
    h.sheets.dismiss_all();
    assert!(a.is_closing());
    assert!(!b.is_closing());
    assert!(c.is_closing());
    h.settle();
    let left: Vec<String> = h
        .sheets
        .open_bottom_sheets()
        .iter()
        .map(|s| s.id().to_owned())
        .collect();
    assert_eq!(left, vec![b.id().to_owned()]);
}

// ============================================================================
// Backdrop and keyboard
// ============================================================================

#[test]
fn backdrop_click_dismisses_only_topmost() {
    let h = harness();
    let lower = open(&h, config());
    let upper = open(&h, config());
    let overlays = h.host.created();

    overlays[0].click_backdrop();
    assert!(!lower.is_closing());

    overlays[1].click_backdrop();
    assert!(upper.is_closing());
    h.settle();

    overlays[0].click_backdrop();
    assert!(lower.is_closing());
}

#[test]
fn escape_dismisses_topmost() {
    let h = harness();
    let lower = open(&h, config());
    let upper = open(&h, config());
    let overlays = h.host.created();

    overlays[1].press_key(Key::Enter);
    assert!(!upper.is_closing());
    overlays[0].press_key(Key::Escape);
    assert!(!lower.is_closing());
    overlays[1].press_key(Key::from_dom("Escape"));
    assert!(upper.is_closing());
}

#[test]
fn disable_close_ignores_backdrop_and_escape() {
    let h = harness();
    let sheet = open(&h, config().disable_close(true));
    let overlay = h.host.last().unwrap();
    overlay.click_backdrop();
    overlay.press_key(Key::Escape);
    assert!(!sheet.is_closing());
    assert!(sheet.close(None));
}

// ============================================================================
// Focus and scroll
// ============================================================================

#[test]
fn body_scroll_locked_while_any_sheet_open() {
    let h = harness();
    let body = h.document.body_element();
    body.set_style("overflow", "scroll");

    let a = open(&h, config());
    assert_eq!(body.style("overflow").as_deref(), Some("hidden"));
    let b = open(&h, config());
    a.close(None);
    h.settle();
    assert_eq!(body.style("overflow").as_deref(), Some("hidden"));
    b.close(None);
    h.settle();
    assert_eq!(body.style("overflow").as_deref(), Some("scroll"));
    assert!(!h.a11y.is_scroll_locked());
}

#[test]
fn focus_moves_in_and_returns_on_close() {
    let h = harness();
    let trigger = NodeId(9_000);
    assert!(h.document.focus(trigger));

    let sheet = open(&h, config());
    let surface = h.host.last().unwrap().surface_element();
    assert_eq!(h.document.focused(), Some(surface.id()));
    assert_eq!(h.traps.active(), 1);

    sheet.close(None);
    h.settle();
    assert_eq!(h.traps.active(), 0);
    assert_eq!(h.document.focused(), Some(trigger));
}

#[test]
fn focus_trap_can_be_disabled() {
    let h = harness();
    open(&h, config().focus_trap(false));
    assert_eq!(h.traps.created(), 0);
    assert_eq!(h.document.focused(), None);
}

#[test]
fn focus_not_restored_to_removed_node() {
    let h = harness();
    let trigger = NodeId(9_001);
    assert!(h.document.focus(trigger));
    let sheet = open(&h, config().animation(false));
    h.document.detach_node(trigger);
    sheet.close(None);
    let surface = h.host.last().unwrap().surface_element();
    assert_eq!(h.document.focused(), Some(surface.id()));
}
