#![forbid(unsafe_code)]

//! Integration tests: placing, stacking and closing drop-downs.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use portalkit_core::dom::{StyleTarget, SurfaceElement};
use portalkit_core::event::Key;
use portalkit_harness::{FakeElement, PortalHarness};
use portalkit_widgets::{DropDownConfig, DropDownRef, OverlayHandle, PositionStrategy};

const DURATION: Duration = Duration::from_millis(200);

fn harness() -> PortalHarness {
    PortalHarness::new(1000.0, 240.0)
}

fn open(h: &PortalHarness, config: DropDownConfig) -> DropDownRef<(), u8> {
    h.dropdowns.open(config, None, |_| ())
}

#[test]
fn anchors_below_origin_with_offsets() {
    let h = harness();
    let button = FakeElement::new();
    let dropdown: DropDownRef<(), u8> = h.dropdowns.open(
        DropDownConfig::<()>::new().offset(4.0, 8.0),
        Some(&*button as &dyn SurfaceElement),
        |_| (),
    );
    let overlay = h.host.last().unwrap();
    let surface = overlay.surface_element();

    assert!(dropdown.id().starts_with("drop-down-"));
    assert_eq!(
        overlay.config().position,
        PositionStrategy::Anchored {
            origin: button.id(),
            offset_x: 4.0,
            offset_y: 8.0,
        }
    );
    assert_eq!(surface.attribute("role").as_deref(), Some("menu"));
    assert!(overlay.backdrop_element().unwrap().has_class("dropdown-backdrop"));
}

#[test]
fn offsets_without_origin_pin_to_viewport() {
    let h = harness();
    open(&h, DropDownConfig::new().x_offset(12.0));
    assert_eq!(
        h.host.last().unwrap().config().position,
        PositionStrategy::Offset { left: 12.0, top: 0.0 }
    );
    open(&h, DropDownConfig::new());
    assert_eq!(h.host.last().unwrap().config().position, PositionStrategy::Centered);
}

#[test]
fn opening_reveals_then_settles_on_opened() {
    let h = harness();
    open(&h, DropDownConfig::new());
    let surface = h.host.last().unwrap().surface_element();

    assert_eq!(surface.style("visibility").as_deref(), Some("visible"));
    assert_eq!(surface.style("opacity"), None);
    assert!(surface.has_class("dropdown-opening"));
    assert_eq!(
        surface.style("--dropdown-animation-duration").as_deref(),
        Some("200ms")
    );
    h.advance(DURATION);
    assert!(surface.has_class("dropdown-opened"));
    assert!(!surface.has_class("dropdown-opening"));
}

#[test]
fn disabled_animation_shows_fully_opaque() {
    let h = harness();
    let dropdown = open(&h, DropDownConfig::new().animation(false));
    let overlay = h.host.last().unwrap();
    let surface = overlay.surface_element();
    assert_eq!(surface.style("opacity").as_deref(), Some("1"));
    assert!(surface.has_class("dropdown-opened"));

    assert!(dropdown.close(Some(2)));
    assert!(overlay.is_disposed());
}

#[test]
fn click_outside_closes_topmost_only() {
    let h = harness();
    let first = open(&h, DropDownConfig::new());
    let second = open(&h, DropDownConfig::new());
    let overlays = h.host.created();

    overlays[0].click_backdrop();
    assert!(!first.is_closing());
    overlays[1].click_backdrop();
    assert!(second.is_closing());
    h.settle();
    assert_eq!(h.dropdowns.open_count().get(), 1);
    assert!(h.dropdowns.is_topmost(first.id()));
}

#[test]
fn auto_close_switches_are_honored() {
    let h = harness();
    let dropdown = open(
        &h,
        DropDownConfig::new()
            .auto_close_on_click_outside(false)
            .auto_close_on_escape(false),
    );
    let overlay = h.host.last().unwrap();
    overlay.click_backdrop();
    overlay.press_key(Key::Escape);
    assert!(!dropdown.is_closing());

    let escapable = open(&h, DropDownConfig::new().has_backdrop(false));
    h.host.last().unwrap().press_key(Key::Escape);
    assert!(escapable.is_closing());
}

#[test]
fn close_emits_result_once_after_transition() {
    let h = harness();
    let dropdown = open(&h, DropDownConfig::new());
    let results = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&results);
    dropdown
        .after_closed()
        .subscribe(move |r: &Option<u8>| sink.borrow_mut().push(*r))
        .detach();
    let surface = h.host.last().unwrap().surface_element();

    assert!(dropdown.close(Some(7)));
    assert!(!dropdown.close(Some(8)));
    assert!(surface.has_class("dropdown-closing"));
    h.advance(DURATION - Duration::from_millis(1));
    assert!(results.borrow().is_empty());
    h.advance(Duration::from_millis(1));
    assert_eq!(*results.borrow(), vec![Some(7)]);
    assert!(dropdown.after_closed().is_completed());
}

#[test]
fn scroll_lock_only_for_backdropped_dropdowns() {
    let h = harness();
    let plain = open(&h, DropDownConfig::new().has_backdrop(false));
    assert!(!h.a11y.is_scroll_locked());

    let dimmed = open(&h, DropDownConfig::new());
    assert!(h.a11y.is_scroll_locked());

    dimmed.close(None);
    h.settle();
    assert!(h.a11y.is_scroll_locked());
    plain.close(None);
    h.settle();
    assert!(!h.a11y.is_scroll_locked());
}

#[test]
fn close_all_empties_the_stack() {
    let h = harness();
    for _ in 0..3 {
        open(&h, DropDownConfig::new());
    }
    assert_eq!(h.dropdowns.open_dropdowns().len(), 3);
    h.dropdowns.close_all();
    h.settle();
    assert_eq!(h.dropdowns.open_count().get(), 0);
    assert_eq!(h.traps.active(), 0);
    assert!(h.host.created().iter().all(|o| o.is_disposed()));
}
