#![forbid(unsafe_code)]

//! Visual states of a sheet and the CSS classes that express them.
//!
//! The animation coordinator reasons in [`SheetClasses`] flag sets; the
//! mapping to class names happens only at the node boundary. Surface and
//! backdrop use different class prefixes so stylesheets can target them
//! independently.

use bitflags::bitflags;

use crate::dom::SurfaceElement;

/// CSS custom property carrying the animation duration.
///
/// Set on both surface and backdrop so the two halves animate in lockstep.
pub const ANIMATION_DURATION_VAR: &str = "--bottom-sheet-animation-duration";

bitflags! {
    /// Visual states a sheet surface or backdrop can be in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SheetClasses: u8 {
        const OPENING  = 1 << 0;
        const OPENED   = 1 << 1;
        const CLOSING  = 1 << 2;
        const CLOSED   = 1 << 3;
        const SNAPPING = 1 << 4;
        const DRAGGING = 1 << 5;
    }
}

const SURFACE_CLASSES: [(SheetClasses, &str); 6] = [
    (SheetClasses::OPENING, "bottom-sheet-opening"),
    (SheetClasses::OPENED, "bottom-sheet-opened"),
    (SheetClasses::CLOSING, "bottom-sheet-closing"),
    (SheetClasses::CLOSED, "bottom-sheet-closed"),
    (SheetClasses::SNAPPING, "bottom-sheet-snapping"),
    (SheetClasses::DRAGGING, "bottom-sheet-dragging"),
];

const BACKDROP_CLASSES: [(SheetClasses, &str); 4] = [
    (SheetClasses::OPENING, "bottom-sheet-backdrop-opening"),
    (SheetClasses::OPENED, "bottom-sheet-backdrop-opened"),
    (SheetClasses::CLOSING, "bottom-sheet-backdrop-closing"),
    (SheetClasses::CLOSED, "bottom-sheet-backdrop-closed"),
];

/// Which half of an overlay a class applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePart {
    Surface,
    Backdrop,
}

impl SheetClasses {
    /// States a backdrop can express. Snapping and dragging are surface-only.
    pub const BACKDROP_STATES: Self = Self::OPENING
        .union(Self::OPENED)
        .union(Self::CLOSING)
        .union(Self::CLOSED);

    /// CSS class name for a single flag on `part`.
    ///
    /// Returns `None` for multi-bit values and for states the part cannot
    /// express.
    pub fn class_name(self, part: SurfacePart) -> Option<&'static str> {
        let table: &[(Self, &'static str)] = match part {
            SurfacePart::Surface => &SURFACE_CLASSES,
            SurfacePart::Backdrop => &BACKDROP_CLASSES,
        };
        table
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, name)| *name)
    }

    /// Class names for every flag in `self` that `part` can express.
    pub fn class_names(self, part: SurfacePart) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(move |flag| flag.class_name(part))
    }

    /// Add the classes for `self` to `element`.
    pub fn apply_to(self, element: &dyn SurfaceElement, part: SurfacePart) {
        for name in self.class_names(part) {
            element.add_class(name);
        }
    }

    /// Remove the classes for `self` from `element`.
    pub fn strip_from(self, element: &dyn SurfaceElement, part: SurfacePart) {
        for name in self.class_names(part) {
            element.remove_class(name);
        }
    }

    /// Read back which states `element` currently shows.
    pub fn read_from(element: &dyn SurfaceElement, part: SurfacePart) -> Self {
        Self::all()
            .iter()
            .filter(|flag| {
                flag.class_name(part)
                    .is_some_and(|name| element.has_class(name))
            })
            .fold(Self::empty(), |acc, flag| acc | flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_names_cover_every_state() {
        for flag in SheetClasses::all().iter() {
            assert!(flag.class_name(SurfacePart::Surface).is_some());
        }
    }

    #[test]
    fn backdrop_has_no_drag_states() {
        assert_eq!(SheetClasses::DRAGGING.class_name(SurfacePart::Backdrop), None);
        assert_eq!(SheetClasses::SNAPPING.class_name(SurfacePart::Backdrop), None);
        let names: Vec<_> = SheetClasses::all()
            .class_names(SurfacePart::Backdrop)
            .collect();
        assert_eq!(names.len(), 4);
        assert!(SheetClasses::BACKDROP_STATES.contains(SheetClasses::CLOSED));
    }

    #[test]
    fn combined_flags_have_no_single_name() {
        let both = SheetClasses::OPENING | SheetClasses::OPENED;
        assert_eq!(both.class_name(SurfacePart::Surface), None);
        assert_eq!(both.class_names(SurfacePart::Surface).count(), 2);
    }
}
