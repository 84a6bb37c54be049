#![forbid(unsafe_code)]

//! Bounding geometry in CSS pixels.

/// An axis-aligned box as reported by a host layout query.
///
/// Coordinates follow the viewport convention: `top` grows downward from the
/// top edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Return a copy moved vertically by `dy`.
    #[must_use]
    pub fn translate_y(self, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            ..self
        }
    }

    /// Height of the part of this box that lies above `viewport_height`.
    ///
    /// For a sheet anchored to the bottom edge this is the visible height:
    /// everything between the sheet's top edge and the bottom of the viewport.
    pub fn visible_height_in(&self, viewport_height: f64) -> f64 {
        (viewport_height - self.top).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert!(!r.is_empty());
        assert!(Rect::default().is_empty());
    }

    #[test]
    fn translate_moves_top_only() {
        let r = Rect::new(0.0, 100.0, 50.0, 900.0).translate_y(300.0);
        assert_eq!(r.top, 400.0);
        assert_eq!(r.height, 900.0);
    }

    #[test]
    fn visible_height_clamps_at_zero() {
        let r = Rect::new(0.0, 400.0, 100.0, 900.0);
        assert_eq!(r.visible_height_in(1000.0), 600.0);
        assert_eq!(r.translate_y(800.0).visible_height_in(1000.0), 0.0);
    }

    mod property {
        use crate::geometry::Rect;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn visible_height_shrinks_as_box_moves_down(
                top in -500.0f64..2000.0,
                dy in 0.0f64..1000.0,
                viewport in 1.0f64..2000.0,
            ) {
                let r = Rect::new(0.0, top, 320.0, 900.0);
                let before = r.visible_height_in(viewport);
                let after = r.translate_y(dy).visible_height_in(viewport);
                prop_assert!(after >= 0.0);
                prop_assert!(after <= before);
            }
        }
    }
}
