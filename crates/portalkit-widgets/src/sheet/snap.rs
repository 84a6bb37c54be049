#![forbid(unsafe_code)]

//! Snap-point engine.
//!
//! A snap point is a resting height for a bottom sheet, measured as the
//! *visible height* above the bottom edge of the viewport. Callers declare
//! them as fractions, pixels, percentages or viewport units; the engine turns
//! them into pixels, sorts them, and picks a target when a drag ends.
//!
//! # Declarations
//!
//! | Declaration | Pixels |
//! |-------------|--------|
//! | `0.0..=1.0` | fraction of the container height |
//! | `> 1.0` | pixels |
//! | `"30%"` | percent of the container height |
//! | `"250px"` | pixels |
//! | `"40vh"` | percent of the viewport height |
//! | `"0.5"`, `"480"` | same rule as the numeric form |
//! | anything else | half the container height |
//!
//! # Invariants
//!
//! - [`parse_snap_points`] preserves length, returns values sorted ascending,
//!   and its `index` fields are a permutation of `0..n` pointing back into the
//!   caller's array.
//! - Every parsed value is finite and non-negative.

use std::fmt;

/// Snap points used when none are configured.
pub const DEFAULT_SNAP_POINTS: [f64; 2] = [0.5, 1.0];

/// Velocity (px/ms) at or above which a release counts as a fling.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.5;

/// Fraction of the viewport below which a released sheet is dismissed.
pub const DEFAULT_DISMISS_THRESHOLD: f64 = 0.3;

/// A snap point as declared by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SnapPoint {
    Number(f64),
    Text(String),
}

impl From<f64> for SnapPoint {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SnapPoint {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SnapPoint {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Unit suffix of a textual snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapUnit {
    /// No suffix: fraction when `<= 1`, pixels otherwise.
    Auto,
    Px,
    Percent,
    Vh,
}

/// Why a snap-point declaration was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapPointError {
    Empty,
    Negative(f64),
    Malformed(String),
    NonFinite,
}

impl fmt::Display for SnapPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty snap point"),
            Self::Negative(v) => write!(f, "negative snap point: {v}"),
            Self::Malformed(s) => write!(f, "malformed snap point {s:?}, expected <number>(px|%|vh)"),
            Self::NonFinite => f.write_str("snap point is not a finite number"),
        }
    }
}

impl std::error::Error for SnapPointError {}

impl SnapPoint {
    /// Strictly parse a textual declaration: `<digits>[.<digits>](px|%|vh)?`.
    pub fn parse_spec(text: &str) -> Result<(f64, SnapUnit), SnapPointError> {
        if text.is_empty() {
            return Err(SnapPointError::Empty);
        }
        let (number, unit) = if let Some(n) = text.strip_suffix("px") {
            (n, SnapUnit::Px)
        } else if let Some(n) = text.strip_suffix('%') {
            (n, SnapUnit::Percent)
        } else if let Some(n) = text.strip_suffix("vh") {
            (n, SnapUnit::Vh)
        } else {
            (text, SnapUnit::Auto)
        };
        let malformed = || SnapPointError::Malformed(text.to_owned());
        let (int, frac) = match number.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (number, ""),
        };
        if int.is_empty()
            || !int.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let value: f64 = number.parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(SnapPointError::NonFinite);
        }
        Ok((value, unit))
    }

    /// Check this declaration without converting it.
    pub fn validate(&self) -> Result<(), SnapPointError> {
        match self {
            Self::Number(n) if !n.is_finite() => Err(SnapPointError::NonFinite),
            Self::Number(n) if *n < 0.0 => Err(SnapPointError::Negative(*n)),
            Self::Number(_) => Ok(()),
            Self::Text(s) => Self::parse_spec(s).map(|_| ()),
        }
    }

    /// Convert to pixels. Never fails: unreadable declarations become half
    /// the container height, negative results clamp to zero.
    pub fn to_pixels(&self, container_height: f64, viewport_height: f64) -> f64 {
        let fraction_or_px = |v: f64| if v <= 1.0 { container_height * v } else { v };
        let px = match self {
            Self::Number(n) => fraction_or_px(*n),
            Self::Text(s) => {
                let lead = parse_float_prefix(s);
                let px = if s.ends_with('%') {
                    lead.map(|v| container_height * v / 100.0)
                } else if s.ends_with("px") {
                    lead
                } else if s.ends_with("vh") {
                    lead.map(|v| viewport_height * v / 100.0)
                } else {
                    lead.map(fraction_or_px)
                };
                px.unwrap_or(f64::NAN)
            }
        };
        if px.is_finite() {
            px.max(0.0)
        } else {
            tracing::warn!(point = %self, "unparseable snap point, using 50% of the container");
            container_height * 0.5
        }
    }
}

/// Leading decimal number of `s`, ignoring whatever follows it.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// A snap point converted to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSnapPoint {
    /// Visible height in pixels.
    pub value: f64,
    /// Position in the caller's declaration list.
    pub index: usize,
    pub original: SnapPoint,
}

/// Convert and sort `points` ascending by pixel value.
///
/// `vh` units resolve against `viewport_height`; everything else against
/// `container_height`.
pub fn parse_snap_points(
    points: &[SnapPoint],
    container_height: f64,
    viewport_height: f64,
) -> Vec<ParsedSnapPoint> {
    let mut parsed: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(index, point)| ParsedSnapPoint {
            value: point.to_pixels(container_height, viewport_height),
            index,
            original: point.clone(),
        })
        .collect();
    parsed.sort_by(|a, b| a.value.total_cmp(&b.value));
    parsed
}

/// Where a released sheet should settle. `None` means dismiss.
///
/// A fling at or above `velocity_threshold` moves one snap point in the
/// fling direction: down past the lowest point dismisses, up past the
/// highest clamps to it. Slower releases settle on the nearest point.
pub fn determine_target_snap_point(
    current_visible_height: f64,
    velocity: f64,
    points: &[ParsedSnapPoint],
    velocity_threshold: f64,
) -> Option<&ParsedSnapPoint> {
    let last = points.last()?;
    if velocity.abs() >= velocity_threshold {
        if velocity > 0.0 {
            return points
                .iter()
                .rev()
                .find(|p| p.value < current_visible_height);
        }
        return points
            .iter()
            .find(|p| p.value > current_visible_height)
            .or(Some(last));
    }
    let mut nearest = &points[0];
    let mut best = (current_visible_height - nearest.value).abs();
    for point in &points[1..] {
        let distance = (current_visible_height - point.value).abs();
        if distance < best {
            best = distance;
            nearest = point;
        }
    }
    Some(nearest)
}

/// `translateY` that leaves `point.value` pixels of a `sheet_height` sheet visible.
pub fn calculate_sheet_position(point: &ParsedSnapPoint, sheet_height: f64) -> f64 {
    (sheet_height - point.value).max(0.0)
}

/// The snap point declared at `original_index`, clamped into range.
pub fn initial_snap_point(points: &[ParsedSnapPoint], original_index: usize) -> Option<&ParsedSnapPoint> {
    let wanted = original_index.min(points.len().checked_sub(1)?);
    points
        .iter()
        .find(|p| p.index == wanted)
        .or_else(|| points.first())
}

/// The snap point at sorted position `position`.
pub fn snap_point_by_index(points: &[ParsedSnapPoint], position: usize) -> Option<&ParsedSnapPoint> {
    points.get(position)
}

/// `true` if every declaration is acceptable and the list is non-empty.
pub fn validate_snap_points(points: &[SnapPoint]) -> bool {
    !points.is_empty() && points.iter().all(|p| p.validate().is_ok())
}

/// `percentage` (clamped to `0..=1`) of `container_height`.
pub fn snap_point_at_percentage(percentage: f64, container_height: f64) -> f64 {
    container_height * percentage.clamp(0.0, 1.0)
}

/// Whether a sheet dragged down by `current_offset` pixels has passed the
/// dismiss threshold.
pub fn should_dismiss(current_offset: f64, container_height: f64, dismiss_threshold: f64) -> bool {
    current_offset >= container_height * dismiss_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values(points: &[ParsedSnapPoint]) -> Vec<f64> {
        points.iter().map(|p| p.value).collect()
    }

    fn pts(raw: &[f64]) -> Vec<ParsedSnapPoint> {
        let raw: Vec<SnapPoint> = raw.iter().copied().map(SnapPoint::from).collect();
        parse_snap_points(&raw, 1000.0, 1000.0)
    }

    #[test]
    fn parses_every_declaration_form() {
        assert_eq!(values(&pts(&[0.3, 0.6, 0.9])), vec![300.0, 600.0, 900.0]);
        assert_eq!(values(&pts(&[300.0, 600.0, 900.0])), vec![300.0, 600.0, 900.0]);
        let pct: Vec<SnapPoint> = ["30%", "60%", "90%"].into_iter().map(Into::into).collect();
        assert_eq!(values(&parse_snap_points(&pct, 1000.0, 1000.0)), vec![300.0, 600.0, 900.0]);
        let mixed = vec![SnapPoint::from(0.3), "60%".into(), "900px".into()];
        assert_eq!(values(&parse_snap_points(&mixed, 1000.0, 1000.0)), vec![300.0, 600.0, 900.0]);
    }

    #[test]
    fn vh_uses_viewport_not_container() {
        let points = vec![SnapPoint::from("50vh"), "50%".into()];
        let parsed = parse_snap_points(&points, 400.0, 1000.0);
        assert_eq!(values(&parsed), vec![200.0, 500.0]);
        assert_eq!(parsed[1].index, 0);
    }

    #[test]
    fn bare_numeric_strings_follow_numeric_rule() {
        let points = vec![SnapPoint::from("0.25"), "480".into()];
        assert_eq!(values(&parse_snap_points(&points, 1000.0, 1000.0)), vec![250.0, 480.0]);
    }

    #[test]
    fn unreadable_falls_back_to_half() {
        let parsed = parse_snap_points(&["invalid".into()], 1000.0, 1000.0);
        assert_eq!(values(&parsed), vec![500.0]);
        let parsed = parse_snap_points(&["abc%".into(), f64::NAN.into()], 1000.0, 1000.0);
        assert_eq!(values(&parsed), vec![500.0, 500.0]);
    }

    #[test]
    fn lenient_parse_reads_leading_number() {
        assert_eq!(parse_float_prefix("12.5abc"), Some(12.5));
        assert_eq!(parse_float_prefix("  -3px"), Some(-3.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1e2vh"), Some(100.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("px"), None);
    }

    #[test]
    fn negative_results_clamp_to_zero() {
        assert_eq!(SnapPoint::from(-0.5).to_pixels(1000.0, 1000.0), 0.0);
        assert_eq!(SnapPoint::from("-20px").to_pixels(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn index_tracks_original_position() {
        let parsed = pts(&[0.9, 0.3, 0.6]);
        let idx: Vec<_> = parsed.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![1, 2, 0]);
    }

    #[test]
    fn fling_targets() {
        let points = pts(&[300.0, 600.0, 900.0]);
        let target = |h, v| determine_target_snap_point(h, v, &points, 0.5).map(|p| p.value);
        assert_eq!(target(600.0, 0.8), Some(300.0));
        assert_eq!(target(600.0, -0.8), Some(900.0));
        assert_eq!(target(300.0, 0.8), None);
        assert_eq!(target(950.0, -0.8), Some(900.0));
        assert_eq!(target(550.0, 0.3), Some(600.0));
        assert_eq!(target(600.0, 0.5), Some(300.0));
    }

    #[test]
    fn nearest_tie_prefers_lower() {
        let points = pts(&[300.0, 600.0]);
        assert_eq!(
            determine_target_snap_point(450.0, 0.0, &points, 0.5).map(|p| p.value),
            Some(300.0)
        );
    }

    #[test]
    fn empty_points_mean_dismiss() {
        assert!(determine_target_snap_point(100.0, 0.0, &[], 0.5).is_none());
        assert!(initial_snap_point(&[], 0).is_none());
    }

    #[test]
    fn sheet_position_clamps_at_fully_shown() {
        let point = ParsedSnapPoint {
            value: 600.0,
            index: 0,
            original: 600.0.into(),
        };
        assert_eq!(calculate_sheet_position(&point, 800.0), 200.0);
        assert_eq!(calculate_sheet_position(&point, 400.0), 0.0);
    }

    #[test]
    fn initial_snap_point_clamps_and_uses_original_index() {
        let points = pts(&[0.9, 0.3, 0.6]);
        assert_eq!(initial_snap_point(&points, 0).map(|p| p.value), Some(900.0));
        assert_eq!(initial_snap_point(&points, 1).map(|p| p.value), Some(300.0));
        assert_eq!(initial_snap_point(&points, 99).map(|p| p.value), Some(600.0));
    }

    #[test]
    fn by_index_is_bounds_checked() {
        let points = pts(&[0.3, 0.6]);
        assert_eq!(snap_point_by_index(&points, 1).map(|p| p.value), Some(600.0));
        assert!(snap_point_by_index(&points, 2).is_none());
    }

    #[test]
    fn validation() {
        assert!(validate_snap_points(&[0.5.into(), "50%".into(), "200px".into(), "40vh".into(), "1.".into()]));
        assert!(!validate_snap_points(&[]));
        assert!(!validate_snap_points(&[(-1.0).into()]));
        assert!(!validate_snap_points(&["50 %".into()]));
        assert!(!validate_snap_points(&["-5px".into()]));
        assert!(!validate_snap_points(&[".5".into()]));
        assert!(!validate_snap_points(&[f64::INFINITY.into()]));
    }

    #[test]
    fn parse_spec_reports_details() {
        assert_eq!(SnapPoint::parse_spec("40vh"), Ok((40.0, SnapUnit::Vh)));
        assert_eq!(SnapPoint::parse_spec("12.5"), Ok((12.5, SnapUnit::Auto)));
        assert_eq!(SnapPoint::parse_spec(""), Err(SnapPointError::Empty));
        assert_eq!(
            SnapPoint::parse_spec("half"),
            Err(SnapPointError::Malformed("half".into()))
        );
        assert_eq!(SnapPoint::from(-2.0).validate(), Err(SnapPointError::Negative(-2.0)));
        assert!(SnapPointError::Empty.to_string().contains("empty"));
    }

    #[test]
    fn percentage_and_dismiss_helpers() {
        assert_eq!(snap_point_at_percentage(0.5, 800.0), 400.0);
        assert_eq!(snap_point_at_percentage(1.7, 800.0), 800.0);
        assert_eq!(snap_point_at_percentage(-1.0, 800.0), 0.0);
        assert!(should_dismiss(300.0, 1000.0, 0.3));
        assert!(!should_dismiss(299.0, 1000.0, 0.3));
    }

    fn snap_point_strategy() -> impl Strategy<Value = SnapPoint> {
        prop_oneof![
            (-10.0f64..2000.0).prop_map(SnapPoint::Number),
            (0u32..200).prop_map(|n| SnapPoint::Text(format!("{n}%"))),
            (0u32..2000).prop_map(|n| SnapPoint::Text(format!("{n}px"))),
            (0u32..100).prop_map(|n| SnapPoint::Text(format!("{n}vh"))),
            "[a-z]{0,6}".prop_map(SnapPoint::Text),
        ]
    }

    proptest! {
        #[test]
        fn parse_preserves_length_order_and_provenance(
            raw in proptest::collection::vec(snap_point_strategy(), 0..12),
            container in 1.0f64..3000.0,
            viewport in 1.0f64..3000.0,
        ) {
            let parsed = parse_snap_points(&raw, container, viewport);
            prop_assert_eq!(parsed.len(), raw.len());
            prop_assert!(parsed.windows(2).all(|w| w[0].value <= w[1].value));
            prop_assert!(parsed.iter().all(|p| p.value.is_finite() && p.value >= 0.0));
            let mut idx: Vec<_> = parsed.iter().map(|p| p.index).collect();
            idx.sort_unstable();
            prop_assert_eq!(idx, (0..raw.len()).collect::<Vec<_>>());
            for p in &parsed {
                prop_assert_eq!(&p.original, &raw[p.index]);
            }
        }

        #[test]
        fn target_is_always_a_member(
            raw in proptest::collection::vec(0.0f64..2000.0, 1..8),
            height in 0.0f64..2000.0,
            velocity in -3.0f64..3.0,
        ) {
            let points = pts(&raw);
            if let Some(target) = determine_target_snap_point(height, velocity, &points, 0.5) {
                prop_assert!(points.contains(target));
            } else {
                prop_assert!(velocity >= 0.5);
                prop_assert!(points[0].value >= height);
            }
        }
    }
}
