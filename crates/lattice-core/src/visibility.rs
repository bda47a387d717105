//! Viewport geometry and visibility observation.
//!
//! Models the host's change-notification subscription: an observer holds a
//! list of elements and, on each evaluation, reports the ones whose visible
//! state flipped since the previous evaluation.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Index of an element in the laid-out page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Returns the overlap with `other`, or `None` when they are disjoint.
    ///
    /// Rectangles that only share an edge produce a zero-area overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grows (positive) or shrinks (negative) each edge by the margin.
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            (self.width + margin.left + margin.right).max(0.0),
            (self.height + margin.top + margin.bottom).max(0.0),
        )
    }
}

/// Per-edge adjustment applied to the viewport before intersecting.
///
/// Parsed from the CSS shorthand (`"0px 0px -50px 0px"`): one to four
/// pixel values in top, right, bottom, left order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub const NONE: RootMargin = RootMargin {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };
}

impl FromStr for RootMargin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                number
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .with_context(|| format!("Invalid root margin value '{part}'"))
            })
            .collect::<Result<Vec<f64>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => bail!("Root margin '{s}' must have 1 to 4 values"),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Fraction of `target`'s area that lies inside `root`.
///
/// A zero-area target counts as fully visible when it touches the root.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    let Some(overlap) = target.intersection(root) else {
        return 0.0;
    };
    let area = target.area();
    if area <= 0.0 {
        return 1.0;
    }
    (overlap.area() / area).clamp(0.0, 1.0)
}

/// Visibility predicate settings for one observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Minimum intersection ratio, in `[0, 1]`.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn is_visible(&self, ratio: f64) -> bool {
        ratio > 0.0 && ratio >= self.threshold
    }
}

/// One visibility change delivered by an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub target: ElementId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Debug)]
struct Observed {
    id: ElementId,
    last: Option<bool>,
}

/// Tracks a set of elements against one visibility predicate.
#[derive(Debug)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    observed: Vec<Observed>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: Vec::new(),
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Starts observing `id`. Observing the same element twice is a no-op.
    pub fn observe(&mut self, id: ElementId) {
        if self.observed.iter().any(|o| o.id == id) {
            return;
        }
        self.observed.push(Observed { id, last: None });
    }

    /// Evaluates all observed elements against `viewport`.
    ///
    /// Returns entries for elements whose visible state changed since the
    /// previous call, in observation order. The first call reports every
    /// element. Elements that `rect_of` cannot place are skipped.
    pub fn evaluate<F>(&mut self, viewport: &Rect, rect_of: F) -> Vec<VisibilityEntry>
    where
        F: Fn(ElementId) -> Option<Rect>,
    {
        let root = viewport.expand(&self.options.root_margin);
        let mut entries = Vec::new();
        for observed in &mut self.observed {
            let Some(rect) = rect_of(observed.id) else {
                continue;
            };
            let ratio = intersection_ratio(&rect, &root);
            let visible = self.options.is_visible(ratio);
            if observed.last != Some(visible) {
                observed.last = Some(visible);
                entries.push(VisibilityEntry {
                    target: observed.id,
                    ratio,
                    is_intersecting: visible,
                });
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal_options() -> ObserverOptions {
        ObserverOptions {
            threshold: 0.2,
            root_margin: "0px 0px -50px 0px".parse().unwrap(),
        }
    }

    #[test]
    fn test_root_margin_shorthand() {
        let one: RootMargin = "10px".parse().unwrap();
        assert_eq!(one.left, 10.0);
        assert_eq!(one.bottom, 10.0);

        let two: RootMargin = "5px 0".parse().unwrap();
        assert_eq!(two.top, 5.0);
        assert_eq!(two.right, 0.0);

        let four: RootMargin = "0px 0px -50px 0px".parse().unwrap();
        assert_eq!(four.bottom, -50.0);
        assert_eq!(four.top, 0.0);
    }

    #[test]
    fn test_root_margin_rejects_garbage() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("abc".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_intersection_ratio() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 50.0, 100.0, 100.0), &root), 0.5);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 200.0, 100.0, 10.0), &root), 0.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 10.0, 100.0, 10.0), &root), 1.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 100.0, 100.0, 0.0), &root), 1.0);
    }

    #[test]
    fn test_bottom_margin_shrinks_viewport() {
        // Element occupies y 900..1000 of a 1000px viewport; the shrunk
        // viewport ends at 950, so exactly half is visible.
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(ElementId(0));
        let viewport = Rect::new(0.0, 0.0, 800.0, 1000.0);
        let entries = observer.evaluate(&viewport, |_| Some(Rect::new(0.0, 900.0, 800.0, 100.0)));
        assert_eq!(entries.len(), 1);
        assert!((entries[0].ratio - 0.5).abs() < 1e-9);
        assert!(entries[0].is_intersecting);
    }

    #[test]
    fn test_below_threshold_is_not_visible() {
        // 40px of a 400px element inside the shrunk viewport: 10%.
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(ElementId(0));
        let viewport = Rect::new(0.0, 0.0, 800.0, 1000.0);
        let entries = observer.evaluate(&viewport, |_| Some(Rect::new(0.0, 910.0, 800.0, 400.0)));
        assert!(!entries[0].is_intersecting);
    }

    #[test]
    fn test_reports_only_changes() {
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(ElementId(0));
        observer.observe(ElementId(1));
        let rect_of = |id: ElementId| Some(Rect::new(0.0, id.0 as f64 * 1000.0, 800.0, 200.0));

        let first = observer.evaluate(&Rect::new(0.0, 0.0, 800.0, 600.0), rect_of);
        assert_eq!(first.len(), 2);
        assert!(first[0].is_intersecting);
        assert!(!first[1].is_intersecting);

        let same = observer.evaluate(&Rect::new(0.0, 10.0, 800.0, 600.0), rect_of);
        assert!(same.is_empty());

        let scrolled = observer.evaluate(&Rect::new(0.0, 800.0, 800.0, 600.0), rect_of);
        assert_eq!(scrolled.len(), 2);
        assert_eq!(scrolled[0].target, ElementId(0));
        assert!(!scrolled[0].is_intersecting);
        assert_eq!(scrolled[1].target, ElementId(1));
        assert!(scrolled[1].is_intersecting);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut observer = VisibilityObserver::new(reveal_options());
        observer.observe(ElementId(3));
        observer.observe(ElementId(3));
        let entries = observer.evaluate(&Rect::new(0.0, 0.0, 10.0, 10.0), |_| {
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        });
        assert_eq!(entries.len(), 1);
    }
}
