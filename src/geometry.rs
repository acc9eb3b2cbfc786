//! Rectangles and geometry snapshots.
//!
//! A [`Snapshot`] is the "First" in FLIP: the position, size and a chosen set
//! of resolved style values of one element, captured before the caller
//! mutates the document.

use indexmap::IndexMap;

use crate::error::Result;
use crate::platform::Platform;

/// A viewport-relative box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Smallest rect containing both corner points
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let left = x0.min(x1);
        let top = y0.min(y1);
        Self {
            left,
            top,
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }
}

/// Geometry and selected computed styles of an element at one instant.
///
/// The geometry is fixed at construction. Only [`Snapshot::set_attribute`]
/// may add style values afterwards, before the snapshot is handed to an
/// animator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    attributes: Option<IndexMap<String, String>>,
}

impl Snapshot {
    /// Build a snapshot from raw geometry
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            attributes: None,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.left, rect.top, rect.width, rect.height)
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    /// Captured style values, if any were requested
    pub fn attributes(&self) -> Option<&IndexMap<String, String>> {
        self.attributes.as_ref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    /// Add or replace a style value to force at the start of a transition
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }
}

/// Capture an element's bounding box without any style values.
pub fn snapshot<P: Platform>(platform: &P, element: &P::Element) -> Result<Snapshot> {
    let rect = platform.bounding_rect(element)?;
    Ok(Snapshot::from_rect(rect))
}

/// Capture an element's bounding box plus the resolved value of each named
/// CSS property.
///
/// When the platform cannot read computed styles the attribute map is left
/// absent, matching a plain [`snapshot`].
pub fn snapshot_with<P: Platform>(
    platform: &P,
    element: &P::Element,
    attribute_names: &[&str],
) -> Result<Snapshot> {
    let attributes = if platform.supports_computed_style() {
        let mut values = IndexMap::new();
        for name in attribute_names {
            let value = platform.computed_style(element, name)?;
            values.insert((*name).to_string(), value);
        }
        Some(values)
    } else {
        None
    };

    let rect = platform.bounding_rect(element)?;
    log::trace!("snapshot {:?} with {:?}", rect, attributes);
    let mut snap = Snapshot::from_rect(rect);
    snap.attributes = attributes;
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.center(), (60.0, 45.0));
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let rect = Rect::from_corners(50.0, 40.0, 10.0, 0.0);
        assert_eq!(rect, Rect::new(10.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_set_attribute_creates_map() {
        let mut snap = Snapshot::new(0.0, 0.0, 10.0, 10.0);
        assert!(snap.attributes().is_none());

        snap.set_attribute("opacity", "0.5");
        assert_eq!(snap.attribute("opacity"), Some("0.5"));
        assert_eq!(snap.width(), 10.0);
    }

    #[test]
    fn test_snapshot_reads_rect() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(5.0, 6.0, 70.0, 80.0));

        let snap = snapshot(&platform, &el).unwrap();
        assert_eq!(snap.rect(), Rect::new(5.0, 6.0, 70.0, 80.0));
        assert!(snap.attributes().is_none());
    }

    #[test]
    fn test_snapshot_with_captures_computed_values() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(0.0, 0.0, 56.0, 56.0));
        platform.set_computed_style(el, "border-radius", "28px");

        let snap = snapshot_with(&platform, &el, &["border-radius", "opacity"]).unwrap();
        assert_eq!(snap.attribute("border-radius"), Some("28px"));
        assert_eq!(snap.attribute("opacity"), Some(""));
    }

    #[test]
    fn test_snapshot_with_keeps_requested_order() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(0.0, 0.0, 10.0, 10.0));

        let snap = snapshot_with(&platform, &el, &["opacity", "border-radius", "color"]).unwrap();
        let names: Vec<&str> = snap
            .attributes()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["opacity", "border-radius", "color"]);
    }

    #[test]
    fn test_snapshot_with_without_computed_style_support() {
        let platform = HeadlessPlatform::new();
        platform.set_computed_style_support(false);
        let el = platform.create_element(Rect::new(0.0, 0.0, 10.0, 10.0));

        let snap = snapshot_with(&platform, &el, &["opacity"]).unwrap();
        assert!(snap.attributes().is_none());
    }

    #[test]
    fn test_snapshot_is_pure() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(1.0, 2.0, 3.0, 4.0));
        platform.set_inline_style(&el, "transform", "scale(2,2)").unwrap();

        let first = snapshot(&platform, &el).unwrap();
        let second = snapshot(&platform, &el).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            platform.inline_style(&el, "transform").unwrap(),
            "scale(2,2)"
        );
    }

    #[test]
    fn test_snapshot_detached_element_fails() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::default());
        platform.detach(el);

        assert_eq!(
            snapshot(&platform, &el),
            Err(crate::error::TransitionError::DetachedElement)
        );
    }
}
