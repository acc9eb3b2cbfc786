use crate::geometry::Rect;

/// Horizontal anchor position for transform origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HorizontalAnchor {
    /// Anchor at the left edge (0%)
    Left,
    /// Anchor at the center (50%)
    Center,
    /// Anchor at the right edge (100%)
    Right,
    /// Anchor at a percentage from the left (0-100)
    Percent(f64),
    /// Anchor at a fixed pixel offset from the left
    Px(f64),
}

/// Vertical anchor position for transform origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalAnchor {
    /// Anchor at the top edge (0%)
    Top,
    /// Anchor at the center (50%)
    Center,
    /// Anchor at the bottom edge (100%)
    Bottom,
    /// Anchor at a percentage from the top (0-100)
    Percent(f64),
    /// Anchor at a fixed pixel offset from the top
    Px(f64),
}

/// The pivot point for scale transforms, i.e. CSS `transform-origin`.
///
/// Browsers default to the center of the border box (50% 50%), which is why
/// the inverse-transform animator has to re-read the bounding box after
/// applying its scale: scaling about the center moves the box's top-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOrigin {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl TransformOrigin {
    /// Center of the element (50%, 50%) - the default
    pub const CENTER: Self = Self {
        horizontal: HorizontalAnchor::Center,
        vertical: VerticalAnchor::Center,
    };

    /// Top-left corner (0%, 0%)
    pub const TOP_LEFT: Self = Self {
        horizontal: HorizontalAnchor::Left,
        vertical: VerticalAnchor::Top,
    };

    pub fn new(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Resolve the origin to absolute coordinates within `bounds`.
    pub fn resolve(&self, bounds: Rect) -> (f64, f64) {
        let x = match self.horizontal {
            HorizontalAnchor::Left => bounds.left,
            HorizontalAnchor::Center => bounds.left + bounds.width / 2.0,
            HorizontalAnchor::Right => bounds.right(),
            HorizontalAnchor::Percent(p) => bounds.left + bounds.width * (p / 100.0),
            HorizontalAnchor::Px(px) => bounds.left + px,
        };

        let y = match self.vertical {
            VerticalAnchor::Top => bounds.top,
            VerticalAnchor::Center => bounds.top + bounds.height / 2.0,
            VerticalAnchor::Bottom => bounds.bottom(),
            VerticalAnchor::Percent(p) => bounds.top + bounds.height * (p / 100.0),
            VerticalAnchor::Px(px) => bounds.top + px,
        };

        (x, y)
    }

    /// Parse `transform-origin` text such as `left top`, `50% 50%` or
    /// `10px 20px`. Keywords may appear in either order. An empty value is
    /// the default center origin.
    pub fn parse_css(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let (first, second) = match parts.as_slice() {
            [] => return Some(Self::CENTER),
            [one] => (*one, "center"),
            [a, b] => (*a, *b),
            _ => return None,
        };

        // `top left` is as valid as `left top`
        let (h, v) = if matches!(first, "top" | "bottom") || matches!(second, "left" | "right") {
            (second, first)
        } else {
            (first, second)
        };

        let horizontal = match h {
            "left" => HorizontalAnchor::Left,
            "center" => HorizontalAnchor::Center,
            "right" => HorizontalAnchor::Right,
            other => match parse_offset(other)? {
                Offset::Percent(p) => HorizontalAnchor::Percent(p),
                Offset::Px(px) => HorizontalAnchor::Px(px),
            },
        };
        let vertical = match v {
            "top" => VerticalAnchor::Top,
            "center" => VerticalAnchor::Center,
            "bottom" => VerticalAnchor::Bottom,
            other => match parse_offset(other)? {
                Offset::Percent(p) => VerticalAnchor::Percent(p),
                Offset::Px(px) => VerticalAnchor::Px(px),
            },
        };

        Some(Self::new(horizontal, vertical))
    }
}

impl Default for TransformOrigin {
    fn default() -> Self {
        Self::CENTER
    }
}

enum Offset {
    Percent(f64),
    Px(f64),
}

fn parse_offset(text: &str) -> Option<Offset> {
    if let Some(p) = text.strip_suffix('%') {
        p.parse().ok().map(Offset::Percent)
    } else {
        let px = text.strip_suffix("px").unwrap_or(text);
        px.parse().ok().map(Offset::Px)
    }
}
