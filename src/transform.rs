use crate::geometry::Rect;

/// A 2D affine transform restricted to axis scale and translation.
///
/// This is the subset of CSS transforms the inverse-transform animator
/// writes: `translate(..) scale(..)`. The matrix is
///
/// ```text
/// | scale_x  0        translate_x |
/// | 0        scale_y  translate_y |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform2D {
    /// Identity (no transformation)
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
            ..Self::IDENTITY
        }
    }

    /// Compose this transform with another: self * other
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform2D) -> Transform2D {
        Transform2D {
            scale_x: self.scale_x * other.scale_x,
            scale_y: self.scale_y * other.scale_y,
            translate_x: self.scale_x * other.translate_x + self.translate_x,
            translate_y: self.scale_y * other.translate_y + self.translate_y,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.scale_x * x + self.translate_x,
            self.scale_y * y + self.translate_y,
        )
    }

    /// Map a layout box through this transform around `origin`, the way a
    /// browser computes the bounding box of a transformed element.
    pub fn map_rect(&self, rect: Rect, origin: (f64, f64)) -> Rect {
        let (ox, oy) = origin;
        let (x0, y0) = self.transform_point(rect.left - ox, rect.top - oy);
        let (x1, y1) = self.transform_point(rect.right() - ox, rect.bottom() - oy);
        Rect::from_corners(x0 + ox, y0 + oy, x1 + ox, y1 + oy)
    }

    /// CSS text for this transform, always in the
    /// `translate(xpx,ypx) scale(sx,sy)` form
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px,{}px) {}",
            css_number(self.translate_x),
            css_number(self.translate_y),
            scale_css(self.scale_x, self.scale_y)
        )
    }

    /// Parse the `translate`/`scale` subset of CSS transform text.
    ///
    /// Empty text and `none` are the identity. Returns `None` for any other
    /// function or a malformed argument list.
    pub fn parse_css(text: &str) -> Option<Transform2D> {
        let text = text.trim();
        if text.is_empty() || text == "none" {
            return Some(Self::IDENTITY);
        }

        let mut result = Self::IDENTITY;
        let mut rest = text;
        while !rest.is_empty() {
            let open = rest.find('(')?;
            let close = rest.find(')')?;
            if close < open {
                return None;
            }
            let name = rest[..open].trim();
            let args: Vec<f64> = rest[open + 1..close]
                .split(',')
                .map(parse_length)
                .collect::<Option<_>>()?;

            let op = match (name, args.as_slice()) {
                ("translate", [x]) => Self::translate(*x, 0.0),
                ("translate", [x, y]) => Self::translate(*x, *y),
                ("translateX", [x]) => Self::translate(*x, 0.0),
                ("translateY", [y]) => Self::translate(0.0, *y),
                ("scale", [s]) => Self::scale(*s, *s),
                ("scale", [sx, sy]) => Self::scale(*sx, *sy),
                ("scaleX", [sx]) => Self::scale(*sx, 1.0),
                ("scaleY", [sy]) => Self::scale(1.0, *sy),
                _ => return None,
            };
            // CSS applies the rightmost function first
            result = result.then(&op);
            rest = rest[close + 1..].trim_start();
        }
        Some(result)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `scale(sx,sy)` text
pub fn scale_css(sx: f64, sy: f64) -> String {
    format!("scale({},{})", css_number(sx), css_number(sy))
}

/// Format a number the way script engines stringify them, so non-finite
/// scale factors reach the style engine as `NaN`/`Infinity`.
pub fn css_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{}", value)
    }
}

fn parse_length(arg: &str) -> Option<f64> {
    let arg = arg.trim();
    let number = arg.strip_suffix("px").unwrap_or(arg);
    number.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity() {
        let t = Transform2D::default();
        assert_eq!(t, Transform2D::IDENTITY);
        assert_eq!(t.transform_point(3.0, 4.0), (3.0, 4.0));
    }

    #[test]
    fn test_then_applies_other_first() {
        let t = Transform2D::translate(10.0, 0.0).then(&Transform2D::scale(2.0, 2.0));
        let (x, y) = t.transform_point(1.0, 1.0);
        assert!(approx_eq(x, 12.0));
        assert!(approx_eq(y, 2.0));
    }

    #[test]
    fn test_map_rect_scales_about_center() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let mapped = Transform2D::scale(0.5, 0.5).map_rect(rect, rect.center());
        assert!(approx_eq(mapped.left, 150.0));
        assert!(approx_eq(mapped.top, 125.0));
        assert!(approx_eq(mapped.width, 100.0));
        assert!(approx_eq(mapped.height, 50.0));
    }

    #[test]
    fn test_to_css() {
        assert_eq!(
            Transform2D::scale(0.5, 2.0).to_css(),
            "translate(0px,0px) scale(0.5,2)"
        );
        let t = Transform2D::translate(-10.0, 4.5).then(&Transform2D::scale(1.0, 1.0));
        assert_eq!(t.to_css(), "translate(-10px,4.5px) scale(1,1)");
    }

    #[test]
    fn test_css_number_non_finite() {
        assert_eq!(css_number(f64::NAN), "NaN");
        assert_eq!(css_number(1.0 / 0.0), "Infinity");
        assert_eq!(css_number(-1.0 / 0.0), "-Infinity");
        assert_eq!(css_number(0.25), "0.25");
    }

    #[test]
    fn test_parse_css() {
        assert_eq!(Transform2D::parse_css(""), Some(Transform2D::IDENTITY));
        assert_eq!(Transform2D::parse_css("none"), Some(Transform2D::IDENTITY));

        let t = Transform2D::parse_css("translate(10px,-5px) scale(2,3)").unwrap();
        assert_eq!(t.scale_x, 2.0);
        assert_eq!(t.scale_y, 3.0);
        assert_eq!(t.translate_x, 10.0);
        assert_eq!(t.translate_y, -5.0);

        assert_eq!(
            Transform2D::parse_css("scale(2)"),
            Some(Transform2D::scale(2.0, 2.0))
        );
    }

    #[test]
    fn test_parse_round_trips_to_css() {
        let t = Transform2D::translate(3.0, 7.0).then(&Transform2D::scale(0.25, 4.0));
        assert_eq!(Transform2D::parse_css(&t.to_css()), Some(t));
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        assert_eq!(Transform2D::parse_css("rotate(45deg)"), None);
        assert_eq!(Transform2D::parse_css("scale(1,2"), None);
    }

    #[test]
    fn test_parse_non_finite() {
        let t = Transform2D::parse_css("scale(NaN,Infinity)").unwrap();
        assert!(t.scale_x.is_nan());
        assert!(t.scale_y.is_infinite());
    }
}
