//! Named easing values.
//!
//! The engine never evaluates easing itself; the browser does. A [`Timing`]
//! is only rendered into `transition` and `animation` shorthand text.

use std::fmt;

/// CSS `<easing-function>` used for transitions and keyframe animations
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Timing {
    /// `ease` (the default)
    #[default]
    Ease,
    /// Constant speed
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Slow start and end, fast middle
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f64, f64, f64, f64),
    /// Any other easing text, passed through untouched
    Named(String),
}

impl Timing {
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Timing::CubicBezier(x1, y1, x2, y2)
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timing::Ease => write!(f, "ease"),
            Timing::Linear => write!(f, "linear"),
            Timing::EaseIn => write!(f, "ease-in"),
            Timing::EaseOut => write!(f, "ease-out"),
            Timing::EaseInOut => write!(f, "ease-in-out"),
            Timing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Timing::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Timing {
    fn from(text: &str) -> Self {
        match text.trim() {
            "" | "ease" => Timing::Ease,
            "linear" => Timing::Linear,
            "ease-in" => Timing::EaseIn,
            "ease-out" => Timing::EaseOut,
            "ease-in-out" => Timing::EaseInOut,
            other => Timing::Named(other.to_string()),
        }
    }
}

impl From<String> for Timing {
    fn from(text: String) -> Self {
        Timing::from(text.as_str())
    }
}
