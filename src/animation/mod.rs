mod flip;
mod keyframes;
mod scroll;
mod timing;

pub use flip::{inverse_scale, AspectRatio, FlipOptions, Source};
pub use keyframes::{FrameSelector, KeyframeEntry, KeyframeOptions, Keyframes};
pub use scroll::{Align, ScrollOptions, ScrollSession, ScrollTarget};
pub use timing::Timing;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::Result;
use crate::geometry::{self, Snapshot};
use crate::platform::Platform;
use crate::transform::css_number;

use scroll::ScrollState;

/// Engine-wide tuning shared by every animation an [`Animator`] starts
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorConfig {
    /// Timer used to let the forced "before" state paint when the platform
    /// has no animation frames
    pub settle_delay_ms: f64,
    /// Frame period used for the scroll loop when the platform has no
    /// animation frames
    pub frame_fallback_ms: f64,
    /// Scroll duration when neither a duration nor a rate is given
    pub default_scroll_duration_ms: f64,
    /// Prefix of generated `@keyframes` names
    pub rule_prefix: String,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 18.0,
            frame_fallback_ms: 16.0,
            default_scroll_duration_ms: 500.0,
            rule_prefix: "___".to_string(),
        }
    }
}

/// The transition engine.
///
/// Owns a platform handle, the set of `@keyframes` names currently in use
/// and the single scroll session. Clones share all of it.
///
/// Concurrent `from`/`animate` calls on the same element race on the inline
/// values they stash and restore; the last restore wins.
pub struct Animator<P: Platform> {
    platform: P,
    config: AnimatorConfig,
    active_rules: Rc<RefCell<HashSet<String>>>,
    scroll: Rc<RefCell<ScrollState<P::Element>>>,
}

impl<P: Platform> Animator<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, AnimatorConfig::default())
    }

    pub fn with_config(platform: P, config: AnimatorConfig) -> Self {
        Self {
            platform,
            config,
            active_rules: Rc::new(RefCell::new(HashSet::new())),
            scroll: Rc::new(RefCell::new(ScrollState::default())),
        }
    }

    pub fn settle_delay(mut self, ms: f64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn frame_fallback(mut self, ms: f64) -> Self {
        self.config.frame_fallback_ms = ms;
        self
    }

    pub fn default_scroll_duration(mut self, ms: f64) -> Self {
        self.config.default_scroll_duration_ms = ms;
        self
    }

    pub fn rule_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.rule_prefix = prefix.into();
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Capture an element's bounding box. See [`geometry::snapshot`].
    pub fn snapshot(&self, element: &P::Element) -> Result<Snapshot> {
        geometry::snapshot(&self.platform, element)
    }

    /// Capture an element's bounding box and the named computed styles.
    /// See [`geometry::snapshot_with`].
    pub fn snapshot_with(&self, element: &P::Element, attributes: &[&str]) -> Result<Snapshot> {
        geometry::snapshot_with(&self.platform, element, attributes)
    }
}

impl<P: Platform> Clone for Animator<P> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform.clone(),
            config: self.config.clone(),
            active_rules: self.active_rules.clone(),
            scroll: self.scroll.clone(),
        }
    }
}

/// Milliseconds as CSS seconds text (`500.0` -> `0.5s`)
pub(crate) fn seconds(ms: f64) -> String {
    format!("{}s", css_number(ms / 1000.0))
}

/// `<name> <duration> <timing> <delay>`, the shape shared by one
/// `transition` entry and the `animation` shorthand
pub(crate) fn timed(name: &str, duration_ms: f64, timing: &Timing, delay_ms: f64) -> String {
    format!(
        "{} {} {} {}",
        name,
        seconds(duration_ms),
        timing,
        seconds(delay_ms)
    )
}
