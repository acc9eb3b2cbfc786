//! Inverse-transform (FLIP) transitions.
//!
//! The element is already in its final layout. We scale and translate it
//! back onto the snapshot's box, let that state paint, then restore the
//! original transform under a CSS transition so the browser animates the
//! element into place.

use std::cell::RefCell;
use std::rc::Rc;

use super::{timed, Animator, Timing};
use crate::callbacks::CallbackChain;
use crate::error::Result;
use crate::geometry::{Rect, Snapshot};
use crate::platform::{after_next_paint, Platform};
use crate::transform::{scale_css, Transform2D};

/// Which axis keeps its scale when the two are forced equal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// Use the width ratio for both axes
    Width,
    /// Use the height ratio for both axes
    Height,
    /// Do not scale at all, only translate
    None,
}

/// Options for [`Animator::from`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlipOptions {
    pub aspect_ratio: Option<AspectRatio>,
    pub timing: Timing,
    pub delay_ms: f64,
}

impl FlipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn timing(mut self, timing: impl Into<Timing>) -> Self {
        self.timing = timing.into();
        self
    }

    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Where a FLIP transition starts from.
///
/// An element source is snapshotted when the transition starts, so it has to
/// still be at the "before" position at that moment.
#[derive(Debug, Clone, PartialEq)]
pub enum Source<E> {
    Snapshot(Snapshot),
    Element(E),
}

impl<E> Source<E> {
    pub fn element(element: E) -> Self {
        Source::Element(element)
    }
}

impl<E> From<Snapshot> for Source<E> {
    fn from(snapshot: Snapshot) -> Self {
        Source::Snapshot(snapshot)
    }
}

impl<E> From<&Snapshot> for Source<E> {
    fn from(snapshot: &Snapshot) -> Self {
        Source::Snapshot(snapshot.clone())
    }
}

/// Scale factors that shrink or grow `after` onto `before`.
///
/// A zero-sized `after` box yields non-finite factors; they are returned
/// as they are.
pub fn inverse_scale(before: Rect, after: Rect, aspect_ratio: Option<AspectRatio>) -> (f64, f64) {
    let scale_w = before.width / after.width;
    let scale_h = before.height / after.height;
    match aspect_ratio {
        Some(AspectRatio::Width) => (scale_w, scale_w),
        Some(AspectRatio::Height) => (scale_h, scale_h),
        Some(AspectRatio::None) => (1.0, 1.0),
        None => (scale_w, scale_h),
    }
}

impl<P: Platform> Animator<P> {
    /// Animate `element` from the geometry (and forced style values) of
    /// `source` to where it is now.
    ///
    /// Everything up to applying the inverted transform happens before this
    /// returns. The returned chain completes `duration_ms + delay` after the
    /// call, once the original `transition` value is back in place.
    pub fn from(
        &self,
        element: &P::Element,
        source: impl Into<Source<P::Element>>,
        duration_ms: f64,
        options: &FlipOptions,
    ) -> Result<CallbackChain> {
        let source = match source.into() {
            Source::Snapshot(snapshot) => snapshot,
            Source::Element(other) => self.snapshot(&other)?,
        };
        let platform = &self.platform;

        let prev_transition = platform.inline_style(element, "transition")?;
        platform.set_inline_style(element, "transition", "none")?;
        let prev_transform = platform.inline_style(element, "transform")?;
        platform.set_inline_style(element, "transform", "none")?;

        let after = platform.bounding_rect(element)?;
        let (scale_w, scale_h) = inverse_scale(source.rect(), after, options.aspect_ratio);

        // Scaling happens around the transform origin, so the box moves;
        // measure it again before computing the translation.
        platform.set_inline_style(element, "transform", &scale_css(scale_w, scale_h))?;
        let scaled = platform.bounding_rect(element)?;
        let inverted = Transform2D::translate(source.left() - scaled.left, source.top() - scaled.top)
            .then(&Transform2D::scale(scale_w, scale_h))
            .to_css();
        platform.set_inline_style(element, "transform", &inverted)?;

        let mut forced = Vec::new();
        if let Some(attributes) = source.attributes() {
            for (property, value) in attributes {
                let prev = platform.inline_style(element, property)?;
                platform.set_inline_style(element, property, value)?;
                forced.push((property.clone(), prev));
            }
        }

        log::debug!(
            "flip: {:?} -> {:?}, {} over {}ms",
            after,
            source.rect(),
            inverted,
            duration_ms
        );

        let transition = std::iter::once("transform")
            .chain(forced.iter().map(|(property, _)| property.as_str()))
            .map(|property| timed(property, duration_ms, &options.timing, options.delay_ms))
            .collect::<Vec<_>>()
            .join(", ");

        // Taken by whichever runs first: the settle step or completion.
        let pending = Rc::new(RefCell::new(Some(Release {
            transition,
            transform: prev_transform,
            forced,
        })));

        let settle_platform = platform.clone();
        let settle_element = element.clone();
        let settle_pending = pending.clone();
        after_next_paint(
            platform,
            self.config.settle_delay_ms,
            Box::new(move || {
                let Some(release) = settle_pending.borrow_mut().take() else {
                    return;
                };
                if let Err(err) = release.apply(&settle_platform, &settle_element) {
                    log::warn!("flip: could not release inverted state: {}", err);
                }
            }),
        )?;

        let chain = CallbackChain::new();
        let done = chain.clone();
        let done_platform = platform.clone();
        let done_element = element.clone();
        platform.set_timeout(
            duration_ms + options.delay_ms,
            Box::new(move || {
                // Finished before the inverted state was released
                let unreleased = pending.borrow_mut().take();
                if let Some(release) = unreleased {
                    log::debug!("flip: completed before settle, releasing now");
                    if let Err(err) = release.apply(&done_platform, &done_element) {
                        log::warn!("flip: could not release inverted state: {}", err);
                    }
                }
                if let Err(err) =
                    done_platform.set_inline_style(&done_element, "transition", &prev_transition)
                {
                    log::warn!("flip: could not restore transition: {}", err);
                }
                done.done();
            }),
        )?;

        Ok(chain)
    }
}

/// The transition to install and the stashed values to put back once the
/// inverted state has painted
struct Release {
    transition: String,
    transform: String,
    forced: Vec<(String, String)>,
}

impl Release {
    /// Install the transition and restore the transform and forced style
    /// values in one batch.
    fn apply<P: Platform>(&self, platform: &P, element: &P::Element) -> Result<()> {
        platform.set_inline_style(element, "transition", &self.transition)?;
        platform.set_inline_style(element, "transform", &self.transform)?;
        for (property, prev) in self.forced.iter().rev() {
            platform.set_inline_style(element, property, prev)?;
        }
        Ok(())
    }
}
