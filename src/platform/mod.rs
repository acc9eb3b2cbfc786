//! The host document boundary.
//!
//! Everything the engine knows about elements, styles, stylesheets, time and
//! scrolling goes through [`Platform`]. Two backends ship with the crate:
//! [`headless::HeadlessPlatform`] (an in-memory document with a virtual
//! clock) and, behind the `web` feature, `web::WebPlatform` on top of
//! `web-sys`.

pub mod headless;
#[cfg(feature = "web")]
pub mod web;

use crate::error::Result;
use crate::geometry::Rect;

/// Handle to a stylesheet fragment inserted by [`Platform::insert_stylesheet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StylesheetId(pub u64);

/// Callback run by [`Platform::set_timeout`]
pub type TimerCallback = Box<dyn FnOnce()>;

/// Callback run by [`Platform::request_animation_frame`] with the frame
/// timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// The element whose scroll offset a scroll animation drives.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScrollContainer<E> {
    /// The document viewport (window scrolling)
    #[default]
    Viewport,
    /// A scrollable element
    Element(E),
}

/// Host DOM/CSSOM access.
///
/// Implementations are cheap handles (`Clone`) so scheduled callbacks can
/// carry their own copy. All methods are called from a single thread.
pub trait Platform: Clone + 'static {
    type Element: Clone + 'static;

    /// Viewport-relative border box, including any applied transform
    fn bounding_rect(&self, element: &Self::Element) -> Result<Rect>;

    /// Whether [`Platform::computed_style`] can be used
    fn supports_computed_style(&self) -> bool {
        true
    }

    /// Resolved value of a CSS property
    fn computed_style(&self, element: &Self::Element, property: &str) -> Result<String>;

    /// Inline (`style` attribute) value of a CSS property, empty when unset
    fn inline_style(&self, element: &Self::Element, property: &str) -> Result<String>;

    /// Set an inline CSS property. An empty value removes it.
    fn set_inline_style(&self, element: &Self::Element, property: &str, value: &str)
        -> Result<()>;

    /// Insert a new stylesheet fragment containing `css`
    fn insert_stylesheet(&self, css: &str) -> Result<StylesheetId>;

    fn remove_stylesheet(&self, id: StylesheetId) -> Result<()>;

    /// Current time in milliseconds on the same clock as frame timestamps
    fn now(&self) -> f64;

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> Result<()>;

    /// Whether the host has a native animation-frame scheduler
    fn supports_animation_frame(&self) -> bool;

    fn request_animation_frame(&self, callback: FrameCallback) -> Result<()>;

    fn scroll_offset(&self, container: &ScrollContainer<Self::Element>) -> Result<f64>;

    /// Set the vertical scroll offset. The host may clamp it.
    fn set_scroll_offset(&self, container: &ScrollContainer<Self::Element>, offset: f64)
        -> Result<()>;

    /// Height of the visible part of the container
    fn visible_height(&self, container: &ScrollContainer<Self::Element>) -> Result<f64>;

    /// Full scrollable height of the container's content
    fn scroll_height(&self, container: &ScrollContainer<Self::Element>) -> Result<f64>;

    /// Viewport-relative top edge of the container (0 for the viewport)
    fn container_top(&self, container: &ScrollContainer<Self::Element>) -> Result<f64> {
        match container {
            ScrollContainer::Viewport => Ok(0.0),
            ScrollContainer::Element(element) => Ok(self.bounding_rect(element)?.top),
        }
    }
}

/// Schedule `callback` on the next animation frame, falling back to a
/// `fallback_ms` timer that reports [`Platform::now`] when the host has no
/// native frame scheduler.
pub(crate) fn schedule_frame<P: Platform>(
    platform: &P,
    fallback_ms: f64,
    callback: FrameCallback,
) -> Result<()> {
    if platform.supports_animation_frame() {
        platform.request_animation_frame(callback)
    } else {
        let clock = platform.clone();
        platform.set_timeout(fallback_ms, Box::new(move || callback(clock.now())))
    }
}

/// Schedule `callback` once the current style state has been painted.
///
/// With native frames this waits two frames: the first runs before the paint
/// of the forced state, the second after it. Without them a short timer
/// stands in.
pub(crate) fn after_next_paint<P: Platform>(
    platform: &P,
    settle_ms: f64,
    callback: TimerCallback,
) -> Result<()> {
    if platform.supports_animation_frame() {
        let inner = platform.clone();
        platform.request_animation_frame(Box::new(move |_| {
            if let Err(err) = inner.request_animation_frame(Box::new(move |_| callback())) {
                log::warn!("failed to schedule settle frame: {}", err);
            }
        }))
    } else {
        platform.set_timeout(settle_ms, callback)
    }
}
