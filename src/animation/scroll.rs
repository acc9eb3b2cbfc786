//! Frame-driven scroll animation.
//!
//! One session per [`Animator`]. Starting a scroll while another is running
//! replaces the session in place: the frame already scheduled by the running
//! loop picks up the new start, target and duration, and no second loop is
//! started.

use std::cell::RefCell;
use std::rc::Rc;

use super::Animator;
use crate::error::Result;
use crate::platform::{schedule_frame, Platform, ScrollContainer};

/// Which edge of the target lines up with the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Target's top edge at the container's top edge
    #[default]
    Top,
    /// Target's bottom edge at the container's bottom edge
    Bottom,
}

/// Where a scroll animation ends
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScrollTarget<E> {
    /// The start or the end of the content, depending on [`Align`]
    #[default]
    Edge,
    /// An explicit scroll offset in pixels
    Offset(f64),
    /// Bring an element into line with the container
    Element(E),
}

impl<E> From<f64> for ScrollTarget<E> {
    fn from(offset: f64) -> Self {
        ScrollTarget::Offset(offset)
    }
}

/// Options for [`Animator::scroll`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOptions<E> {
    /// Fixed duration; wins over `per100`
    pub duration_ms: Option<f64>,
    /// Duration per 100px of distance
    pub per100: Option<f64>,
    pub container: ScrollContainer<E>,
    pub align: Align,
}

impl<E> Default for ScrollOptions<E> {
    fn default() -> Self {
        Self {
            duration_ms: None,
            per100: None,
            container: ScrollContainer::Viewport,
            align: Align::Top,
        }
    }
}

impl<E> ScrollOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn per100(mut self, ms: f64) -> Self {
        self.per100 = Some(ms);
        self
    }

    /// Scroll inside `element` instead of the viewport
    pub fn element(mut self, element: E) -> Self {
        self.container = ScrollContainer::Element(element);
        self
    }

    pub fn container(mut self, container: ScrollContainer<E>) -> Self {
        self.container = container;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// The live scroll interpolation
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSession<E> {
    pub container: ScrollContainer<E>,
    pub start_offset: f64,
    pub end_offset: f64,
    pub distance: f64,
    pub start_time: f64,
    pub duration_ms: f64,
    /// Offset read back after the previous frame
    pub last_applied: Option<f64>,
}

pub(crate) struct ScrollState<E> {
    session: Option<ScrollSession<E>>,
    /// A frame callback is pending
    looping: bool,
}

impl<E> Default for ScrollState<E> {
    fn default() -> Self {
        Self {
            session: None,
            looping: false,
        }
    }
}

type SharedScroll<E> = Rc<RefCell<ScrollState<E>>>;

impl<P: Platform> Animator<P> {
    /// Animate the container's scroll offset towards `target`.
    ///
    /// Does nothing when the target is the current offset.
    pub fn scroll(
        &self,
        target: impl Into<ScrollTarget<P::Element>>,
        options: ScrollOptions<P::Element>,
    ) -> Result<()> {
        let target = target.into();
        let container = options.container.clone();
        let current = self.platform.scroll_offset(&container)?;
        let end = self.resolve_scroll_end(&target, &options, current)?;
        let distance = end - current;
        if distance == 0.0 {
            log::debug!("scroll: already at {}", end);
            return Ok(());
        }

        let duration_ms = options
            .duration_ms
            .or_else(|| options.per100.map(|rate| (rate * distance / 100.0).abs()))
            .unwrap_or(self.config.default_scroll_duration_ms);

        log::debug!(
            "scroll: {} -> {} ({}px) over {}ms",
            current,
            end,
            distance,
            duration_ms
        );

        let session = ScrollSession {
            container,
            start_offset: current,
            end_offset: end,
            distance,
            start_time: self.platform.now(),
            duration_ms,
            last_applied: None,
        };

        let start_loop = {
            let mut state = self.scroll.borrow_mut();
            state.session = Some(session);
            !std::mem::replace(&mut state.looping, true)
        };
        if start_loop {
            let platform = self.platform.clone();
            let state = self.scroll.clone();
            let fallback_ms = self.config.frame_fallback_ms;
            let scheduled = schedule_frame(
                &self.platform,
                fallback_ms,
                Box::new(move |timestamp| scroll_frame(platform, state, fallback_ms, timestamp)),
            );
            if let Err(err) = scheduled {
                let mut state = self.scroll.borrow_mut();
                state.session = None;
                state.looping = false;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Scroll the viewport to `offset` over `duration_ms`
    pub fn scroll_to(&self, offset: f64, duration_ms: f64) -> Result<()> {
        self.scroll(offset, ScrollOptions::new().duration(duration_ms))
    }

    /// Drop the running scroll session, if any. The pending frame stops the
    /// loop when it fires.
    pub fn cancel_scroll(&self) {
        if self.scroll.borrow_mut().session.take().is_some() {
            log::debug!("scroll: cancelled");
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.borrow().session.is_some()
    }

    pub fn scroll_session(&self) -> Option<ScrollSession<P::Element>> {
        self.scroll.borrow().session.clone()
    }

    fn resolve_scroll_end(
        &self,
        target: &ScrollTarget<P::Element>,
        options: &ScrollOptions<P::Element>,
        current: f64,
    ) -> Result<f64> {
        let container = &options.container;
        let end = match target {
            ScrollTarget::Offset(offset) => *offset,
            ScrollTarget::Element(element) => {
                let rect = self.platform.bounding_rect(element)?;
                let top = self.platform.container_top(container)?;
                match options.align {
                    Align::Top => rect.top - top + current,
                    Align::Bottom => {
                        let visible = self.platform.visible_height(container)?;
                        rect.bottom() - top - visible + current
                    }
                }
            }
            ScrollTarget::Edge => match options.align {
                Align::Top => 0.0,
                Align::Bottom => {
                    self.platform.scroll_height(container)?
                        - self.platform.visible_height(container)?
                }
            },
        };
        Ok(end)
    }
}

fn scroll_frame<P: Platform>(
    platform: P,
    state: SharedScroll<P::Element>,
    fallback_ms: f64,
    timestamp: f64,
) {
    let step = {
        let mut shared = state.borrow_mut();
        match shared.session.as_ref() {
            Some(session) => {
                let elapsed = timestamp - session.start_time;
                let progress = if session.duration_ms > 0.0 {
                    (elapsed / session.duration_ms).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                Some((
                    session.container.clone(),
                    session.start_offset + session.distance * progress,
                    elapsed >= session.duration_ms,
                ))
            }
            None => {
                shared.looping = false;
                None
            }
        }
    };
    let Some((container, wanted, out_of_time)) = step else {
        return;
    };

    let applied = platform
        .set_scroll_offset(&container, wanted)
        .and_then(|_| platform.scroll_offset(&container));
    let applied = match applied {
        Ok(offset) => offset,
        Err(err) => {
            log::warn!("scroll: stopping, offset unavailable: {}", err);
            stop(&state);
            return;
        }
    };

    log::trace!("scroll frame at {}: wanted {}, got {}", timestamp, wanted, applied);

    let stalled = {
        let mut shared = state.borrow_mut();
        match shared.session.as_mut() {
            Some(session) => {
                let previous = session.last_applied.replace(applied);
                previous == Some(applied) && (wanted - applied).abs() >= 1.0
            }
            None => false,
        }
    };

    if out_of_time || stalled {
        log::debug!("scroll: finished at {}", applied);
        stop(&state);
        return;
    }

    let next_platform = platform.clone();
    let next_state = state.clone();
    let scheduled = schedule_frame(
        &platform,
        fallback_ms,
        Box::new(move |timestamp| scroll_frame(next_platform, next_state, fallback_ms, timestamp)),
    );
    if let Err(err) = scheduled {
        log::warn!("scroll: could not schedule frame: {}", err);
        stop(&state);
    }
}

fn stop<E>(state: &SharedScroll<E>) {
    let mut shared = state.borrow_mut();
    shared.session = None;
    shared.looping = false;
}
