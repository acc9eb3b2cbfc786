//! In-memory document with a virtual clock.
//!
//! `HeadlessPlatform` stores the layout box the caller assigns to each
//! element (there is no layout engine), applies inline `transform` and
//! `transform-origin` when reporting bounding boxes, keeps inline and
//! computed styles apart, and runs timers and animation frames only when the
//! clock is advanced. Transitions are not simulated: a restored transform
//! takes effect immediately.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{FrameCallback, Platform, ScrollContainer, StylesheetId, TimerCallback};
use crate::error::{Result, TransitionError};
use crate::geometry::Rect;
use crate::transform::Transform2D;
use crate::transform_origin::TransformOrigin;

/// Default animation frame period (60 Hz, rounded)
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;

/// Upper bound on callbacks run by a single [`HeadlessPlatform::run_until_idle`]
const MAX_TASKS_PER_RUN: usize = 100_000;

/// Handle to an element of a [`HeadlessPlatform`] document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// Scroll state of the viewport or of a scrollable element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub visible_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn new(visible_height: f64, scroll_height: f64) -> Self {
        Self {
            offset: 0.0,
            visible_height,
            scroll_height,
        }
    }

    pub fn max_offset(&self) -> f64 {
        (self.scroll_height - self.visible_height).max(0.0)
    }
}

struct ElementNode {
    layout: Rect,
    inline: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    attached: bool,
    scroll: ScrollMetrics,
    scroll_parent: Option<ElementId>,
}

enum TaskKind {
    Timer(TimerCallback),
    Frame(FrameCallback),
}

struct Task {
    due: f64,
    seq: u64,
    kind: TaskKind,
}

struct Document {
    now: f64,
    elements: Vec<ElementNode>,
    stylesheets: BTreeMap<StylesheetId, String>,
    next_stylesheet: u64,
    tasks: Vec<Task>,
    next_seq: u64,
    frame_interval: f64,
    animation_frames: bool,
    computed_styles: bool,
    viewport: ScrollMetrics,
    frames_run: usize,
}

impl Document {
    fn node(&self, id: ElementId) -> Result<&ElementNode> {
        match self.elements.get(id.0) {
            Some(node) if node.attached => Ok(node),
            _ => Err(TransitionError::DetachedElement),
        }
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        match self.elements.get_mut(id.0) {
            Some(node) if node.attached => Ok(node),
            _ => Err(TransitionError::DetachedElement),
        }
    }

    fn metrics(&self, container: &ScrollContainer<ElementId>) -> Result<ScrollMetrics> {
        match container {
            ScrollContainer::Viewport => Ok(self.viewport),
            ScrollContainer::Element(id) => Ok(self.node(*id)?.scroll),
        }
    }

    fn metrics_mut(&mut self, container: &ScrollContainer<ElementId>) -> Result<&mut ScrollMetrics> {
        match container {
            ScrollContainer::Viewport => Ok(&mut self.viewport),
            ScrollContainer::Element(id) => Ok(&mut self.node_mut(*id)?.scroll),
        }
    }

    /// Sum of the scroll offsets between an element and the viewport
    fn scroll_shift(&self, id: ElementId) -> Result<f64> {
        let mut shift = self.viewport.offset;
        let mut parent = self.node(id)?.scroll_parent;
        while let Some(p) = parent {
            let node = self.node(p)?;
            shift += node.scroll.offset;
            parent = node.scroll_parent;
        }
        Ok(shift)
    }

    fn push_task(&mut self, due: f64, kind: TaskKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task { due, seq, kind });
    }

    /// Remove the earliest task due at or before `limit`
    fn pop_due(&mut self, limit: f64) -> Option<Task> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= limit)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(index, _)| index)?;
        let task = self.tasks.swap_remove(index);
        if task.due > self.now {
            self.now = task.due;
        }
        Some(task)
    }
}

/// A simulated document implementing [`Platform`].
///
/// Clones share the same document.
#[derive(Clone)]
pub struct HeadlessPlatform {
    doc: Rc<RefCell<Document>>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            doc: Rc::new(RefCell::new(Document {
                now: 0.0,
                elements: Vec::new(),
                stylesheets: BTreeMap::new(),
                next_stylesheet: 0,
                tasks: Vec::new(),
                next_seq: 0,
                frame_interval: DEFAULT_FRAME_INTERVAL_MS,
                animation_frames: true,
                computed_styles: true,
                viewport: ScrollMetrics::new(800.0, 800.0),
                frames_run: 0,
            })),
        }
    }

    /// Add an attached element whose untransformed box is `layout`
    pub fn create_element(&self, layout: Rect) -> ElementId {
        let mut doc = self.doc.borrow_mut();
        doc.elements.push(ElementNode {
            layout,
            inline: BTreeMap::new(),
            computed: BTreeMap::new(),
            attached: true,
            scroll: ScrollMetrics::default(),
            scroll_parent: None,
        });
        ElementId(doc.elements.len() - 1)
    }

    /// Move or resize an element, standing in for a reflow
    pub fn set_layout(&self, id: ElementId, layout: Rect) {
        if let Some(node) = self.doc.borrow_mut().elements.get_mut(id.0) {
            node.layout = layout;
        }
    }

    pub fn layout(&self, id: ElementId) -> Option<Rect> {
        self.doc.borrow().elements.get(id.0).map(|node| node.layout)
    }

    /// Remove an element from the document. Later access faults.
    pub fn detach(&self, id: ElementId) {
        if let Some(node) = self.doc.borrow_mut().elements.get_mut(id.0) {
            node.attached = false;
        }
    }

    /// Set the value reported by `computed_style` when no inline value
    /// overrides it
    pub fn set_computed_style(&self, id: ElementId, property: &str, value: &str) {
        if let Some(node) = self.doc.borrow_mut().elements.get_mut(id.0) {
            node.computed.insert(property.to_string(), value.to_string());
        }
    }

    pub fn set_computed_style_support(&self, enabled: bool) {
        self.doc.borrow_mut().computed_styles = enabled;
    }

    /// Toggle the native animation-frame scheduler
    pub fn set_animation_frames(&self, enabled: bool) {
        self.doc.borrow_mut().animation_frames = enabled;
    }

    pub fn set_frame_interval(&self, interval_ms: f64) {
        self.doc.borrow_mut().frame_interval = interval_ms;
    }

    pub fn set_viewport(&self, visible_height: f64, scroll_height: f64) {
        let mut doc = self.doc.borrow_mut();
        let offset = doc.viewport.offset;
        doc.viewport = ScrollMetrics {
            offset,
            visible_height,
            scroll_height,
        };
    }

    pub fn viewport(&self) -> ScrollMetrics {
        self.doc.borrow().viewport
    }

    /// Make an element scrollable
    pub fn set_scroll_metrics(&self, id: ElementId, visible_height: f64, scroll_height: f64) {
        if let Some(node) = self.doc.borrow_mut().elements.get_mut(id.0) {
            let offset = node.scroll.offset;
            node.scroll = ScrollMetrics {
                offset,
                visible_height,
                scroll_height,
            };
        }
    }

    /// Place `child` inside the scrollable element `parent`
    pub fn set_scroll_parent(&self, child: ElementId, parent: ElementId) {
        if let Some(node) = self.doc.borrow_mut().elements.get_mut(child.0) {
            node.scroll_parent = Some(parent);
        }
    }

    /// Contents of every inserted stylesheet fragment, in insertion order
    pub fn stylesheets(&self) -> Vec<String> {
        self.doc.borrow().stylesheets.values().cloned().collect()
    }

    /// Snapshot of an element's inline style declarations
    pub fn inline_styles(&self, id: ElementId) -> BTreeMap<String, String> {
        self.doc
            .borrow()
            .elements
            .get(id.0)
            .map(|node| node.inline.clone())
            .unwrap_or_default()
    }

    pub fn pending_tasks(&self) -> usize {
        self.doc.borrow().tasks.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.doc
            .borrow()
            .tasks
            .iter()
            .filter(|task| matches!(task.kind, TaskKind::Frame(_)))
            .count()
    }

    /// Animation frames delivered so far
    pub fn frames_run(&self) -> usize {
        self.doc.borrow().frames_run
    }

    /// Move the clock forward by `ms`, running every timer and frame that
    /// falls due on the way in time order.
    pub fn advance(&self, ms: f64) {
        let target = self.doc.borrow().now + ms;
        loop {
            let task = self.doc.borrow_mut().pop_due(target);
            match task {
                Some(task) => self.run(task),
                None => break,
            }
        }
        let mut doc = self.doc.borrow_mut();
        if doc.now < target {
            doc.now = target;
        }
    }

    /// Run tasks in time order until none are left.
    pub fn run_until_idle(&self) {
        for _ in 0..MAX_TASKS_PER_RUN {
            let task = self.doc.borrow_mut().pop_due(f64::INFINITY);
            match task {
                Some(task) => self.run(task),
                None => return,
            }
        }
        log::warn!(
            "headless platform still busy after {} tasks",
            MAX_TASKS_PER_RUN
        );
    }

    fn run(&self, task: Task) {
        match task.kind {
            TaskKind::Timer(callback) => callback(),
            TaskKind::Frame(callback) => {
                self.doc.borrow_mut().frames_run += 1;
                callback(task.due);
            }
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    type Element = ElementId;

    fn bounding_rect(&self, element: &ElementId) -> Result<Rect> {
        let doc = self.doc.borrow();
        let node = doc.node(*element)?;
        let shift = doc.scroll_shift(*element)?;

        let transform_text = node.inline.get("transform").map(String::as_str).unwrap_or("");
        let transform = Transform2D::parse_css(transform_text).unwrap_or_else(|| {
            log::trace!("ignoring unsupported transform {:?}", transform_text);
            Transform2D::IDENTITY
        });

        let layout = node.layout.offset(0.0, -shift);
        let origin = node
            .inline
            .get("transform-origin")
            .and_then(|text| TransformOrigin::parse_css(text))
            .unwrap_or_default()
            .resolve(layout);

        Ok(transform.map_rect(layout, origin))
    }

    fn supports_computed_style(&self) -> bool {
        self.doc.borrow().computed_styles
    }

    fn computed_style(&self, element: &ElementId, property: &str) -> Result<String> {
        let doc = self.doc.borrow();
        if !doc.computed_styles {
            return Err(TransitionError::Unsupported("computed styles"));
        }
        let node = doc.node(*element)?;
        let value = node
            .inline
            .get(property)
            .or_else(|| node.computed.get(property))
            .cloned()
            .unwrap_or_default();
        Ok(value)
    }

    fn inline_style(&self, element: &ElementId, property: &str) -> Result<String> {
        let doc = self.doc.borrow();
        let node = doc.node(*element)?;
        Ok(node.inline.get(property).cloned().unwrap_or_default())
    }

    fn set_inline_style(&self, element: &ElementId, property: &str, value: &str) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        let node = doc.node_mut(*element)?;
        if value.is_empty() {
            node.inline.remove(property);
        } else {
            node.inline.insert(property.to_string(), value.to_string());
        }
        Ok(())
    }

    fn insert_stylesheet(&self, css: &str) -> Result<StylesheetId> {
        let mut doc = self.doc.borrow_mut();
        let id = StylesheetId(doc.next_stylesheet);
        doc.next_stylesheet += 1;
        doc.stylesheets.insert(id, css.to_string());
        Ok(id)
    }

    fn remove_stylesheet(&self, id: StylesheetId) -> Result<()> {
        self.doc
            .borrow_mut()
            .stylesheets
            .remove(&id)
            .map(|_| ())
            .ok_or(TransitionError::UnknownStylesheet(id))
    }

    fn now(&self) -> f64 {
        self.doc.borrow().now
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        let due = doc.now + delay_ms.max(0.0);
        doc.push_task(due, TaskKind::Timer(callback));
        Ok(())
    }

    fn supports_animation_frame(&self) -> bool {
        self.doc.borrow().animation_frames
    }

    fn request_animation_frame(&self, callback: FrameCallback) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        if !doc.animation_frames {
            return Err(TransitionError::Unsupported("animation frames"));
        }
        let interval = doc.frame_interval;
        let due = ((doc.now / interval).floor() + 1.0) * interval;
        doc.push_task(due, TaskKind::Frame(callback));
        Ok(())
    }

    fn scroll_offset(&self, container: &ScrollContainer<ElementId>) -> Result<f64> {
        Ok(self.doc.borrow().metrics(container)?.offset)
    }

    fn set_scroll_offset(&self, container: &ScrollContainer<ElementId>, offset: f64) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        let metrics = doc.metrics_mut(container)?;
        let max = metrics.max_offset();
        metrics.offset = offset.clamp(0.0, max);
        Ok(())
    }

    fn visible_height(&self, container: &ScrollContainer<ElementId>) -> Result<f64> {
        Ok(self.doc.borrow().metrics(container)?.visible_height)
    }

    fn scroll_height(&self, container: &ScrollContainer<ElementId>) -> Result<f64> {
        Ok(self.doc.borrow().metrics(container)?.scroll_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_rect_applies_transform_about_center() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        platform.set_inline_style(&el, "transform", "scale(0.5,0.5)").unwrap();

        let rect = platform.bounding_rect(&el).unwrap();
        assert_eq!(rect, Rect::new(25.0, 25.0, 50.0, 50.0));
    }

    #[test]
    fn test_bounding_rect_honors_transform_origin() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        platform.set_inline_style(&el, "transform", "scale(2,2)").unwrap();
        platform.set_inline_style(&el, "transform-origin", "left top").unwrap();

        let rect = platform.bounding_rect(&el).unwrap();
        assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_bounding_rect_is_viewport_relative() {
        let platform = HeadlessPlatform::new();
        platform.set_viewport(500.0, 2000.0);
        let el = platform.create_element(Rect::new(0.0, 900.0, 10.0, 10.0));
        platform
            .set_scroll_offset(&ScrollContainer::Viewport, 300.0)
            .unwrap();

        assert_eq!(platform.bounding_rect(&el).unwrap().top, 600.0);
    }

    #[test]
    fn test_empty_inline_value_removes_property() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::default());
        platform.set_inline_style(&el, "opacity", "0.5").unwrap();
        platform.set_inline_style(&el, "opacity", "").unwrap();
        assert!(platform.inline_styles(el).is_empty());
    }

    #[test]
    fn test_computed_style_prefers_inline() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::default());
        platform.set_computed_style(el, "opacity", "1");
        assert_eq!(platform.computed_style(&el, "opacity").unwrap(), "1");

        platform.set_inline_style(&el, "opacity", "0.2").unwrap();
        assert_eq!(platform.computed_style(&el, "opacity").unwrap(), "0.2");
    }

    #[test]
    fn test_timers_run_in_due_order() {
        let platform = HeadlessPlatform::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(30.0, "c"), (10.0, "a"), (20.0, "b"), (10.0, "a2")] {
            let order = order.clone();
            platform
                .set_timeout(delay, Box::new(move || order.borrow_mut().push(tag)))
                .unwrap();
        }

        platform.advance(15.0);
        assert_eq!(*order.borrow(), vec!["a", "a2"]);
        assert_eq!(platform.now(), 15.0);

        platform.advance(100.0);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn test_frames_land_on_interval_boundaries() {
        let platform = HeadlessPlatform::new();
        platform.advance(5.0);
        let stamp = Rc::new(RefCell::new(None));
        let slot = stamp.clone();
        platform
            .request_animation_frame(Box::new(move |t| *slot.borrow_mut() = Some(t)))
            .unwrap();

        platform.advance(20.0);
        assert_eq!(*stamp.borrow(), Some(16.0));
        assert_eq!(platform.frames_run(), 1);
    }

    #[test]
    fn test_request_frame_without_support_fails() {
        let platform = HeadlessPlatform::new();
        platform.set_animation_frames(false);
        assert!(platform.request_animation_frame(Box::new(|_| {})).is_err());
    }

    #[test]
    fn test_scroll_offset_is_clamped() {
        let platform = HeadlessPlatform::new();
        platform.set_viewport(400.0, 1000.0);
        let viewport = ScrollContainer::Viewport;

        platform.set_scroll_offset(&viewport, 5000.0).unwrap();
        assert_eq!(platform.scroll_offset(&viewport).unwrap(), 600.0);

        platform.set_scroll_offset(&viewport, -10.0).unwrap();
        assert_eq!(platform.scroll_offset(&viewport).unwrap(), 0.0);
    }

    #[test]
    fn test_stylesheet_insert_and_remove() {
        let platform = HeadlessPlatform::new();
        let id = platform.insert_stylesheet("@keyframes a { }").unwrap();
        assert_eq!(platform.stylesheets(), vec!["@keyframes a { }".to_string()]);

        platform.remove_stylesheet(id).unwrap();
        assert!(platform.stylesheets().is_empty());
        assert_eq!(
            platform.remove_stylesheet(id),
            Err(TransitionError::UnknownStylesheet(id))
        );
    }

    #[test]
    fn test_detached_element_faults() {
        let platform = HeadlessPlatform::new();
        let el = platform.create_element(Rect::default());
        platform.detach(el);

        assert_eq!(
            platform.inline_style(&el, "transform"),
            Err(TransitionError::DetachedElement)
        );
        assert!(platform.set_inline_style(&el, "transform", "none").is_err());
    }
}
