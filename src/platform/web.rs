//! Browser backend on `web-sys`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Function;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{FrameCallback, Platform, ScrollContainer, StylesheetId, TimerCallback};
use crate::error::{Result, TransitionError};
use crate::geometry::Rect;

fn js_error(err: JsValue) -> TransitionError {
    TransitionError::Platform(format!("{:?}", err))
}

/// The current browser window and document
#[derive(Clone)]
pub struct WebPlatform {
    window: Window,
    document: Document,
    stylesheets: Rc<RefCell<HashMap<StylesheetId, Element>>>,
    next_stylesheet: Rc<Cell<u64>>,
}

impl WebPlatform {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or(TransitionError::Unsupported("window"))?;
        let document = window
            .document()
            .ok_or(TransitionError::Unsupported("document"))?;
        Ok(Self {
            window,
            document,
            stylesheets: Rc::new(RefCell::new(HashMap::new())),
            next_stylesheet: Rc::new(Cell::new(0)),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn attached<'a>(&self, element: &'a HtmlElement) -> Result<&'a HtmlElement> {
        if element.is_connected() {
            Ok(element)
        } else {
            Err(TransitionError::DetachedElement)
        }
    }

    fn root_element(&self) -> Result<Element> {
        self.document
            .document_element()
            .ok_or(TransitionError::Unsupported("document element"))
    }
}

impl Platform for WebPlatform {
    type Element = HtmlElement;

    fn bounding_rect(&self, element: &HtmlElement) -> Result<Rect> {
        let rect = self.attached(element)?.get_bounding_client_rect();
        Ok(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn computed_style(&self, element: &HtmlElement, property: &str) -> Result<String> {
        let style = self
            .window
            .get_computed_style(self.attached(element)?)
            .map_err(js_error)?
            .ok_or(TransitionError::Unsupported("computed styles"))?;
        style.get_property_value(property).map_err(js_error)
    }

    fn inline_style(&self, element: &HtmlElement, property: &str) -> Result<String> {
        self.attached(element)?
            .style()
            .get_property_value(property)
            .map_err(js_error)
    }

    fn set_inline_style(&self, element: &HtmlElement, property: &str, value: &str) -> Result<()> {
        let style = self.attached(element)?.style();
        if value.is_empty() {
            style.remove_property(property).map(|_| ()).map_err(js_error)
        } else {
            style.set_property(property, value).map_err(js_error)
        }
    }

    fn insert_stylesheet(&self, css: &str) -> Result<StylesheetId> {
        let style = self.document.create_element("style").map_err(js_error)?;
        style.set_text_content(Some(css));
        let head = self
            .document
            .head()
            .ok_or(TransitionError::Unsupported("document head"))?;
        head.append_child(&style).map_err(js_error)?;

        let id = StylesheetId(self.next_stylesheet.get());
        self.next_stylesheet.set(id.0 + 1);
        self.stylesheets.borrow_mut().insert(id, style);
        Ok(id)
    }

    fn remove_stylesheet(&self, id: StylesheetId) -> Result<()> {
        let style = self
            .stylesheets
            .borrow_mut()
            .remove(&id)
            .ok_or(TransitionError::UnknownStylesheet(id))?;
        style.remove();
        Ok(())
    }

    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_default()
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> Result<()> {
        let handler = Closure::once_into_js(move || callback());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                handler.unchecked_ref::<Function>(),
                delay_ms.max(0.0).round() as i32,
            )
            .map(|_| ())
            .map_err(js_error)
    }

    fn supports_animation_frame(&self) -> bool {
        true
    }

    fn request_animation_frame(&self, callback: FrameCallback) -> Result<()> {
        let handler = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        self.window
            .request_animation_frame(handler.unchecked_ref::<Function>())
            .map(|_| ())
            .map_err(js_error)
    }

    fn scroll_offset(&self, container: &ScrollContainer<HtmlElement>) -> Result<f64> {
        match container {
            ScrollContainer::Viewport => self.window.scroll_y().map_err(js_error),
            ScrollContainer::Element(element) => Ok(self.attached(element)?.scroll_top() as f64),
        }
    }

    fn set_scroll_offset(&self, container: &ScrollContainer<HtmlElement>, offset: f64) -> Result<()> {
        match container {
            ScrollContainer::Viewport => {
                let x = self.window.scroll_x().map_err(js_error)?;
                self.window.scroll_to_with_x_and_y(x, offset);
            }
            ScrollContainer::Element(element) => {
                let element = self.attached(element)?;
                element.scroll_to_with_x_and_y(element.scroll_left() as f64, offset);
            }
        }
        Ok(())
    }

    fn visible_height(&self, container: &ScrollContainer<HtmlElement>) -> Result<f64> {
        match container {
            ScrollContainer::Viewport => self
                .window
                .inner_height()
                .map_err(js_error)?
                .as_f64()
                .ok_or(TransitionError::Unsupported("numeric innerHeight")),
            ScrollContainer::Element(element) => {
                Ok(self.attached(element)?.client_height() as f64)
            }
        }
    }

    fn scroll_height(&self, container: &ScrollContainer<HtmlElement>) -> Result<f64> {
        match container {
            ScrollContainer::Viewport => Ok(self.root_element()?.scroll_height() as f64),
            ScrollContainer::Element(element) => {
                Ok(self.attached(element)?.scroll_height() as f64)
            }
        }
    }
}
