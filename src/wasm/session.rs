//! Browser session: page preparation, event wiring and content observation

use super::dom::{
    child_markup, html_by_id, js_error, read_viewport, DomDisplay, NAV_NEXT, NAV_PREV,
    POST_HEADER, RELATED_POSTS, RELATED_POSTS_TARGET, SHARE_WRAP,
};
use crate::config::ReaderConfig;
use crate::content::{cover_markup, CanonicalContent, ContentChange};
use crate::error::{Error, Result};
use crate::input::{route_click, route_key, FocusContext, Intent, Key, SwipeTracker};
use crate::{Point, Reader, Rect};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, KeyboardEvent, MouseEvent, MutationObserver, MutationObserverInit,
    TouchEvent, Window,
};

pub(crate) type SharedReader = Rc<RefCell<Reader<DomDisplay>>>;

/// Set on `#book-container` once a reader owns the page
const MOUNTED_ATTR: &str = "data-book-mounted";

/// Run `f` on the reader unless it is already borrowed further up the stack
pub(crate) fn with_reader<R>(
    reader: &SharedReader,
    f: impl FnOnce(&mut Reader<DomDisplay>) -> R,
) -> Option<R> {
    match reader.try_borrow_mut() {
        Ok(mut reader) => Some(f(&mut reader)),
        Err(_) => {
            log::debug!("reader busy, event dropped");
            None
        }
    }
}

/// A mounted reader and everything that keeps it wired to the page
pub(crate) struct Session {
    reader: SharedReader,
    _listeners: Vec<EventListener>,
    _resize_timer: Rc<RefCell<Option<Timeout>>>,
    observer: MutationObserver,
    _observer_callback: ObserverCallback,
}

impl Session {
    /// Activate the reader on the current page. `Ok(None)` when the page
    /// has no book or a reader was already mounted on it.
    pub(crate) fn mount(config: ReaderConfig) -> Result<Option<Self>> {
        let window = web_sys::window().ok_or_else(|| Error::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Dom("no document".into()))?;

        let display = match DomDisplay::locate(&window, &document, config.flip_timeout_ms) {
            Ok(Some(display)) => display,
            Ok(None) => {
                log::debug!("no book on this page");
                return Ok(None);
            }
            Err(Error::MissingAnchor(id)) => {
                log::warn!("book anchor #{id} missing, reader not activated");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let container = display.book_container().clone();
        // The content root takes its cover and moved controls only once
        if container.has_attribute(MOUNTED_ATTR) {
            log::warn!("reader already mounted on this page");
            return Ok(None);
        }
        container.set_attribute(MOUNTED_ATTR, "").map_err(js_error)?;

        let content_root: Element = display.content_root().clone().into();
        prepare_page(&document, &content_root)?;
        let content = collect_content(&document, &content_root)?;

        let debounce_ms = config.resize_debounce_ms;
        let swipe_threshold = config.swipe_threshold;
        let panel_id = config.aux_panel_id.clone();

        let reader = Reader::activate(config, content, read_viewport(&window), display)?;
        let reader: SharedReader = Rc::new(RefCell::new(reader));

        let weak = Rc::downgrade(&reader);
        reader
            .borrow_mut()
            .display_mut()
            .set_flip_handler(Rc::new(move || {
                if let Some(reader) = weak.upgrade() {
                    with_reader(&reader, |reader| reader.finish_flip());
                }
            }));

        let mut listeners = Vec::new();
        listeners.extend(nav_button_listeners(&document, &reader)?);
        listeners.push(key_listener(&document, &reader, panel_id.clone()));
        listeners.push(click_listener(&container, &reader));
        listeners.extend(swipe_listeners(&document, &reader, swipe_threshold, panel_id));

        let resize_timer = Rc::new(RefCell::new(None));
        listeners.push(resize_listener(&window, &reader, &resize_timer, debounce_ms));

        let (observer, observer_callback) = observe_content(&content_root, &reader)?;

        Ok(Some(Self {
            reader,
            _listeners: listeners,
            _resize_timer: resize_timer,
            observer,
            _observer_callback: observer_callback,
        }))
    }

    pub(crate) fn reader(&self) -> &SharedReader {
        &self.reader
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Move related posts and the share control into the book
fn prepare_page(document: &Document, content_root: &Element) -> Result<()> {
    if let (Some(source), Some(target)) = (
        document.get_element_by_id(RELATED_POSTS),
        document.get_element_by_id(RELATED_POSTS_TARGET),
    ) {
        target.set_inner_html(&source.inner_html());
    }

    if let Some(wrap) = document.get_element_by_id(SHARE_WRAP) {
        if let Some(button) = content_root
            .query_selector(".share-button")
            .map_err(js_error)?
        {
            wrap.append_child(&button).map_err(js_error)?;
        }
    }

    Ok(())
}

/// Snapshot the content root, prepending the header as a cover page
fn collect_content(document: &Document, content_root: &Element) -> Result<CanonicalContent> {
    let mut content = CanonicalContent::from_html_blocks(child_markup(content_root));

    let header = document
        .get_element_by_id(POST_HEADER)
        .map(|header| header.inner_html())
        .unwrap_or_default();
    if content.insert_cover(&header).is_some() {
        content_root
            .insert_adjacent_html("afterbegin", &cover_markup(&header))
            .map_err(js_error)?;
    }

    Ok(content)
}

fn focus_context(
    document: &Document,
    target: Option<web_sys::EventTarget>,
    panel_id: &str,
) -> FocusContext {
    let Some(element) = target.and_then(|target| target.dyn_into::<Element>().ok()) else {
        return FocusContext::default();
    };

    let tag = element.tag_name();
    FocusContext {
        in_text_entry: tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea"),
        in_open_panel: open_panel(document, panel_id)
            .map(|panel| panel.contains(Some(element.as_ref())))
            .unwrap_or(false),
    }
}

fn open_panel(document: &Document, panel_id: &str) -> Option<Element> {
    document
        .get_element_by_id(panel_id)
        .filter(|panel| panel.class_list().contains("active"))
}

fn nav_button_listeners(document: &Document, reader: &SharedReader) -> Result<Vec<EventListener>> {
    let mut listeners = Vec::new();
    for (id, intent) in [(NAV_PREV, Intent::Prev), (NAV_NEXT, Intent::Next)] {
        if let Some(button) = html_by_id(document, id)? {
            let reader = Rc::clone(reader);
            listeners.push(EventListener::new(&button, "click", move |_| {
                with_reader(&reader, |reader| reader.handle_intent(intent));
            }));
        }
    }
    Ok(listeners)
}

fn key_listener(document: &Document, reader: &SharedReader, panel_id: String) -> EventListener {
    let reader = Rc::clone(reader);
    let doc = document.clone();
    EventListener::new_with_options(
        document,
        "keydown",
        EventListenerOptions::enable_prevent_default(),
        move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let focus = focus_context(&doc, event.target(), &panel_id);
            if let Some(intent) = route_key(Key::from_dom_key(&event.key()), focus) {
                event.prevent_default();
                with_reader(&reader, |reader| reader.handle_intent(intent));
            }
        },
    )
}

fn click_listener(container: &web_sys::HtmlElement, reader: &SharedReader) -> EventListener {
    let reader = Rc::clone(reader);
    let surface = container.clone();
    EventListener::new(container, "click", move |event: &Event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let bounds = surface.get_bounding_client_rect();
        let rect = Rect::new(
            bounds.left() as f32,
            bounds.top() as f32,
            bounds.width() as f32,
            bounds.height() as f32,
        );
        let point = Point {
            x: event.client_x() as f32,
            y: event.client_y() as f32,
        };
        with_reader(&reader, |reader| {
            if let Some(intent) = route_click(point, rect, reader.geometry().mode) {
                reader.handle_intent(intent);
            }
        });
    })
}

fn first_touch(event: &TouchEvent, changed: bool) -> Option<Point> {
    let touches = if changed {
        event.changed_touches()
    } else {
        event.touches()
    };
    touches.get(0).map(|touch| Point {
        x: touch.client_x() as f32,
        y: touch.client_y() as f32,
    })
}

fn swipe_listeners(
    document: &Document,
    reader: &SharedReader,
    threshold: f32,
    panel_id: String,
) -> [EventListener; 2] {
    let tracker = Rc::new(RefCell::new(SwipeTracker::new(threshold)));

    let start_tracker = Rc::clone(&tracker);
    let touch_start = EventListener::new(document, "touchstart", move |event: &Event| {
        if let Some(point) = event.dyn_ref::<TouchEvent>().and_then(|e| first_touch(e, false)) {
            start_tracker.borrow_mut().touch_start(point);
        }
    });

    let reader = Rc::clone(reader);
    let doc = document.clone();
    let touch_end = EventListener::new(document, "touchend", move |event: &Event| {
        let Some(point) = event.dyn_ref::<TouchEvent>().and_then(|e| first_touch(e, true)) else {
            return;
        };
        let panel_open = open_panel(&doc, &panel_id).is_some();
        let intent = tracker.borrow_mut().touch_end(point, panel_open);
        if let Some(intent) = intent {
            with_reader(&reader, |reader| reader.handle_intent(intent));
        }
    });

    [touch_start, touch_end]
}

fn resize_listener(
    window: &Window,
    reader: &SharedReader,
    timer: &Rc<RefCell<Option<Timeout>>>,
    debounce_ms: u32,
) -> EventListener {
    let reader = Rc::clone(reader);
    let timer = Rc::clone(timer);
    let win = window.clone();
    EventListener::new(window, "resize", move |_| {
        let reader = Rc::clone(&reader);
        let win = win.clone();
        let timeout = Timeout::new(debounce_ms, move || {
            let viewport = read_viewport(&win);
            with_reader(&reader, |reader| {
                if let Err(err) = reader.resize(viewport) {
                    log::warn!("resize failed: {err}");
                }
            });
        });
        // Replacing the pending timeout cancels it
        *timer.borrow_mut() = Some(timeout);
    })
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Publish a content reset for every batch of DOM mutations under the root
fn observe_content(
    content_root: &Element,
    reader: &SharedReader,
) -> Result<(MutationObserver, ObserverCallback)> {
    let publisher = reader.borrow().publisher();
    let root = content_root.clone();
    let reader = Rc::clone(reader);

    let callback: ObserverCallback =
        Closure::new(move |_records: js_sys::Array, _: MutationObserver| {
            publisher.publish(ContentChange::Reset {
                blocks: child_markup(&root),
            });
            with_reader(&reader, |reader| {
                if let Err(err) = reader.sync_content() {
                    log::warn!("content sync failed: {err}");
                }
            });
        });

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(js_error)?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_character_data(true);
    options.set_subtree(true);
    observer
        .observe_with_options(content_root, &options)
        .map_err(js_error)?;

    Ok((observer, callback))
}
