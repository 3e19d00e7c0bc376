//! DOM display: the book markup as measure surface, render sink and flip surface

use crate::content::CanonicalContent;
use crate::error::{Error, Result};
use crate::flip::{FlipDirection, FlipSurface, FlipTransition};
use crate::layout::{BlockMetrics, MeasureSurface, PresentationState, Viewport};
use crate::render::{Face, RenderPatch, RenderSink, Slot};
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use js_sys::{Function, Reflect};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

pub(crate) const BOOK_CONTAINER: &str = "book-container";
pub(crate) const POST_CONTENT: &str = "post-content";
pub(crate) const POST_HEADER: &str = "post-header";
pub(crate) const RELATED_POSTS: &str = "related-posts";
pub(crate) const RELATED_POSTS_TARGET: &str = "related-posts-target";
pub(crate) const SHARE_WRAP: &str = "book-share-wrap";
pub(crate) const NAV_PREV: &str = "book-nav-prev";
pub(crate) const NAV_NEXT: &str = "book-nav-next";

const PAGE_LEFT: &str = "book-page-left";
const PAGE_RIGHT: &str = "book-page-right";
const PAGE_FLIP: &str = "book-page-flip";
const PAGE_LEFT_CONTENT: &str = "page-left-content";
const PAGE_RIGHT_CONTENT: &str = "page-right-content";
const FLIP_FRONT: &str = "page-flip-front";
const FLIP_BACK: &str = "page-flip-back";
const PAGE_COUNTER: &str = "book-page-counter";
const ANNOUNCER: &str = "book-announcer";

const EMPTY_PAGE_CLASS: &str = "book-page-empty";
const FLIP_VISIBLE_CLASS: &str = "book-page-flip-visible";
const FLIP_ANIMATING_CLASS: &str = "book-page-flip-animating";
const FLIP_BACKWARD_CLASS: &str = "book-page-flip-backward";

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub(crate) fn js_error(value: JsValue) -> Error {
    Error::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

pub(crate) fn html_by_id(document: &Document, id: &str) -> Result<Option<HtmlElement>> {
    document
        .get_element_by_id(id)
        .map(|el| {
            el.dyn_into::<HtmlElement>()
                .map_err(|_| Error::Dom(format!("#{id} is not an HTML element")))
        })
        .transpose()
}

fn required(document: &Document, id: &str) -> Result<HtmlElement> {
    html_by_id(document, id)?.ok_or_else(|| Error::MissingAnchor(id.to_string()))
}

fn set_style(el: &HtmlElement, property: &str, value: &str) -> Result<()> {
    el.style().set_property(property, value).map_err(js_error)
}

fn clear_style(el: &HtmlElement, property: &str) {
    if let Err(err) = el.style().remove_property(property) {
        log::warn!("could not clear {property}: {err:?}");
    }
}

fn rotate(angle: f32) -> String {
    format!("rotateY({angle}deg)")
}

fn parse_px(value: &str) -> f32 {
    value.trim().trim_end_matches("px").parse().unwrap_or(0.0)
}

/// Current viewport size and motion preference
pub(crate) fn read_viewport(window: &Window) -> Viewport {
    let dimension = |value: std::result::Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    let reduced_motion = window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false);

    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
        .with_reduced_motion(reduced_motion)
}

/// Outer markup of every child of `root`, in document order
pub(crate) fn child_markup(root: &Element) -> Vec<String> {
    let children = root.children();
    (0..children.length())
        .filter_map(|idx| children.item(idx))
        .map(|child| child.outer_html())
        .collect()
}

/// Call `window.lucide.createIcons()` when the icon library is loaded
fn refresh_icons(window: &Window) {
    let Ok(lucide) = Reflect::get(window, &JsValue::from_str("lucide")) else {
        return;
    };
    if lucide.is_undefined() || lucide.is_null() {
        return;
    }
    let Ok(create) = Reflect::get(&lucide, &JsValue::from_str("createIcons")) else {
        return;
    };
    let Ok(create) = create.dyn_into::<Function>() else {
        return;
    };
    if let Err(err) = create.call0(&lucide) {
        log::warn!("icon refresh failed: {err:?}");
    }
}

/// The book's DOM anchors
pub struct DomDisplay {
    window: Window,
    book_container: HtmlElement,
    content_root: HtmlElement,
    page_left: HtmlElement,
    page_right: HtmlElement,
    page_flip: HtmlElement,
    page_left_content: HtmlElement,
    page_right_content: HtmlElement,
    flip_front: HtmlElement,
    flip_back: HtmlElement,
    counter: Option<HtmlElement>,
    announcer: Option<HtmlElement>,
    flip_timeout_ms: u32,
    on_flip_end: Option<Rc<dyn Fn()>>,
    // Kept until the next flip replaces them; they may be the caller of end_flip
    flip_listener: Option<EventListener>,
    flip_timeout: Option<Timeout>,
    flip_frame: Option<AnimationFrame>,
}

impl DomDisplay {
    /// Find the book anchors. `Ok(None)` when this is not a post page.
    pub(crate) fn locate(
        window: &Window,
        document: &Document,
        flip_timeout_ms: u32,
    ) -> Result<Option<Self>> {
        let Some(book_container) = html_by_id(document, BOOK_CONTAINER)? else {
            return Ok(None);
        };
        let Some(content_root) = html_by_id(document, POST_CONTENT)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            window: window.clone(),
            book_container,
            content_root,
            page_left: required(document, PAGE_LEFT)?,
            page_right: required(document, PAGE_RIGHT)?,
            page_flip: required(document, PAGE_FLIP)?,
            page_left_content: required(document, PAGE_LEFT_CONTENT)?,
            page_right_content: required(document, PAGE_RIGHT_CONTENT)?,
            flip_front: required(document, FLIP_FRONT)?,
            flip_back: required(document, FLIP_BACK)?,
            counter: html_by_id(document, PAGE_COUNTER)?,
            announcer: html_by_id(document, ANNOUNCER)?,
            flip_timeout_ms,
            on_flip_end: None,
            flip_listener: None,
            flip_timeout: None,
            flip_frame: None,
        }))
    }

    pub(crate) fn book_container(&self) -> &HtmlElement {
        &self.book_container
    }

    pub(crate) fn content_root(&self) -> &HtmlElement {
        &self.content_root
    }

    /// Completion callback for page turns (transition end or fallback timer)
    pub(crate) fn set_flip_handler(&mut self, handler: Rc<dyn Fn()>) {
        self.on_flip_end = Some(handler);
    }

    fn slot_page(&self, slot: Slot) -> &HtmlElement {
        match slot {
            Slot::Left => &self.page_left,
            Slot::Right => &self.page_right,
        }
    }

    fn slot_content(&self, slot: Slot) -> &HtmlElement {
        match slot {
            Slot::Left => &self.page_left_content,
            Slot::Right => &self.page_right_content,
        }
    }

    fn show_face(&self, slot: Slot, face: &Face) -> Result<()> {
        let page = self.slot_page(slot);
        let content = self.slot_content(slot);

        match face {
            Face::Hidden => set_style(page, "display", "none"),
            Face::Blank => {
                set_style(page, "display", "block")?;
                content.set_inner_html("");
                page.class_list().add_1(EMPTY_PAGE_CLASS).map_err(js_error)
            }
            Face::Page { html, .. } => {
                set_style(page, "display", "block")?;
                content.set_inner_html(html);
                page.class_list().remove_1(EMPTY_PAGE_CLASS).map_err(js_error)
            }
        }
    }
}

impl MeasureSurface for DomDisplay {
    fn enter_layout_mode(&mut self, width: f32) -> Result<PresentationState> {
        let style = self.content_root.style();
        let read = |property: &str| style.get_property_value(property).map_err(js_error);
        let saved = PresentationState {
            position: read("position")?,
            visibility: read("visibility")?,
            width: read("width")?,
            height: read("height")?,
            overflow: read("overflow")?,
        };

        let width = format!("{width}px");
        let layout = [
            ("position", "absolute"),
            ("visibility", "hidden"),
            ("width", width.as_str()),
            ("height", "auto"),
            ("overflow", "visible"),
        ];
        for (property, value) in layout {
            if let Err(err) = style.set_property(property, value) {
                self.restore_presentation(saved);
                return Err(js_error(err));
            }
        }

        Ok(saved)
    }

    fn restore_presentation(&mut self, saved: PresentationState) {
        let style = self.content_root.style();
        let properties = [
            ("position", saved.position),
            ("visibility", saved.visibility),
            ("width", saved.width),
            ("height", saved.height),
            ("overflow", saved.overflow),
        ];

        for (property, value) in properties {
            let result = if value.is_empty() {
                style.remove_property(property).map(|_| ())
            } else {
                style.set_property(property, &value)
            };
            if let Err(err) = result {
                log::warn!("could not restore {property} on the content root: {err:?}");
            }
        }
    }

    fn measure_blocks(&mut self, content: &CanonicalContent) -> Result<Vec<BlockMetrics>> {
        let children = self.content_root.children();
        let found = children.length() as usize;
        if found != content.len() {
            return Err(Error::ContentOutOfSync {
                expected: content.len(),
                found,
            });
        }

        let mut metrics = Vec::with_capacity(found);
        for (idx, id) in content.ids().enumerate() {
            let child = children.item(idx as u32).ok_or(Error::ContentOutOfSync {
                expected: content.len(),
                found: idx,
            })?;

            let outer_height = match child.dyn_ref::<HtmlElement>() {
                Some(el) => el.offset_height() as f32,
                None => child.get_bounding_client_rect().height() as f32,
            };
            let margin_bottom = self
                .window
                .get_computed_style(&child)
                .map_err(js_error)?
                .and_then(|style| style.get_property_value("margin-bottom").ok())
                .map(|value| parse_px(&value))
                .unwrap_or(0.0);

            metrics.push(BlockMetrics::new(id, outer_height, margin_bottom));
        }

        Ok(metrics)
    }
}

impl RenderSink for DomDisplay {
    fn apply(&mut self, patch: &RenderPatch) -> Result<()> {
        match patch {
            RenderPatch::ShowFace { slot, face } => self.show_face(*slot, face),
            RenderPatch::SetStatus(status) => {
                let text = status.to_string();
                for el in [&self.counter, &self.announcer].into_iter().flatten() {
                    el.set_text_content(Some(&text));
                }
                Ok(())
            }
            RenderPatch::RefreshIcons => {
                refresh_icons(&self.window);
                Ok(())
            }
        }
    }
}

impl FlipSurface for DomDisplay {
    fn begin_flip(&mut self, transition: &FlipTransition) -> Result<()> {
        let direction = transition.direction;
        let flip = self.page_flip.clone();
        let classes = flip.class_list();

        self.flip_front.set_inner_html(&transition.front_html);
        self.flip_back.set_inner_html(&transition.back_html);

        classes.remove_1(FLIP_ANIMATING_CLASS).map_err(js_error)?;
        if direction == FlipDirection::Backward {
            classes.add_1(FLIP_BACKWARD_CLASS).map_err(js_error)?;
        }
        set_style(&flip, "transform", &rotate(direction.start_angle()))?;

        // Force a reflow so the start angle is painted before animating
        flip.offset_height();

        classes.add_1(FLIP_VISIBLE_CLASS).map_err(js_error)?;
        set_style(self.slot_page(direction.covered_slot()), "visibility", "hidden")?;

        // Arm completion before the rotation starts
        if let Some(on_end) = self.on_flip_end.clone() {
            let on_timeout = Rc::clone(&on_end);
            self.flip_listener = Some(EventListener::once(&flip, "transitionend", move |_| {
                on_end()
            }));
            self.flip_timeout = Some(Timeout::new(self.flip_timeout_ms, move || on_timeout()));
        }

        let end = rotate(direction.end_angle());
        self.flip_frame = Some(request_animation_frame(move |_| {
            if let Err(err) = flip.class_list().add_1(FLIP_ANIMATING_CLASS) {
                log::warn!("flip animation class: {err:?}");
            }
            if let Err(err) = flip.style().set_property("transform", &end) {
                log::warn!("flip transform: {err:?}");
            }
        }));

        Ok(())
    }

    fn end_flip(&mut self, direction: FlipDirection) {
        // A pending frame would restart the rotation on a hidden surface
        self.flip_frame = None;

        if let Err(err) = self.page_flip.class_list().remove_3(
            FLIP_VISIBLE_CLASS,
            FLIP_ANIMATING_CLASS,
            FLIP_BACKWARD_CLASS,
        ) {
            log::warn!("could not reset flip surface: {err:?}");
        }
        clear_style(&self.page_flip, "transform");
        clear_style(self.slot_page(direction.covered_slot()), "visibility");
    }
}
