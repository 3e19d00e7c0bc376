//! WASM bindings for the reader

pub mod console;
mod dom;
mod session;

use crate::config::ReaderConfig;
use crate::error::Error;
use crate::Navigation;
use gloo::timers::callback::Timeout;
use js_sys::{Function, Promise};
use session::{with_reader, Session};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub use dom::DomDisplay;

thread_local! {
    /// Session mounted by [`mount_after_grace`]; lives for the page even if
    /// the resolved handle is dropped
    static GRACE_SESSION: RefCell<Option<Rc<Session>>> = const { RefCell::new(None) };
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsError::new(&err.to_string()).into()
    }
}

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::install(log::LevelFilter::Info);
}

fn parse_config(config_json: Option<String>) -> Result<ReaderConfig, Error> {
    let config = match config_json {
        Some(json) => ReaderConfig::from_json(&json)?,
        None => ReaderConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Activate the reader on the current page.
///
/// Returns `undefined` when the page has no book or is already mounted.
/// The returned handle owns the event wiring; dropping it detaches the
/// reader.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<Option<BookReader>, JsValue> {
    let config = parse_config(config_json)?;
    Ok(Session::mount(config)?.map(|session| BookReader {
        session: Rc::new(session),
    }))
}

/// Activate after the startup grace period so late stylesheets and fonts
/// are in place before the first measurement.
///
/// Resolves to the `BookReader`, or `undefined` when there is nothing to
/// mount. The session stays wired for the life of the page.
#[wasm_bindgen(js_name = mountAfterGrace)]
pub fn mount_after_grace(config_json: Option<String>) -> Result<Promise, JsValue> {
    let mut config = Some(parse_config(config_json)?);

    Ok(Promise::new(&mut |resolve: Function, reject: Function| {
        let Some(config) = config.take() else {
            return;
        };
        let grace_ms = config.startup_grace_ms;

        Timeout::new(grace_ms, move || {
            let settled = match Session::mount(config) {
                Ok(Some(session)) => {
                    let session = Rc::new(session);
                    GRACE_SESSION.with(|slot| slot.replace(Some(Rc::clone(&session))));
                    resolve.call1(&JsValue::UNDEFINED, &BookReader { session }.into())
                }
                Ok(None) => resolve.call1(&JsValue::UNDEFINED, &JsValue::UNDEFINED),
                Err(err) => {
                    log::error!("reader activation failed: {err}");
                    reject.call1(&JsValue::UNDEFINED, &err.into())
                }
            };
            if let Err(err) = settled {
                log::error!("could not settle mount promise: {err:?}");
            }
        })
        .forget();
    }))
}

/// JS handle to a mounted reader
#[wasm_bindgen]
pub struct BookReader {
    session: Rc<Session>,
}

#[wasm_bindgen]
impl BookReader {
    /// Turn forward. Returns false when the request was dropped.
    #[wasm_bindgen(js_name = goToNextPage)]
    pub fn go_to_next_page(&self) -> bool {
        self.navigate(|reader| reader.go_to_next_page())
    }

    /// Turn back. Returns false when the request was dropped.
    #[wasm_bindgen(js_name = goToPrevPage)]
    pub fn go_to_prev_page(&self) -> bool {
        self.navigate(|reader| reader.go_to_prev_page())
    }

    /// Zero-based index of the current page
    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> usize {
        self.session.reader().borrow().state().current_page_index
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.session.reader().borrow().pages().len()
    }

    /// Increments whenever the pages are rebuilt (activation, resize,
    /// content changes)
    #[wasm_bindgen(js_name = layoutGeneration)]
    pub fn layout_generation(&self) -> u32 {
        self.session.reader().borrow().layout_generation() as u32
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.session.reader().borrow().state().is_animating
    }

    /// JSON of the frame currently shown
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let reader = self.session.reader().borrow();
        let json = serde_json::to_string(&reader.frame()).map_err(Error::from)?;
        Ok(json)
    }
}

impl BookReader {
    fn navigate(
        &self,
        turn: impl FnOnce(&mut crate::Reader<DomDisplay>) -> Navigation,
    ) -> bool {
        matches!(
            with_reader(self.session.reader(), turn),
            Some(Navigation::Turned { .. } | Navigation::Flipping(_))
        )
    }
}
