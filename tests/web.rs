//! Browser tests for the DOM binding (wasm-pack test --headless --firefox)

#![cfg(target_arch = "wasm32")]

use flipbook_reader::wasm::{mount, mount_after_grace};
use gloo::timers::callback::Timeout;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event};

wasm_bindgen_test_configure!(run_in_browser);

const TALL_PARAGRAPHS: &str = "#post-content p { height: 2000px; margin: 0; }";

fn book(header: &str, style: &str) -> String {
    format!(
        r#"
<style>{style}</style>
<header id="post-header">{header}</header>
<div id="post-content">
  <p>First paragraph.</p>
  <p>Second paragraph.</p>
  <button class="share-button">Share</button>
</div>
<div id="related-posts"><a href="/other">Other</a></div>
<div id="book-container">
  <div id="book-page-left"><div id="page-left-content"></div></div>
  <div id="book-page-right"><div id="page-right-content"></div></div>
  <div id="book-page-flip">
    <div id="page-flip-front"></div>
    <div id="page-flip-back"></div>
  </div>
</div>
<button id="book-nav-prev"></button>
<button id="book-nav-next"></button>
<span id="book-page-counter"></span>
<div id="book-announcer"></div>
<div id="related-posts-target"></div>
<div id="book-share-wrap"></div>
"#
    )
}

fn set_body(html: &str) -> Document {
    let document = web_sys::window().unwrap().document().unwrap();
    document.body().unwrap().set_inner_html(html);
    document
}

fn by_id(document: &Document, id: &str) -> Element {
    document.get_element_by_id(id).unwrap()
}

async fn sleep(ms: u32) {
    let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
        Timeout::new(ms, move || {
            resolve.call0(&JsValue::UNDEFINED).unwrap();
        })
        .forget();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn test_mount_without_book_is_noop() {
    set_body("<p>not a post</p>");
    assert!(mount(None).unwrap().is_none());
}

#[wasm_bindgen_test]
fn test_mount_prepares_book() {
    let document = set_body(&book("<h1>A Post</h1>", ""));
    let reader = mount(None).unwrap().expect("book anchors present");

    assert!(reader.page_count() >= 1);
    assert_eq!(reader.current_page(), 0);
    assert!(!reader.is_animating());
    assert!(!reader.go_to_prev_page());

    let content = by_id(&document, "post-content");
    let first = content.first_element_child().unwrap();
    assert_eq!(first.class_name(), "book-cover-block");

    let share = by_id(&document, "book-share-wrap");
    assert!(share.query_selector(".share-button").unwrap().is_some());

    let related = by_id(&document, "related-posts-target");
    assert!(related.inner_html().contains("/other"));

    let counter = by_id(&document, "book-page-counter");
    assert_eq!(
        counter.text_content().unwrap(),
        format!("Page 1 of {}", reader.page_count())
    );

    let snapshot = reader.snapshot().unwrap();
    assert!(snapshot.contains("\"status\""));
}

#[wasm_bindgen_test]
fn test_second_mount_is_refused() {
    let document = set_body(&book("<h1>A Post</h1>", ""));
    let reader = mount(None).unwrap().expect("first mount");
    let pages = reader.page_count();

    assert!(mount(None).unwrap().is_none());

    let covers = by_id(&document, "post-content")
        .query_selector_all(".book-cover-block")
        .unwrap();
    assert_eq!(covers.length(), 1);
    assert_eq!(reader.page_count(), pages);
}

#[wasm_bindgen_test]
fn test_bad_config_is_rejected() {
    set_body(&book("", ""));
    assert!(mount(Some("{\"minPageHeight\": -1}".into())).is_err());
}

#[wasm_bindgen_test]
async fn test_resize_burst_repaginates_once() {
    let document = set_body(&book("<h1>A Post</h1>", ""));
    let reader = mount(Some("{\"resizeDebounceMs\": 100}".into()))
        .unwrap()
        .unwrap();
    assert_eq!(reader.layout_generation(), 1);

    // Taller blocks only show up once the reader measures again
    let style = document.create_element("style").unwrap();
    style.set_text_content(Some(TALL_PARAGRAPHS));
    document.body().unwrap().append_child(&style).unwrap();

    let window = web_sys::window().unwrap();
    for _ in 0..3 {
        window
            .dispatch_event(&Event::new("resize").unwrap())
            .unwrap();
    }

    sleep(30).await;
    assert_eq!(reader.layout_generation(), 1);

    sleep(250).await;
    assert_eq!(reader.layout_generation(), 2);
    assert!(reader.page_count() >= 3);
}

#[wasm_bindgen_test]
async fn test_highlight_reaches_visible_page() {
    let document = set_body(&book("", ""));
    let reader = mount(None).unwrap().unwrap();

    let paragraph = document
        .query_selector("#post-content p")
        .unwrap()
        .unwrap();
    paragraph.set_inner_html("<mark>First</mark> paragraph.");

    sleep(20).await;
    let right = by_id(&document, "page-right-content");
    assert!(right.inner_html().contains("<mark>First</mark>"));
    // Highlights refresh the visible page without repaginating
    assert_eq!(reader.layout_generation(), 1);
}

#[wasm_bindgen_test]
async fn test_flip_completes_on_fallback_timer() {
    let document = set_body(&book("", TALL_PARAGRAPHS));
    let config = r#"{"singlePageBreakpoint": 0, "flipTimeoutMs": 150}"#;
    let reader = mount(Some(config.into())).unwrap().unwrap();
    assert!(reader.page_count() >= 2);

    assert!(reader.go_to_next_page());
    assert!(reader.is_animating());
    assert!(!reader.go_to_next_page());

    let flip = by_id(&document, "book-page-flip");
    assert!(flip.class_list().contains("book-page-flip-visible"));

    sleep(400).await;
    assert!(!reader.is_animating());
    assert_eq!(reader.current_page(), 1);
    assert!(!flip.class_list().contains("book-page-flip-visible"));
}

#[wasm_bindgen_test]
async fn test_mount_after_grace_resolves_reader() {
    set_body(&book("<h1>A Post</h1>", ""));
    let promise = mount_after_grace(Some("{\"startupGraceMs\": 10}".into())).unwrap();

    let handle = JsFuture::from(promise).await.unwrap();
    assert!(!handle.is_undefined());

    let page_count: Function = Reflect::get(&handle, &"pageCount".into())
        .unwrap()
        .dyn_into()
        .unwrap();
    let pages = page_count.call0(&handle).unwrap().as_f64().unwrap();
    assert!(pages >= 1.0);

    // The page is taken
    assert!(mount(None).unwrap().is_none());
}
