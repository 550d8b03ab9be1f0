#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use js_sys::{Function, Promise, Reflect};
use promptnav_web::Navigator;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, EventTarget, HtmlElement, PointerEvent, PointerEventInit};

wasm_bindgen_test_configure!(run_in_browser);

const CONFIG: &str = r#"{"panel_id":"promptnav-test","settle_delay_ms":60000}"#;

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("test page has a document")
}

fn message(document: &Document, role: &str, text: Option<&str>) -> Element {
    let outer = document.create_element("div").expect("create div");
    outer
        .set_attribute("data-message-author-role", role)
        .expect("set role");
    let wrapper = document.create_element("div").expect("create wrapper");
    wrapper.set_class_name("break-words");
    if let Some(text) = text {
        let inner = document.create_element("div").expect("create text node");
        inner.set_text_content(Some(text));
        wrapper.append_child(&inner).expect("append text");
    }
    outer.append_child(&wrapper).expect("append wrapper");
    outer
}

fn build_transcript(document: &Document, turns: &[(&str, Option<&str>)]) -> Element {
    if let Some(old) = document.query_selector("main").expect("query main") {
        old.remove();
    }
    let main = document.create_element("main").expect("create main");
    for (role, text) in turns {
        main.append_child(&message(document, role, *text))
            .expect("append message");
    }
    document
        .body()
        .expect("test page has a body")
        .append_child(&main)
        .expect("append main");
    main
}

/// Panel at (100, 100), 300x400, with rebuilds only on demand.
const PLACED: &str = r#"{
    "panel_id": "promptnav-test",
    "settle_delay_ms": 60000,
    "initial_geometry": {
        "position": { "x": 100.0, "y": 100.0 },
        "size": { "width": 300.0, "height": 400.0 }
    }
}"#;

fn panel_style(document: &Document, property: &str) -> String {
    let panel: HtmlElement = document
        .get_element_by_id("promptnav-test")
        .and_then(|panel| panel.dyn_into().ok())
        .expect("panel mounted");
    panel
        .style()
        .get_property_value(property)
        .expect("style readable")
}

fn pointer(target: &EventTarget, kind: &str, pointer_id: i32, x: i32, y: i32) {
    let init = PointerEventInit::new();
    init.set_pointer_id(pointer_id);
    init.set_client_x(x);
    init.set_client_y(y);
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = PointerEvent::new_with_event_init_dict(kind, &init).expect("pointer event");
    target.dispatch_event(&event).expect("dispatch");
}

fn panel_part(document: &Document, selector: &str) -> Element {
    document
        .query_selector(selector)
        .expect("query panel part")
        .expect("panel part present")
}

/// Replace `scrollIntoView` on `element` with a recorder writing the options
/// it was called with into `data-scrolled`.
fn record_scrolls(element: &Element) {
    let recorder = Function::new_with_args(
        "options",
        "this.setAttribute('data-scrolled', options.block + ':' + options.behavior);",
    );
    Reflect::set(element, &JsValue::from_str("scrollIntoView"), &recorder)
        .expect("install scroll recorder");
}

async fn sleep_ms(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("setTimeout");
    });
    JsFuture::from(promise).await.expect("timer resolves");
}

fn panel_count(document: &Document) -> u32 {
    document
        .query_selector_all("#promptnav-test")
        .expect("query panels")
        .length()
}

#[wasm_bindgen_test]
fn rebuild_lists_user_prompts_with_tooltips() {
    let document = document();
    build_transcript(
        &document,
        &[
            ("user", Some("first question")),
            ("assistant", Some("answer")),
            ("user", None),
            ("user", Some("second question")),
        ],
    );
    let navigator = Navigator::with_config_json(CONFIG).expect("valid config");

    assert_eq!(navigator.rebuild_now(), 2);
    assert_eq!(panel_count(&document), 1);

    let buttons = document
        .query_selector_all("#promptnav-test button")
        .expect("query buttons");
    assert_eq!(buttons.length(), 2);
    let first: Element = buttons
        .item(0)
        .and_then(|node| node.dyn_into().ok())
        .expect("button element");
    assert_eq!(first.text_content().as_deref(), Some("first question"));
    assert_eq!(first.get_attribute("title").as_deref(), Some("first question"));

    navigator.stop();
    assert_eq!(panel_count(&document), 0);
}

#[wasm_bindgen_test]
fn repeated_rebuilds_keep_a_single_panel() {
    let document = document();
    let main = build_transcript(&document, &[("user", Some("hello"))]);
    let navigator = Navigator::with_config_json(CONFIG).expect("valid config");

    for _ in 0..5 {
        navigator.rebuild_now();
    }
    main.append_child(&message(&document, "user", Some("again")))
        .expect("append message");
    assert_eq!(navigator.rebuild_now(), 2);
    assert_eq!(panel_count(&document), 1);
    assert_eq!(navigator.item_count(), 2);

    navigator.stop();
}

#[wasm_bindgen_test]
fn empty_transcript_mounts_nothing() {
    let document = document();
    build_transcript(&document, &[("assistant", Some("only me"))]);
    let navigator = Navigator::with_config_json(CONFIG).expect("valid config");

    assert_eq!(navigator.rebuild_now(), 0);
    assert_eq!(panel_count(&document), 0);

    navigator.stop();
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(Navigator::with_config_json(r#"{"debounce_ms":0}"#).is_err());
    assert!(Navigator::with_config_json("not json").is_err());
}

#[wasm_bindgen_test]
fn dragging_the_title_moves_the_panel_inline() {
    let document = document();
    build_transcript(&document, &[("user", Some("hello"))]);
    let navigator = Navigator::with_config_json(PLACED).expect("valid config");
    navigator.rebuild_now();
    assert_eq!(panel_style(&document, "left"), "100px");

    let title = panel_part(&document, "#promptnav-test > h3");
    pointer(&title, "pointerdown", 7, 110, 105);
    pointer(&document, "pointermove", 7, 200, 250);
    pointer(&document, "pointerup", 7, 200, 250);

    assert_eq!(panel_style(&document, "left"), "190px");
    assert_eq!(panel_style(&document, "top"), "245px");
    assert_eq!(panel_style(&document, "width"), "300px");

    // Released: further moves leave the panel where it is.
    pointer(&document, "pointermove", 7, 10, 10);
    assert_eq!(panel_style(&document, "left"), "190px");

    navigator.stop();
}

#[wasm_bindgen_test]
fn dragging_the_corner_resizes_with_clamping() {
    let document = document();
    build_transcript(&document, &[("user", Some("hello"))]);
    let navigator = Navigator::with_config_json(PLACED).expect("valid config");
    navigator.rebuild_now();

    let corner = panel_part(&document, "#promptnav-test > .promptnav-resize");
    pointer(&corner, "pointerdown", 3, 395, 495);
    pointer(&document, "pointermove", 3, 445, 475);
    assert_eq!(panel_style(&document, "width"), "350px");
    assert_eq!(panel_style(&document, "height"), "380px");
    assert_eq!(panel_style(&document, "left"), "100px");

    pointer(&document, "pointermove", 3, 0, 0);
    assert_eq!(panel_style(&document, "width"), "160px");
    assert_eq!(panel_style(&document, "height"), "48px");
    pointer(&document, "pointerup", 3, 0, 0);

    navigator.stop();
}

#[wasm_bindgen_test]
fn pressing_an_item_button_does_not_drag() {
    let document = document();
    build_transcript(&document, &[("user", Some("hello"))]);
    let navigator = Navigator::with_config_json(PLACED).expect("valid config");
    navigator.rebuild_now();

    let button = panel_part(&document, "#promptnav-test button");
    pointer(&button, "pointerdown", 5, 120, 150);
    pointer(&document, "pointermove", 5, 300, 300);
    pointer(&document, "pointerup", 5, 300, 300);
    assert_eq!(panel_style(&document, "left"), "100px");
    assert_eq!(panel_style(&document, "top"), "100px");

    navigator.stop();
}

#[wasm_bindgen_test]
fn clicking_an_item_scrolls_its_message_smoothly_to_center() {
    let document = document();
    let main = build_transcript(
        &document,
        &[
            ("user", Some("first")),
            ("assistant", Some("answer")),
            ("user", Some("second")),
        ],
    );
    let messages = main.children();
    let first = messages.item(0).expect("first message");
    let second = messages.item(2).expect("second message");
    record_scrolls(&first);
    record_scrolls(&second);

    let navigator = Navigator::with_config_json(CONFIG).expect("valid config");
    assert_eq!(navigator.rebuild_now(), 2);

    let button: HtmlElement = panel_part(
        &document,
        "#promptnav-test button[data-promptnav-index='1']",
    )
    .dyn_into()
    .expect("button is an html element");
    button.click();

    assert_eq!(
        second.get_attribute("data-scrolled").as_deref(),
        Some("center:smooth")
    );
    assert_eq!(first.get_attribute("data-scrolled"), None);

    navigator.stop();
}

#[wasm_bindgen_test]
async fn panel_writes_inside_the_observed_container_do_not_retrigger() {
    let document = document();
    build_transcript(&document, &[("user", Some("hello"))]);
    let config = r#"{"panel_id":"promptnav-test","container_selector":"body",
        "settle_delay_ms":60000,"debounce_ms":20}"#;
    let navigator = Navigator::with_config_json(config).expect("valid config");
    assert_eq!(navigator.rebuild_now(), 1);

    // A reconcile would replace this button with a fresh, unmarked one.
    let button = panel_part(&document, "#promptnav-test button");
    button
        .set_attribute("data-generation", "first")
        .expect("mark button");
    sleep_ms(150).await;

    let button = panel_part(&document, "#promptnav-test button");
    assert_eq!(
        button.get_attribute("data-generation").as_deref(),
        Some("first")
    );

    navigator.stop();
}
