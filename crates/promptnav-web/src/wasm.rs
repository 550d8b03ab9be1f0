#![forbid(unsafe_code)]

//! `wasm-bindgen` binding: DOM host, observer, timers, and pointer wiring.
//!
//! Only compiled on `wasm32` targets. All session state lives in one
//! `Rc<RefCell<Runtime>>`; every callback holds a `Weak` to it and borrows it
//! for the duration of a single handler. Callbacks never propagate errors to
//! the page: failures are logged and the handler returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use core::time::Duration;

use js_sys::Array;
use tracing::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, MutationObserver, MutationObserverInit,
    PointerEvent, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use promptnav_core::{
    HostDocument, ManipulationRegion, MutationRecord, NavError, NavigatorConfig, OverlaySurface,
    PanelGeometry, PanelItem, PanelView, PointerPosition, RebuildOutcome, ScrollBehavior,
    ScrollBlock, ScrollOptions, SelectorExtractor, SyncSession,
};

use crate::clock::HostClock;
use crate::console_log;
use crate::observer::mutation_record;
use crate::style;

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "promptnav panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("promptnav panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_detail(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn host_error(operation: &'static str) -> impl Fn(JsValue) -> NavError {
    move |err| NavError::host(operation, js_detail(&err))
}

// ── Host document ───────────────────────────────────────────────────────

/// [`HostDocument`] over the live page.
#[derive(Debug, Clone)]
struct WebDocument {
    document: Document,
}

impl HostDocument for WebDocument {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            debug!(selector, "selector rejected by host");
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_first(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn query_text(&self, node: &Element, selector: &str) -> Option<String> {
        let found = node.query_selector(selector).ok().flatten()?;
        match found.dyn_into::<HtmlElement>() {
            Ok(html) => Some(html.inner_text()),
            Err(element) => element.text_content(),
        }
    }

    fn scroll_into_view(&self, node: &Element, options: ScrollOptions) {
        let js = ScrollIntoViewOptions::new();
        js.set_behavior(match options.behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        js.set_block(match options.block {
            ScrollBlock::Start => ScrollLogicalPosition::Start,
            ScrollBlock::Center => ScrollLogicalPosition::Center,
            ScrollBlock::End => ScrollLogicalPosition::End,
            ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
        });
        node.scroll_into_view_with_scroll_into_view_options(&js);
    }
}

// ── Overlay surface ─────────────────────────────────────────────────────

/// [`OverlaySurface`] that renders the panel into `document.body`.
#[derive(Debug, Clone)]
struct WebSurface {
    document: Document,
}

impl WebSurface {
    fn create(&self, tag: &str) -> Result<Element, NavError> {
        self.document
            .create_element(tag)
            .map_err(host_error("create_element"))
    }

    fn item_node(&self, item: &PanelItem<Element>) -> Result<Element, NavError> {
        let li = self.create("li")?;
        let button = self.create("button")?;
        let attrs = [
            ("type", "button"),
            ("title", item.tooltip.as_str()),
            ("style", style::BUTTON_STYLE),
        ];
        for (name, value) in attrs {
            button
                .set_attribute(name, value)
                .map_err(host_error("set_attribute"))?;
        }
        button
            .set_attribute(style::INDEX_ATTR, &item.index.to_string())
            .map_err(host_error("set_attribute"))?;
        button.set_text_content(Some(&item.label));
        li.append_child(&button)
            .map_err(host_error("append_child"))?;
        Ok(li)
    }

    fn fill_list(&self, list: &Element, items: &[PanelItem<Element>]) -> Result<(), NavError> {
        for item in items {
            let node = self.item_node(item)?;
            list.append_child(&node)
                .map_err(host_error("append_child"))?;
        }
        Ok(())
    }

    fn panel(&self, panel_id: &str) -> Option<Element> {
        self.document.get_element_by_id(panel_id)
    }

    /// Measured geometry of the attached panel.
    fn rendered_geometry(&self, panel_id: &str) -> Option<PanelGeometry> {
        let rect = self.panel(panel_id)?.get_bounding_client_rect();
        Some(PanelGeometry::new(
            rect.left(),
            rect.top(),
            rect.width(),
            rect.height(),
        ))
    }
}

impl OverlaySurface<Element> for WebSurface {
    fn body_available(&self) -> bool {
        self.document.body().is_some()
    }

    fn panel_present(&self, panel_id: &str) -> bool {
        self.panel(panel_id).is_some()
    }

    fn remove_panel(&mut self, panel_id: &str) -> usize {
        let mut removed = 0;
        while let Some(panel) = self.panel(panel_id) {
            panel.remove();
            removed += 1;
        }
        removed
    }

    fn mount_panel(
        &mut self,
        view: &PanelView<Element>,
        geometry: PanelGeometry,
    ) -> Result<(), NavError> {
        let body = self.document.body().ok_or(NavError::MountTargetUnavailable)?;

        let shell = self.create("div")?;
        shell.set_id(&view.panel_id);
        shell
            .set_attribute("style", &style::shell_style(geometry))
            .map_err(host_error("set_attribute"))?;

        let title = self.create("h3")?;
        title.set_text_content(Some(&view.title));
        title
            .set_attribute("style", style::HANDLE_STYLE)
            .map_err(host_error("set_attribute"))?;
        shell
            .append_child(&title)
            .map_err(host_error("append_child"))?;

        let list = self.create("ul")?;
        list.set_attribute("style", style::LIST_STYLE)
            .map_err(host_error("set_attribute"))?;
        self.fill_list(&list, &view.items)?;
        shell
            .append_child(&list)
            .map_err(host_error("append_child"))?;

        if view.resizable {
            let corner = self.create("div")?;
            corner.set_class_name(style::RESIZE_CLASS);
            corner
                .set_attribute("style", style::RESIZE_STYLE)
                .map_err(host_error("set_attribute"))?;
            shell
                .append_child(&corner)
                .map_err(host_error("append_child"))?;
        }

        body.append_child(&shell)
            .map_err(host_error("append_child"))?;
        Ok(())
    }

    fn replace_items(
        &mut self,
        panel_id: &str,
        items: &[PanelItem<Element>],
    ) -> Result<(), NavError> {
        let list = self
            .panel(panel_id)
            .and_then(|panel| panel.query_selector(":scope > ul").ok().flatten())
            .ok_or_else(|| NavError::host("replace_items", "item list missing"))?;
        list.set_inner_html("");
        self.fill_list(&list, items)
    }

    fn apply_geometry(&mut self, panel_id: &str, geometry: PanelGeometry) {
        let Some(panel) = self
            .panel(panel_id)
            .and_then(|panel| panel.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let css = panel.style();
        for (property, value) in style::geometry_properties(geometry) {
            if let Err(err) = css.set_property(property, &value) {
                debug!(property, detail = %js_detail(&err), "geometry update rejected");
            }
        }
    }
}

// ── Runtime ─────────────────────────────────────────────────────────────

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

struct Runtime {
    session: SyncSession<SelectorExtractor, Element>,
    document: WebDocument,
    surface: WebSurface,
    window: Window,
    clock: HostClock,
    observer: Option<(MutationObserver, Closure<dyn FnMut(Array, MutationObserver)>)>,
    listeners: Vec<Listener>,
    /// `(setTimeout handle, deadline)` of armed rebuild timers.
    timers: Vec<(i32, Duration)>,
}

type Shared = Rc<RefCell<Runtime>>;

impl Runtime {
    fn arm_timer(&mut self, weak: Weak<RefCell<Runtime>>, delay: Duration) {
        let now = self.clock.now();
        self.timers.retain(|(_, due)| *due > now);
        let callback = Closure::once_into_js(move || {
            if let Some(runtime) = weak.upgrade() {
                with_runtime(&runtime, Runtime::fire_timer);
            }
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis,
            ) {
            Ok(handle) => self.timers.push((handle, now.saturating_add(delay))),
            Err(err) => warn!(detail = %js_detail(&err), "setTimeout rejected"),
        }
    }

    fn fire_timer(&mut self) {
        let now = self.clock.now_at_least(self.session.next_deadline());
        if let Some(outcome) = self
            .session
            .poll(now, &self.document, &mut self.surface)
        {
            log_outcome(&outcome);
        }
    }

    fn on_mutations(&mut self, weak: Weak<RefCell<Runtime>>, records: &Array) {
        let panel = self.surface.panel(&self.session.config().panel_id);
        let batch: Vec<MutationRecord> = records
            .iter()
            .filter_map(|value| value.dyn_into::<web_sys::MutationRecord>().ok())
            .filter_map(|record| {
                mutation_record(&record.type_(), foreign_added_nodes(&record, panel.as_ref()))
            })
            .collect();
        let now = self.clock.now();
        if let Some(delay) = self.session.notify_mutations(&batch, now) {
            self.arm_timer(weak, delay);
        }
    }

    fn on_pointer_down(&mut self, event: &PointerEvent) {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        let panel_id = self.session.config().panel_id.clone();
        let matches = |selector: String| target.closest(&selector).ok().flatten().is_some();
        let region = style::classify_region(
            matches(style::handle_selector(&panel_id)),
            matches(style::resize_selector(&panel_id)),
        );
        let rendered = match region {
            ManipulationRegion::Outside => None,
            _ => self.surface.rendered_geometry(&panel_id),
        };
        let dispatch =
            self.session
                .pointer_down(region, pointer_id(event), pointer_position(event), rendered);
        if dispatch.accepted() {
            event.prevent_default();
        }
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) {
        let dispatch = self.session.pointer_move(
            pointer_id(event),
            pointer_position(event),
            &mut self.surface,
        );
        if dispatch.accepted() {
            event.prevent_default();
        }
    }

    fn on_click(&mut self, event: &Event) {
        let panel_id = &self.session.config().panel_id;
        let Some(button) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|target| target.closest(&style::item_selector(panel_id)).ok().flatten())
        else {
            return;
        };
        let Some(index) = button
            .get_attribute(style::INDEX_ATTR)
            .and_then(|raw| raw.parse::<usize>().ok())
        else {
            return;
        };
        if !self.session.activate(index, &self.document) {
            debug!(index, "activated item has no current target");
        }
    }

    fn stop(&mut self) {
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
        for (handle, _) in self.timers.drain(..) {
            self.window.clear_timeout_with_handle(handle);
        }
        for listener in self.listeners.drain(..) {
            if let Err(err) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            ) {
                debug!(
                    kind = listener.kind,
                    detail = %js_detail(&err),
                    "listener removal rejected"
                );
            }
        }
        self.session.stop(&mut self.surface);
    }
}

fn with_runtime(runtime: &Shared, f: impl FnOnce(&mut Runtime)) {
    match runtime.try_borrow_mut() {
        Ok(mut guard) => f(&mut guard),
        Err(_) => debug!("runtime busy; callback dropped"),
    }
}

/// Added nodes of `record` that are not part of the panel. The panel's own
/// mounts and item swaps land inside the observed subtree when the container
/// encloses the body, and must not schedule further rebuilds.
fn foreign_added_nodes(record: &web_sys::MutationRecord, panel: Option<&Element>) -> u32 {
    let added = record.added_nodes();
    let Some(panel) = panel else {
        return added.length();
    };
    let foreign = (0..added.length())
        .filter_map(|i| added.item(i))
        .filter(|node| !panel.contains(Some(node)))
        .count();
    u32::try_from(foreign).unwrap_or(u32::MAX)
}

fn pointer_id(event: &PointerEvent) -> u32 {
    u32::try_from(event.pointer_id()).unwrap_or_default()
}

fn pointer_position(event: &PointerEvent) -> PointerPosition {
    PointerPosition::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

fn log_outcome(outcome: &RebuildOutcome) {
    match outcome {
        RebuildOutcome::Mounted { items, removed } => {
            debug!(items, removed, "panel mounted");
        }
        RebuildOutcome::Reconciled { items } => debug!(items, "panel items reconciled"),
        RebuildOutcome::SkippedEmpty | RebuildOutcome::SkippedMountUnavailable => {
            debug!(outcome = ?outcome, "rebuild skipped");
        }
        RebuildOutcome::Failed(err) => warn!(error = %err, "rebuild failed"),
    }
}

fn listen(
    runtime: &Shared,
    target: &EventTarget,
    kind: &'static str,
    handler: fn(&mut Runtime, &Event),
) -> Result<Listener, JsValue> {
    let weak = Rc::downgrade(runtime);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(runtime) = weak.upgrade() {
            with_runtime(&runtime, |rt| handler(rt, &event));
        }
    });
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        kind,
        callback,
    })
}

fn as_pointer(event: &Event) -> Option<&PointerEvent> {
    event.dyn_ref::<PointerEvent>()
}

/// Document-wide listeners, installed once per session so interactions
/// continue outside the panel and survive remounts.
fn install_listeners(runtime: &Shared) -> Result<(), JsValue> {
    let (document, window): (EventTarget, EventTarget) = {
        let rt = runtime.borrow();
        (
            rt.document.document.clone().into(),
            rt.window.clone().into(),
        )
    };
    let listeners = vec![
        listen(runtime, &document, "pointerdown", |rt, event| {
            if let Some(event) = as_pointer(event) {
                rt.on_pointer_down(event);
            }
        })?,
        listen(runtime, &document, "pointermove", |rt, event| {
            if let Some(event) = as_pointer(event) {
                rt.on_pointer_move(event);
            }
        })?,
        listen(runtime, &document, "pointerup", |rt, event| {
            if let Some(event) = as_pointer(event) {
                rt.session.pointer_up(pointer_id(event));
            }
        })?,
        listen(runtime, &document, "pointercancel", |rt, _| {
            rt.session.cancel_interaction();
        })?,
        listen(runtime, &window, "blur", |rt, _| {
            rt.session.cancel_interaction();
        })?,
        listen(runtime, &document, "click", Runtime::on_click)?,
    ];
    runtime.borrow_mut().listeners.extend(listeners);
    Ok(())
}

fn observe(runtime: &Shared, container: &Element) -> Result<(), JsValue> {
    let weak = Rc::downgrade(runtime);
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            if let Some(runtime) = weak.upgrade() {
                let weak = Rc::downgrade(&runtime);
                with_runtime(&runtime, |rt| rt.on_mutations(weak, &records));
            }
        },
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(container, &init)?;
    runtime.borrow_mut().observer = Some((observer, callback));
    Ok(())
}

fn boot(config: NavigatorConfig) -> Result<Shared, JsValue> {
    config
        .validate()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let extractor = SelectorExtractor::from_config(&config);
    let runtime = Rc::new(RefCell::new(Runtime {
        session: SyncSession::new(config, extractor),
        document: WebDocument {
            document: document.clone(),
        },
        surface: WebSurface { document },
        window,
        clock: HostClock::new(),
        observer: None,
        listeners: Vec::new(),
        timers: Vec::new(),
    }));

    let report = {
        let mut rt = runtime.borrow_mut();
        let rt = &mut *rt;
        let now = rt.clock.now();
        let report = rt.session.start(&rt.document, now);
        rt.arm_timer(Rc::downgrade(&runtime), report.initial_delay);
        report
    };
    if let Some(container) = report.container {
        observe(&runtime, &container)?;
    }
    install_listeners(&runtime)?;
    info!("promptnav started");
    Ok(runtime)
}

thread_local! {
    static ACTIVE: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

/// Stop the active session, if any, and make `runtime` the active one.
fn replace_active(runtime: Option<Shared>) {
    let previous = ACTIVE.with(|active| active.replace(runtime));
    if let Some(previous) = previous {
        previous.borrow_mut().stop();
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    console_log::init(Level::INFO);
    match boot(NavigatorConfig::default()) {
        Ok(runtime) => replace_active(Some(runtime)),
        Err(err) => console_error(&format!("promptnav failed to start: {}", js_detail(&err))),
    }
}

/// Handle to the running navigator.
#[wasm_bindgen]
pub struct Navigator {
    runtime: Shared,
}

#[wasm_bindgen]
impl Navigator {
    /// Replace the running session with one using the given JSON config.
    #[wasm_bindgen(js_name = withConfigJson)]
    pub fn with_config_json(json: &str) -> Result<Navigator, JsValue> {
        let config = NavigatorConfig::from_json_str(json)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        replace_active(None);
        let runtime = boot(config)?;
        replace_active(Some(Rc::clone(&runtime)));
        Ok(Self { runtime })
    }

    /// Handle to the session started on load.
    pub fn active() -> Option<Navigator> {
        ACTIVE.with(|active| active.borrow().clone().map(|runtime| Self { runtime }))
    }

    /// Rebuild immediately, outside the scheduler. Returns the item count.
    #[wasm_bindgen(js_name = rebuildNow)]
    pub fn rebuild_now(&self) -> u32 {
        let mut count = 0;
        with_runtime(&self.runtime, |rt| {
            let outcome = rt.session.rebuild_now(&rt.document, &mut rt.surface);
            log_outcome(&outcome);
            count = u32::try_from(rt.session.item_count()).unwrap_or(u32::MAX);
        });
        count
    }

    #[wasm_bindgen(js_name = itemCount)]
    pub fn item_count(&self) -> u32 {
        u32::try_from(self.runtime.borrow().session.item_count()).unwrap_or(u32::MAX)
    }

    /// Disconnect the observer, clear timers and listeners, remove the panel.
    pub fn stop(&self) {
        with_runtime(&self.runtime, Runtime::stop);
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active
                .as_ref()
                .is_some_and(|current| Rc::ptr_eq(current, &self.runtime))
            {
                *active = None;
            }
        });
    }
}
