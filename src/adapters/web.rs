//! Browser host: [`Document`] over `web-sys` plus the event wiring that feeds
//! a [`SiteRuntime`] from real DOM events.

use crate::adapters::http::HttpContactClient;
use crate::config::SiteConfig;
use crate::core::runtime::SiteRuntime;
use crate::core::timer::{HostTimer, Rearm};
use crate::domain::events::PageEvent;
use crate::domain::model::{ElementId, ScrollBehavior};
use crate::domain::ports::{ContactTransport, Document};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

/// Elements a click may bubble up to that one of the controllers cares about.
/// The modal backdrop is left out: only a direct hit on it counts.
const INTERACTIVE: &str =
    ".menu-toggle, .menu-overlay, .nav-link, #submitbtn, [data-video-src], .video-close";

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    root: ElementId,
    body: ElementId,
    registry: RefCell<Vec<Element>>,
}

impl WebDocument {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let root_el = document.document_element()?;
        let body_el: Element = document.body()?.into();

        Some(Self {
            window,
            document,
            root: ElementId(0),
            body: ElementId(1),
            registry: RefCell::new(vec![root_el, body_el]),
        })
    }

    /// Handle for a live element, reusing the existing one if already known.
    pub fn handle(&self, el: Element) -> ElementId {
        let mut registry = self.registry.borrow_mut();
        if let Some(i) = registry.iter().position(|known| known.is_same_node(Some(&el))) {
            return ElementId(i);
        }
        registry.push(el);
        ElementId(registry.len() - 1)
    }

    fn element(&self, el: ElementId) -> Option<Element> {
        self.registry.borrow().get(el.0).cloned()
    }

    fn html(&self, el: ElementId) -> Option<HtmlElement> {
        self.element(el)?.dyn_into::<HtmlElement>().ok()
    }
}

impl Document for WebDocument {
    fn query(&self, selector: &str) -> Option<ElementId> {
        let el = self.document.query_selector(selector).ok()??;
        Some(self.handle(el))
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| self.handle(el))
            .collect()
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.element(el)?.get_attribute(name)
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(el) = self.element(el) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(el) = self.element(el) {
            let _ = el.remove_attribute(name);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el)
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(el) = self.element(el) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(el) = self.element(el) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        let value = self.html(el)?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        if let Some(el) = self.html(el) {
            let style = el.style();
            let _ = if value.is_empty() {
                style.remove_property(property).map(|_| ())
            } else {
                style.set_property(property, value)
            };
        }
    }

    fn clear_inline_style(&mut self, el: ElementId) {
        self.remove_attribute(el, "style");
    }

    fn text(&self, el: ElementId) -> String {
        self.element(el)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(el) = self.element(el) {
            el.set_text_content(Some(text));
        }
    }

    fn value(&self, el: ElementId) -> String {
        let Some(el) = self.element(el) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn set_disabled(&mut self, el: ElementId, disabled: bool) {
        if let Some(el) = self.element(el) {
            if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
                button.set_disabled(disabled);
            } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                input.set_disabled(disabled);
            }
        }
    }

    fn reset_form(&mut self, form: ElementId) {
        if let Some(form) = self
            .element(form)
            .and_then(|e| e.dyn_into::<HtmlFormElement>().ok())
        {
            form.reset();
        }
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.html(el).map(|e| f64::from(e.offset_top())).unwrap_or(0.0)
    }

    fn offset_height(&self, el: ElementId) -> f64 {
        self.html(el)
            .map(|e| f64::from(e.offset_height()))
            .unwrap_or(0.0)
    }

    fn viewport_top(&self, el: ElementId) -> f64 {
        self.element(el)
            .map(|e| e.get_bounding_client_rect().top())
            .unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(web_behavior(behavior));
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_into_view(&mut self, el: ElementId) {
        if let Some(el) = self.element(el) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(web_sys::ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            el.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn location_hash(&self) -> Option<String> {
        self.window
            .location()
            .hash()
            .ok()
            .filter(|h| h.len() > 1)
    }
}

fn web_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
    }
}

type SharedRuntime = Rc<RefCell<SiteRuntime<WebDocument>>>;

thread_local! {
    static SITE: RefCell<Option<Host>> = const { RefCell::new(None) };
}

#[derive(Clone)]
struct Host {
    runtime: SharedRuntime,
    transport: Rc<HttpContactClient>,
    window: Window,
    timer: Rc<RefCell<HostTimer<i32>>>,
}

impl Host {
    fn now(&self) -> Duration {
        let ms = self
            .window
            .performance()
            .map(|p| p.now())
            .unwrap_or_default();
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }

    /// Keeps exactly one timeout armed for the runtime's next deadline.
    fn arm_timer(&self) {
        let next = self.runtime.borrow().next_deadline();
        let Rearm { clear, arm } = self.timer.borrow_mut().plan(next);

        if let Some(stale) = clear {
            self.window.clear_timeout_with_handle(stale);
        }
        let Some(due) = arm else {
            return;
        };
        let delay = due.saturating_sub(self.now()).as_millis() as i32;

        let host = self.clone();
        let callback = Closure::once_into_js(move || {
            host.timer.borrow_mut().fired();
            let now = host.now();
            host.runtime.borrow_mut().tick(now);
            host.arm_timer();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            Ok(handle) => self.timer.borrow_mut().armed(handle, due),
            Err(_) => tracing::warn!("could not arm timer for {:?}", due),
        }
    }

    fn request_frame(&self) {
        let host = self.clone();
        let callback = Closure::once_into_js(move || {
            host.runtime.borrow_mut().on_animation_frame();
        });
        let _ = self.window.request_animation_frame(callback.unchecked_ref());
    }

    fn dispatch(&self, event: PageEvent) -> crate::domain::events::Dispatch {
        let now = self.now();
        let dispatch = self.runtime.borrow_mut().dispatch(event, now);

        if dispatch.needs_animation_frame {
            self.request_frame();
        }
        if let Some(payload) = dispatch.pending_submission.clone() {
            let host = self.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = host.transport.send(&payload).await;
                let now = host.now();
                host.runtime.borrow_mut().complete_submission(result, now);
                host.arm_timer();
            });
        }
        self.arm_timer();
        dispatch
    }

    fn listen<E, F>(target: &web_sys::EventTarget, kind: &str, handler: F)
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let mut handler = handler;
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        });
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            tracing::warn!("could not listen for {}", kind);
        }
        // listeners live as long as the page
        closure.forget();
    }
}

fn api_base_override(window: &Window) -> Option<String> {
    js_sys::Reflect::get(window, &JsValue::from_str("API_BASE_URL"))
        .ok()
        .and_then(|v| v.as_string())
}

/// Attaches the site controllers to the current page. Call once the DOM is ready.
#[wasm_bindgen(js_name = bootSite)]
pub fn boot_site() -> Result<(), JsValue> {
    crate::utils::logger::init_web_logger();

    let document = WebDocument::new().ok_or_else(|| JsValue::from_str("no browser document"))?;
    let window = document.window.clone();
    let dom = document.document.clone();

    let config = SiteConfig::default().with_api_base_override(api_base_override(&window));
    let transport = Rc::new(HttpContactClient::new(&config));

    let start = window.performance().map(|p| p.now()).unwrap_or_default();
    let runtime = SiteRuntime::boot(
        document,
        config,
        Duration::from_secs_f64(start.max(0.0) / 1000.0),
    );
    let host = Host {
        runtime: Rc::new(RefCell::new(runtime)),
        transport,
        window: window.clone(),
        timer: Rc::new(RefCell::new(HostTimer::default())),
    };
    host.arm_timer();

    {
        let host = host.clone();
        Host::listen(&dom, "click", move |event: web_sys::MouseEvent| {
            let Some(raw) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let effective = raw.closest(INTERACTIVE).ok().flatten().unwrap_or(raw);
            let target = host.runtime.borrow().document().handle(effective);

            let dispatch = host.dispatch(PageEvent::click(target));
            if dispatch.outcome.default_prevented {
                event.prevent_default();
            }
            if dispatch.outcome.propagation_stopped {
                event.stop_propagation();
            }
        });
    }

    {
        let host = host.clone();
        Host::listen(&dom, "keydown", move |event: web_sys::KeyboardEvent| {
            host.dispatch(PageEvent::key(event.key()));
        });
    }

    {
        let host = host.clone();
        Host::listen(&window, "resize", move |_: web_sys::Event| {
            host.dispatch(PageEvent::Resize);
        });
    }

    {
        let host = host.clone();
        Host::listen(&window, "scroll", move |_: web_sys::Event| {
            host.dispatch(PageEvent::Scroll);
        });
    }

    SITE.with(|site| *site.borrow_mut() = Some(host));
    Ok(())
}

/// Inline `onclick="openVideo(...)"` entry point.
#[wasm_bindgen(js_name = openVideo)]
pub fn open_video(source_url: &str) {
    SITE.with(|site| {
        if let Some(host) = site.borrow().as_ref() {
            if let Err(e) = host.runtime.borrow_mut().open_video(source_url) {
                tracing::error!("{}", e);
            }
        }
    });
}

#[wasm_bindgen(js_name = closeVideo)]
pub fn close_video() {
    SITE.with(|site| {
        if let Some(host) = site.borrow().as_ref() {
            if let Err(e) = host.runtime.borrow_mut().close_video() {
                tracing::error!("{}", e);
            }
        }
    });
}
