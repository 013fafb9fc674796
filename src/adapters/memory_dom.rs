//! In-memory [`Document`] used by the tests and by headless scenario replay.
//!
//! Only simple selectors are understood: `#id`, `.class` and a bare tag name.
//! Scrolling jumps immediately, and every request is kept in a log so callers
//! can assert on what the controllers asked the window to do.

use crate::config::scenario::PageLayout;
use crate::domain::model::{ElementId, ScrollBehavior, ScrollRequest};
use crate::domain::ports::Document;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    top: f64,
    height: f64,
    form: Option<ElementId>,
}

/// Builder for one element appended to a [`MemoryDocument`].
#[derive(Debug, Clone)]
pub struct ElementSpec {
    node: Node,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            node: Node {
                tag: tag.to_ascii_lowercase(),
                ..Node::default()
            },
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        self.node.classes.insert(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.node
            .style
            .insert(property.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.node.value = value.to_string();
        self
    }

    /// Document-relative top and height.
    pub fn layout(mut self, top: f64, height: f64) -> Self {
        self.node.top = top;
        self.node.height = height;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: ElementId,
    body: ElementId,
    inner_width: f64,
    scroll_y: f64,
    hash: Option<String>,
    scroll_log: Vec<ScrollRequest>,
}

impl MemoryDocument {
    pub fn new(inner_width: f64) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: ElementId(0),
            body: ElementId(0),
            inner_width,
            scroll_y: 0.0,
            hash: None,
            scroll_log: Vec::new(),
        };
        doc.root = doc.append(ElementSpec::new("html"));
        doc.body = doc.append(ElementSpec::new("body"));
        doc
    }

    /// Builds the full set of elements the site controllers expect.
    pub fn landing_page(layout: &PageLayout) -> Self {
        let mut doc = Self::new(layout.viewport_width);
        doc.hash = layout.hash.clone();

        doc.append(
            ElementSpec::new("header")
                .class("site-header")
                .layout(0.0, layout.header_height),
        );
        doc.append(ElementSpec::new("button").class("menu-toggle"));
        doc.append(ElementSpec::new("nav").class("main-nav"));
        for href in &layout.nav_links {
            doc.append(ElementSpec::new("a").class("nav-link").attr("href", href));
        }
        doc.append(ElementSpec::new("div").class("menu-overlay"));

        for section in &layout.sections {
            doc.append(
                ElementSpec::new("section")
                    .id(&section.id)
                    .layout(section.top, section.height),
            );
        }

        let form = doc.append(ElementSpec::new("form").id("contactForm"));
        doc.append_to_form(form, ElementSpec::new("input").id("name"));
        doc.append(ElementSpec::new("span").id("errorMessagefullName"));
        doc.append_to_form(form, ElementSpec::new("input").id("email"));
        doc.append(ElementSpec::new("span").id("errorMessageEmail"));
        doc.append_to_form(form, ElementSpec::new("input").id("subject"));
        doc.append(ElementSpec::new("span").id("errMessageSubject"));
        doc.append_to_form(form, ElementSpec::new("textarea").id("message"));
        doc.append(ElementSpec::new("span").id("errMessageMessage"));
        if layout.submit_button {
            doc.append_to_form(form, ElementSpec::new("button").id("submitbtn"));
        }
        doc.append(ElementSpec::new("p").id("responseMessage"));
        doc.append(
            ElementSpec::new("div")
                .id("popupBox")
                .style("display", "none"),
        );

        if layout.video_modal {
            doc.append(
                ElementSpec::new("button")
                    .class("video-trigger")
                    .attr("data-video-src", &layout.video_src),
            );
            doc.append(
                ElementSpec::new("div")
                    .id("videoModal")
                    .style("display", "none"),
            );
            doc.append(ElementSpec::new("div").class("modal-content"));
            doc.append(ElementSpec::new("iframe").id("videoFrame"));
            doc.append(ElementSpec::new("button").class("video-close"));
        }

        doc
    }

    pub fn append(&mut self, spec: ElementSpec) -> ElementId {
        self.nodes.push(spec.node);
        ElementId(self.nodes.len() - 1)
    }

    /// Appends a control that `reset_form(form)` restores to empty.
    pub fn append_to_form(&mut self, form: ElementId, spec: ElementSpec) -> ElementId {
        let el = self.append(spec);
        self.nodes[el.0].form = Some(form);
        el
    }

    pub fn set_value(&mut self, el: ElementId, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.value = value.to_string();
        }
    }

    /// Fills a control found by selector; returns `false` if nothing matched.
    pub fn fill(&mut self, selector: &str, value: &str) -> bool {
        match self.query(selector) {
            Some(el) => {
                self.set_value(el, value);
                true
            }
            None => false,
        }
    }

    pub fn set_inner_width(&mut self, width: f64) {
        self.inner_width = width;
    }

    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    pub fn set_hash(&mut self, hash: Option<&str>) {
        self.hash = hash.map(str::to_string);
    }

    pub fn is_disabled(&self, el: ElementId) -> bool {
        self.node(el).map(|n| n.disabled).unwrap_or(false)
    }

    pub fn has_inline_style(&self, el: ElementId) -> bool {
        self.node(el).map(|n| !n.style.is_empty()).unwrap_or(false)
    }

    pub fn scroll_log(&self) -> &[ScrollRequest] {
        &self.scroll_log
    }

    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.scroll_log.last().copied()
    }

    /// Nav link carrying a given `href`.
    pub fn link(&self, href: &str) -> Option<ElementId> {
        self.query_all(".nav-link")
            .into_iter()
            .find(|el| self.attribute(*el, "href").as_deref() == Some(href))
    }

    /// Every element currently carrying `class`.
    pub fn with_class(&self, class: &str) -> Vec<ElementId> {
        self.query_all(&format!(".{}", class))
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.0)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.0)
    }

    fn matches(node: &Node, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            node.attributes.get("id").map(String::as_str) == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            node.classes.contains(class)
        } else {
            node.tag.eq_ignore_ascii_case(selector)
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::landing_page(&PageLayout::default())
    }
}

impl Document for MemoryDocument {
    fn query(&self, selector: &str) -> Option<ElementId> {
        let selector = selector.trim();
        self.nodes
            .iter()
            .position(|n| Self::matches(n, selector))
            .map(ElementId)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let selector = selector.trim();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| Self::matches(n, selector))
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.node(el)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(node) = self.node_mut(el) {
            if name == "style" {
                node.style.clear();
            }
            node.attributes.remove(name);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).map(|n| n.classes.contains(class)).unwrap_or(false)
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.node_mut(el) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.node_mut(el) {
            node.classes.remove(class);
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.node(el)?.style.get(property).cloned()
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            if value.is_empty() {
                node.style.remove(property);
            } else {
                node.style.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn clear_inline_style(&mut self, el: ElementId) {
        self.remove_attribute(el, "style");
    }

    fn text(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.node_mut(el) {
            node.text = text.to_string();
        }
    }

    fn value(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_disabled(&mut self, el: ElementId, disabled: bool) {
        if let Some(node) = self.node_mut(el) {
            node.disabled = disabled;
        }
    }

    fn reset_form(&mut self, form: ElementId) {
        for node in self.nodes.iter_mut().filter(|n| n.form == Some(form)) {
            node.value.clear();
        }
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.node(el).map(|n| n.top).unwrap_or(0.0)
    }

    fn offset_height(&self, el: ElementId) -> f64 {
        self.node(el).map(|n| n.height).unwrap_or(0.0)
    }

    fn viewport_top(&self, el: ElementId) -> f64 {
        self.offset_top(el) - self.scroll_y
    }

    fn inner_width(&self) -> f64 {
        self.inner_width
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_log.push(ScrollRequest { top, behavior });
        self.scroll_y = top.max(0.0);
    }

    fn scroll_into_view(&mut self, el: ElementId) {
        let top = self.offset_top(el);
        self.scroll_to(top, ScrollBehavior::Smooth);
    }

    fn location_hash(&self) -> Option<String> {
        self.hash.clone().filter(|h| h.len() > 1)
    }
}
