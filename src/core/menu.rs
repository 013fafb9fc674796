use crate::config::site_config::MenuSettings;
use crate::core::timer::{earliest, Deferred};
use crate::domain::events::{EventOutcome, ESCAPE};
use crate::domain::model::{ElementId, MenuState, ScrollBehavior};
use crate::domain::ports::Document;
use crate::utils::error::{Result, SiteError};
use std::time::Duration;

pub const TOGGLE_SELECTOR: &str = ".menu-toggle";
pub const NAV_SELECTOR: &str = ".main-nav";
pub const OVERLAY_SELECTOR: &str = ".menu-overlay";
pub const LINK_SELECTOR: &str = ".nav-link";
pub const HEADER_SELECTOR: &str = ".site-header";

const ACTIVE: &str = "active";
const NAV_ID: &str = "main-nav";

#[derive(Debug, Clone)]
struct MenuElements {
    toggle: ElementId,
    nav: ElementId,
    overlay: ElementId,
    links: Vec<ElementId>,
    header: Option<ElementId>,
}

/// Mobile navigation: open/closed state, ARIA wiring, scroll lock and the
/// desktop reset on resize.
#[derive(Debug, Clone)]
pub struct MenuController {
    elements: MenuElements,
    settings: MenuSettings,
    state: MenuState,
    resize_timer: Deferred,
    hash_scroll: Deferred,
    hash_target: Option<ElementId>,
}

impl MenuController {
    pub fn attach<D: Document>(doc: &D, settings: MenuSettings) -> Result<Self> {
        let find = |selector: &str| doc.query(selector).ok_or_else(|| SiteError::missing(selector));

        let toggle = find(TOGGLE_SELECTOR)?;
        let nav = find(NAV_SELECTOR)?;
        let overlay = find(OVERLAY_SELECTOR)?;
        let links = doc.query_all(LINK_SELECTOR);
        if links.is_empty() {
            return Err(SiteError::missing(LINK_SELECTOR));
        }

        let header = doc.query(HEADER_SELECTOR);
        if header.is_none() {
            tracing::warn!("{} not found, header offset treated as 0", HEADER_SELECTOR);
        }

        Ok(Self {
            elements: MenuElements {
                toggle,
                nav,
                overlay,
                links,
                header,
            },
            settings,
            state: MenuState::default(),
            resize_timer: Deferred::default(),
            hash_scroll: Deferred::default(),
            hash_target: None,
        })
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn toggle_element(&self) -> ElementId {
        self.elements.toggle
    }

    pub fn overlay_element(&self) -> ElementId {
        self.elements.overlay
    }

    pub fn owns_link(&self, el: ElementId) -> bool {
        self.elements.links.contains(&el)
    }

    pub fn initialize<D: Document>(&mut self, doc: &mut D, now: Duration) {
        let MenuElements { toggle, nav, .. } = self.elements;
        doc.set_attribute(toggle, "aria-expanded", "false");
        doc.set_attribute(toggle, "aria-controls", NAV_ID);
        doc.set_attribute(toggle, "aria-label", "Toggle navigation");
        doc.set_attribute(nav, "id", NAV_ID);
        doc.set_attribute(nav, "aria-hidden", "true");

        if self.settings.is_mobile(doc.inner_width()) {
            self.close(doc);
        } else {
            self.reset_for_desktop(doc);
        }

        if let Some(hash) = doc.location_hash() {
            match doc.query(&hash) {
                Some(target) => {
                    self.hash_target = Some(target);
                    self.hash_scroll
                        .schedule(now, self.settings.hash_scroll_delay());
                }
                None => tracing::debug!("URL fragment {} matches no element", hash),
            }
        }
    }

    pub fn toggle<D: Document>(&mut self, doc: &mut D) {
        if self.state.is_open {
            self.close(doc);
        } else {
            self.open(doc);
        }
    }

    pub fn open<D: Document>(&mut self, doc: &mut D) {
        let MenuElements {
            toggle,
            nav,
            overlay,
            ..
        } = self.elements;

        Self::lock_scroll(doc);
        for el in [toggle, nav, overlay] {
            doc.add_class(el, ACTIVE);
        }
        doc.set_attribute(toggle, "aria-expanded", "true");
        doc.set_attribute(nav, "aria-hidden", "false");

        self.state.is_open = true;
        tracing::debug!("menu opened");
    }

    pub fn close<D: Document>(&mut self, doc: &mut D) {
        let MenuElements {
            toggle,
            nav,
            overlay,
            ..
        } = self.elements;

        let (body, root) = (doc.body(), doc.root());
        doc.set_style(body, "overflow", "");
        doc.set_style(root, "overflow", "");
        for el in [toggle, nav, overlay] {
            doc.remove_class(el, ACTIVE);
        }
        doc.set_attribute(toggle, "aria-expanded", "false");
        doc.set_attribute(nav, "aria-hidden", "true");

        if self.state.is_open {
            tracing::debug!("menu closed");
        }
        self.state.is_open = false;
    }

    pub fn handle_resize<D: Document>(&mut self, doc: &mut D) {
        if self.settings.is_mobile(doc.inner_width()) {
            if self.state.is_open {
                Self::lock_scroll(doc);
            }
        } else {
            self.reset_for_desktop(doc);
        }
    }

    pub fn on_toggle_click<D: Document>(&mut self, doc: &mut D, outcome: &mut EventOutcome) {
        outcome.prevent_default();
        outcome.stop_propagation();
        self.toggle(doc);
    }

    pub fn on_overlay_click<D: Document>(&mut self, doc: &mut D) {
        self.close(doc);
    }

    pub fn on_link_click<D: Document>(
        &mut self,
        doc: &mut D,
        link: ElementId,
        outcome: &mut EventOutcome,
    ) {
        for el in &self.elements.links {
            doc.remove_class(*el, ACTIVE);
        }
        doc.add_class(link, ACTIVE);

        let href = doc.attribute(link, "href").unwrap_or_default();
        if href.starts_with('#') {
            outcome.prevent_default();
            if let Some(target) = doc.query(&href) {
                if self.state.is_open {
                    self.close(doc);
                }
                let top = self.offset_position(doc, target, 0.0);
                doc.scroll_to(top, ScrollBehavior::Smooth);
                outcome.scroll_requested = true;
            }
        }

        if self.settings.is_mobile(doc.inner_width()) {
            self.close(doc);
        }
    }

    pub fn on_key_down<D: Document>(&mut self, doc: &mut D, key: &str) {
        if key == ESCAPE && self.state.is_open {
            self.close(doc);
        }
    }

    /// Restarts the resize debounce.
    pub fn on_resize(&mut self, now: Duration) {
        self.resize_timer
            .schedule(now, self.settings.resize_debounce());
    }

    pub fn tick<D: Document>(&mut self, doc: &mut D, now: Duration) {
        if self.resize_timer.fire(now) {
            self.handle_resize(doc);
        }

        if self.hash_scroll.fire(now) {
            if let Some(target) = self.hash_target.take() {
                let top = self.offset_position(doc, target, self.settings.hash_scroll_margin);
                doc.scroll_to(top, ScrollBehavior::Smooth);
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([self.resize_timer.due(), self.hash_scroll.due()])
    }

    fn reset_for_desktop<D: Document>(&mut self, doc: &mut D) {
        self.close(doc);
        doc.clear_inline_style(self.elements.nav);
    }

    fn lock_scroll<D: Document>(doc: &mut D) {
        let (body, root) = (doc.body(), doc.root());
        doc.set_style(body, "overflow", "hidden");
        doc.set_style(root, "overflow", "hidden");
    }

    fn header_height<D: Document>(&self, doc: &D) -> f64 {
        self.elements
            .header
            .map(|h| doc.offset_height(h))
            .unwrap_or(0.0)
    }

    /// Window offset that puts `target` just below the fixed header.
    fn offset_position<D: Document>(&self, doc: &D, target: ElementId, margin: f64) -> f64 {
        doc.viewport_top(target) + doc.scroll_y() - self.header_height(doc) - margin
    }
}
