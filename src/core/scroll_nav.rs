use crate::config::site_config::ScrollSpySettings;
use crate::core::timer::FrameGate;
use crate::domain::events::EventOutcome;
use crate::domain::model::{ActiveLink, ElementId, ScrollBehavior};
use crate::domain::ports::Document;
use crate::utils::error::{Result, SiteError};

use super::menu::LINK_SELECTOR;

const ACTIVE: &str = "active";

pub mod scrollspy {
    /// Where the current scroll position lands relative to the tracked sections.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SpyDecision {
        Home,
        Section(usize),
        Unchanged,
    }

    /// `tops` are the document tops of the tracked sections, in page order.
    ///
    /// Above the first section (less the offset) the home link wins. Otherwise
    /// the scan runs bottom-up, so the deepest section already reached is picked.
    pub fn locate(scroll_pos: f64, offset: f64, tops: &[f64]) -> SpyDecision {
        let first_top = tops.first().copied().unwrap_or(0.0);
        if scroll_pos < (first_top - offset).max(0.0) {
            return SpyDecision::Home;
        }

        tops.iter()
            .rposition(|top| scroll_pos + offset >= *top)
            .map(SpyDecision::Section)
            .unwrap_or(SpyDecision::Unchanged)
    }
}

use scrollspy::SpyDecision;

#[derive(Debug, Clone)]
struct TrackedSection {
    element: ElementId,
    href: String,
}

/// Active-link tracking driven by nav clicks and by the scroll position.
#[derive(Debug, Clone)]
pub struct ScrollNav {
    links: Vec<ElementId>,
    sections: Vec<TrackedSection>,
    settings: ScrollSpySettings,
    active: ActiveLink,
    frame: FrameGate,
}

impl ScrollNav {
    pub fn attach<D: Document>(doc: &D, settings: ScrollSpySettings) -> Result<Self> {
        let links = doc.query_all(LINK_SELECTOR);
        if links.is_empty() {
            return Err(SiteError::missing(LINK_SELECTOR));
        }

        let sections = settings
            .sections
            .iter()
            .filter_map(|selector| match doc.query(selector) {
                Some(element) => Some(TrackedSection {
                    element,
                    href: selector.clone(),
                }),
                None => {
                    tracing::debug!("tracked section {} not on this page, skipping", selector);
                    None
                }
            })
            .collect();

        Ok(Self {
            links,
            sections,
            settings,
            active: ActiveLink::default(),
            frame: FrameGate::default(),
        })
    }

    /// Establishes the active link for the initial scroll position.
    pub fn initialize<D: Document>(&mut self, doc: &mut D) {
        self.evaluate(doc);
    }

    pub fn active(&self) -> &ActiveLink {
        &self.active
    }

    pub fn owns_link(&self, el: ElementId) -> bool {
        self.links.contains(&el)
    }

    pub fn tracked_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn set_active<D: Document>(&mut self, doc: &mut D, href: &str) {
        for el in &self.links {
            doc.remove_class(*el, ACTIVE);
        }

        let matched = self
            .links
            .iter()
            .copied()
            .find(|el| doc.attribute(*el, "href").as_deref() == Some(href));

        self.active.current_href = match matched {
            Some(el) => {
                doc.add_class(el, ACTIVE);
                Some(href.to_string())
            }
            None => None,
        };
    }

    pub fn on_link_click<D: Document>(
        &mut self,
        doc: &mut D,
        link: ElementId,
        outcome: &mut EventOutcome,
    ) {
        let Some(href) = doc.attribute(link, "href") else {
            return;
        };

        if self.settings.is_home_href(&href) {
            outcome.prevent_default();
            if !outcome.scroll_requested {
                doc.scroll_to(0.0, ScrollBehavior::Smooth);
                outcome.scroll_requested = true;
            }
            self.set_active(doc, &href);
            return;
        }

        if href.starts_with('#') {
            if let Some(target) = doc.query(&href) {
                outcome.prevent_default();
                if !outcome.scroll_requested {
                    doc.scroll_into_view(target);
                    outcome.scroll_requested = true;
                }
                self.set_active(doc, &href);
            }
        }
    }

    /// Returns `true` when the host must schedule an animation frame.
    pub fn on_scroll(&mut self) -> bool {
        self.frame.request()
    }

    pub fn on_animation_frame<D: Document>(&mut self, doc: &mut D) {
        if !self.frame.is_ticking() {
            return;
        }
        self.evaluate(doc);
        self.frame.complete();
    }

    pub fn frame_pending(&self) -> bool {
        self.frame.is_ticking()
    }

    fn evaluate<D: Document>(&mut self, doc: &mut D) {
        let tops: Vec<f64> = self
            .sections
            .iter()
            .map(|s| doc.offset_top(s.element))
            .collect();

        match scrollspy::locate(doc.scroll_y(), self.settings.offset, &tops) {
            SpyDecision::Home => self.activate_home(doc),
            SpyDecision::Section(i) => {
                let href = self.sections[i].href.clone();
                if self.active.current_href.as_deref() != Some(href.as_str()) {
                    tracing::debug!("section {} in view", href);
                }
                self.set_active(doc, &href);
            }
            SpyDecision::Unchanged => {}
        }
    }

    fn activate_home<D: Document>(&mut self, doc: &mut D) {
        let home = self.links.iter().copied().find_map(|el| {
            doc.attribute(el, "href")
                .filter(|href| self.settings.is_home_href(href))
        });

        match home {
            Some(href) => self.set_active(doc, &href),
            None => {
                for el in &self.links {
                    doc.remove_class(*el, ACTIVE);
                }
                self.active.current_href = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_dom::MemoryDocument;

    fn setup(scroll_y: f64) -> (MemoryDocument, ScrollNav) {
        let mut doc = MemoryDocument::default();
        doc.set_scroll_y(scroll_y);
        let mut nav = ScrollNav::attach(&doc, ScrollSpySettings::default()).unwrap();
        nav.initialize(&mut doc);
        (doc, nav)
    }

    #[test]
    fn test_locate_picks_deepest_reached_section() {
        let tops = [100.0, 500.0, 900.0];
        assert_eq!(scrollspy::locate(600.0, 110.0, &tops), SpyDecision::Section(1));
        assert_eq!(scrollspy::locate(790.0, 110.0, &tops), SpyDecision::Section(2));
        assert_eq!(scrollspy::locate(0.0, 110.0, &tops), SpyDecision::Section(0));
    }

    #[test]
    fn test_locate_home_above_first_section() {
        let tops = [600.0, 1400.0];
        assert_eq!(scrollspy::locate(100.0, 110.0, &tops), SpyDecision::Home);
        assert_eq!(scrollspy::locate(490.0, 110.0, &tops), SpyDecision::Section(0));
    }

    #[test]
    fn test_locate_without_sections_is_unchanged() {
        assert_eq!(scrollspy::locate(300.0, 110.0, &[]), SpyDecision::Unchanged);
    }

    #[test]
    fn test_initial_state_marks_home_at_top() {
        let (doc, nav) = setup(0.0);
        assert_eq!(nav.active().current_href.as_deref(), Some("index.html"));
        assert_eq!(nav.tracked_sections(), 5);
        assert_eq!(doc.with_class("active"), vec![doc.link("index.html").unwrap()]);
    }

    #[test]
    fn test_initial_state_respects_restored_scroll() {
        let (_doc, nav) = setup(2200.0);
        assert_eq!(nav.active().current_href.as_deref(), Some("#testimonals-section"));
    }

    #[test]
    fn test_scroll_burst_evaluates_once_per_frame() {
        let (mut doc, mut nav) = setup(0.0);

        doc.set_scroll_y(1500.0);
        assert!(nav.on_scroll());
        doc.set_scroll_y(3100.0);
        assert!(!nav.on_scroll());
        assert!(!nav.on_scroll());
        assert_eq!(nav.active().current_href.as_deref(), Some("index.html"));

        nav.on_animation_frame(&mut doc);
        assert_eq!(nav.active().current_href.as_deref(), Some("#team-section"));
        assert!(!nav.frame_pending());
        assert!(nav.on_scroll());
    }

    #[test]
    fn test_set_active_keeps_a_single_marker() {
        let (mut doc, mut nav) = setup(0.0);
        nav.set_active(&mut doc, "#team-section");
        nav.set_active(&mut doc, "#about-section");
        assert_eq!(doc.with_class("active"), vec![doc.link("#about-section").unwrap()]);

        nav.set_active(&mut doc, "#nowhere");
        assert!(doc.with_class("active").is_empty());
        assert_eq!(nav.active().current_href, None);
    }

    #[test]
    fn test_home_click_scrolls_to_top() {
        let (mut doc, mut nav) = setup(1800.0);
        let home = doc.link("index.html").unwrap();
        let mut outcome = EventOutcome::default();
        nav.on_link_click(&mut doc, home, &mut outcome);

        assert!(outcome.default_prevented);
        assert_eq!(doc.last_scroll().unwrap().top, 0.0);
        assert_eq!(nav.active().current_href.as_deref(), Some("index.html"));
    }

    #[test]
    fn test_fragment_click_scrolls_into_view() {
        let (mut doc, mut nav) = setup(0.0);
        let link = doc.link("#contact-form").unwrap();
        let mut outcome = EventOutcome::default();
        nav.on_link_click(&mut doc, link, &mut outcome);

        assert!(outcome.default_prevented);
        assert_eq!(doc.scroll_y(), 3800.0);
        assert_eq!(nav.active().current_href.as_deref(), Some("#contact-form"));
    }

    #[test]
    fn test_click_after_header_scroll_does_not_scroll_again() {
        let (mut doc, mut nav) = setup(0.0);
        let link = doc.link("#about-section").unwrap();
        let mut outcome = EventOutcome {
            scroll_requested: true,
            ..EventOutcome::default()
        };
        nav.on_link_click(&mut doc, link, &mut outcome);

        assert!(doc.scroll_log().is_empty());
        assert_eq!(nav.active().current_href.as_deref(), Some("#about-section"));
    }

    #[test]
    fn test_missing_sections_are_skipped() {
        let doc = MemoryDocument::default();
        let settings = ScrollSpySettings {
            sections: vec!["#about-section".to_string(), "#pricing".to_string()],
            ..ScrollSpySettings::default()
        };
        let nav = ScrollNav::attach(&doc, settings).unwrap();
        assert_eq!(nav.tracked_sections(), 1);
    }
}
