use crate::config::site_config::SiteConfig;
use crate::core::contact_form::ContactForm;
use crate::core::menu::MenuController;
use crate::core::scroll_nav::ScrollNav;
use crate::core::timer::earliest;
use crate::core::video_modal::VideoModal;
use crate::domain::events::{Dispatch, EventOutcome, PageEvent};
use crate::domain::model::{ContactPayload, ContactReply, ElementId, SubmitOutcome, SubmitStart};
use crate::domain::ports::{ContactTransport, Document};
use crate::utils::error::Result;
use std::time::Duration;

/// Owns the page's document handle and the four controllers, and delivers
/// every page event to each controller's own handler.
///
/// A controller whose elements are missing is left unwired; the others keep
/// working.
pub struct SiteRuntime<D: Document> {
    document: D,
    config: SiteConfig,
    menu: Option<MenuController>,
    nav: Option<ScrollNav>,
    contact: Option<ContactForm>,
    video: VideoModal,
}

impl<D: Document> SiteRuntime<D> {
    /// Attaches and initializes every controller, as on DOM ready.
    pub fn boot(mut document: D, config: SiteConfig, now: Duration) -> Self {
        let menu = match MenuController::attach(&document, config.menu.clone()) {
            Ok(mut menu) => {
                menu.initialize(&mut document, now);
                Some(menu)
            }
            Err(e) => {
                tracing::warn!("mobile menu not wired: {}", e);
                None
            }
        };

        let nav = match ScrollNav::attach(&document, config.scrollspy.clone()) {
            Ok(mut nav) => {
                nav.initialize(&mut document);
                Some(nav)
            }
            Err(e) => {
                tracing::warn!("scroll navigation not wired: {}", e);
                None
            }
        };

        let contact = match ContactForm::attach(&document, config.contact.clone()) {
            Ok(form) => Some(form),
            Err(e) => {
                tracing::warn!("contact form not wired: {}", e);
                None
            }
        };

        let video = VideoModal::attach(&document);

        tracing::debug!(
            menu = menu.is_some(),
            scroll_nav = nav.is_some(),
            contact = contact.is_some(),
            video = video.is_wired(),
            "site controllers attached"
        );

        Self {
            document,
            config,
            menu,
            nav,
            contact,
            video,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn menu(&self) -> Option<&MenuController> {
        self.menu.as_ref()
    }

    pub fn nav(&self) -> Option<&ScrollNav> {
        self.nav.as_ref()
    }

    pub fn contact(&self) -> Option<&ContactForm> {
        self.contact.as_ref()
    }

    pub fn video(&self) -> &VideoModal {
        &self.video
    }

    pub fn dispatch(&mut self, event: PageEvent, now: Duration) -> Dispatch {
        let mut dispatch = Dispatch::default();

        match event {
            PageEvent::Click { target } => self.dispatch_click(target, &mut dispatch),
            PageEvent::KeyDown { key } => {
                // each controller reacts to its own state only; order is menu, then modal
                if let Some(menu) = self.menu.as_mut() {
                    menu.on_key_down(&mut self.document, &key);
                }
                self.video.on_key_down(&mut self.document, &key);
            }
            PageEvent::Resize => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.on_resize(now);
                }
            }
            PageEvent::Scroll => {
                if let Some(nav) = self.nav.as_mut() {
                    dispatch.needs_animation_frame = nav.on_scroll();
                }
            }
        }

        dispatch
    }

    fn dispatch_click(&mut self, target: ElementId, dispatch: &mut Dispatch) {
        let outcome: &mut EventOutcome = &mut dispatch.outcome;
        let doc = &mut self.document;

        if let Some(menu) = self.menu.as_mut() {
            if target == menu.toggle_element() {
                menu.on_toggle_click(doc, outcome);
                return;
            }
            if target == menu.overlay_element() {
                menu.on_overlay_click(doc);
            }
            if menu.owns_link(target) {
                menu.on_link_click(doc, target, outcome);
                // scroll nav owns the active marker; keep it in step with the menu's highlight
                if let (Some(nav), Some(href)) = (self.nav.as_mut(), doc.attribute(target, "href")) {
                    nav.set_active(doc, &href);
                }
            }
        }

        if let Some(nav) = self.nav.as_mut() {
            if nav.owns_link(target) {
                nav.on_link_click(doc, target, outcome);
            }
        }

        if let Some(contact) = self.contact.as_mut() {
            if contact.submit_element() == Some(target) {
                outcome.prevent_default();
                if let SubmitStart::Ready(payload) = contact.prepare_submission(doc) {
                    dispatch.pending_submission = Some(payload);
                }
            }
        }

        self.video.on_click(doc, target);
    }

    /// Runs the scroll-spy evaluation owed to a requested animation frame.
    pub fn on_animation_frame(&mut self) {
        if let Some(nav) = self.nav.as_mut() {
            nav.on_animation_frame(&mut self.document);
        }
    }

    /// Fires every timer due at `now`.
    pub fn tick(&mut self, now: Duration) {
        if let Some(menu) = self.menu.as_mut() {
            menu.tick(&mut self.document, now);
        }
        if let Some(contact) = self.contact.as_mut() {
            contact.tick(&mut self.document, now);
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([
            self.menu.as_ref().and_then(MenuController::next_deadline),
            self.contact.as_ref().and_then(ContactForm::next_deadline),
        ])
    }

    /// Applies the transport result of a submission returned by [`dispatch`](Self::dispatch).
    pub fn complete_submission(
        &mut self,
        result: Result<ContactReply>,
        now: Duration,
    ) -> Option<SubmitOutcome> {
        let contact = self.contact.as_mut()?;
        Some(contact.complete_submission(&mut self.document, now, result))
    }

    /// Sends a pending submission and applies the result.
    pub async fn send_submission<T>(
        &mut self,
        transport: &T,
        payload: ContactPayload,
        now: Duration,
    ) -> Option<SubmitOutcome>
    where
        T: ContactTransport + ?Sized,
    {
        let contact = self.contact.as_mut()?;
        Some(contact.submit(&mut self.document, transport, payload, now).await)
    }

    pub fn open_video(&mut self, source_url: &str) -> Result<()> {
        self.video.open(&mut self.document, source_url)
    }

    pub fn close_video(&mut self) -> Result<()> {
        self.video.close(&mut self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_dom::{ElementSpec, MemoryDocument};
    use crate::config::scenario::PageLayout;
    use crate::domain::events::ESCAPE;

    fn boot(width: f64) -> SiteRuntime<MemoryDocument> {
        let mut doc = MemoryDocument::default();
        doc.set_inner_width(width);
        SiteRuntime::boot(doc, SiteConfig::default(), Duration::ZERO)
    }

    fn click(runtime: &mut SiteRuntime<MemoryDocument>, selector: &str) -> Dispatch {
        let target = runtime.document().query(selector).unwrap();
        runtime.dispatch(PageEvent::click(target), Duration::ZERO)
    }

    #[test]
    fn test_boot_wires_every_controller() {
        let runtime = boot(1280.0);
        assert!(runtime.menu().is_some());
        assert!(runtime.nav().is_some());
        assert!(runtime.contact().is_some());
        assert!(runtime.video().is_wired());
        assert_eq!(runtime.next_deadline(), None);
    }

    #[test]
    fn test_bare_page_degrades_without_panicking() {
        let mut doc = MemoryDocument::new(1280.0);
        let stray = doc.append(ElementSpec::new("div"));
        let mut runtime = SiteRuntime::boot(doc, SiteConfig::default(), Duration::ZERO);

        assert!(runtime.menu().is_none());
        assert!(runtime.nav().is_none());
        assert!(runtime.contact().is_none());

        runtime.dispatch(PageEvent::click(stray), Duration::ZERO);
        runtime.dispatch(PageEvent::escape(), Duration::ZERO);
        assert!(runtime.open_video("https://x/embed").is_err());
    }

    #[test]
    fn test_escape_with_nothing_open_changes_nothing() {
        let mut runtime = boot(600.0);
        let before = runtime.document().clone();

        runtime.dispatch(PageEvent::escape(), Duration::ZERO);

        let body = runtime.document().body();
        assert_eq!(runtime.document().style(body, "overflow"), before.style(body, "overflow"));
        assert!(!runtime.menu().unwrap().is_open());
        assert!(!runtime.video().state().is_visible);
    }

    #[test]
    fn test_escape_closes_menu_and_modal_together() {
        let mut runtime = boot(600.0);
        click(&mut runtime, ".menu-toggle");
        runtime.open_video("https://x/embed").unwrap();

        runtime.dispatch(PageEvent::key(ESCAPE), Duration::ZERO);

        assert!(!runtime.menu().unwrap().is_open());
        assert!(!runtime.video().state().is_visible);
        let body = runtime.document().body();
        assert_eq!(runtime.document().style(body, "overflow"), None);
    }

    #[test]
    fn test_nav_click_issues_a_single_scroll() {
        let mut runtime = boot(1280.0);
        let dispatch = click(&mut runtime, "a");

        // first <a> is the home link: the menu leaves it alone, scroll nav scrolls to top
        assert!(dispatch.outcome.default_prevented);
        assert_eq!(runtime.document().scroll_log().len(), 1);

        let link = runtime.document().link("#team-section").unwrap();
        runtime.dispatch(PageEvent::click(link), Duration::ZERO);
        assert_eq!(runtime.document().scroll_log().len(), 2);
        assert_eq!(runtime.document().last_scroll().unwrap().top, 2920.0);
        assert_eq!(
            runtime.nav().unwrap().active().current_href.as_deref(),
            Some("#team-section")
        );
    }

    #[test]
    fn test_plain_page_link_keeps_active_marker_and_model_together() {
        let layout = PageLayout {
            nav_links: vec![
                "index.html".to_string(),
                "#about-section".to_string(),
                "careers.html".to_string(),
                "#missing-section".to_string(),
            ],
            ..PageLayout::default()
        };
        let mut runtime = SiteRuntime::boot(
            MemoryDocument::landing_page(&layout),
            SiteConfig::default(),
            Duration::ZERO,
        );

        for href in ["careers.html", "#missing-section"] {
            let link = runtime.document().link(href).unwrap();
            runtime.dispatch(PageEvent::click(link), Duration::ZERO);

            let doc = runtime.document();
            let marked: Vec<_> = doc
                .with_class("active")
                .into_iter()
                .map(|el| doc.attribute(el, "href"))
                .collect();
            assert_eq!(marked, vec![Some(href.to_string())]);
            assert_eq!(
                runtime.nav().unwrap().active().current_href.as_deref(),
                Some(href)
            );
        }
    }

    #[test]
    fn test_scroll_requests_one_frame() {
        let mut runtime = boot(1280.0);
        runtime.document_mut().set_scroll_y(1450.0);

        assert!(runtime.dispatch(PageEvent::Scroll, Duration::ZERO).needs_animation_frame);
        assert!(!runtime.dispatch(PageEvent::Scroll, Duration::ZERO).needs_animation_frame);

        runtime.on_animation_frame();
        assert_eq!(
            runtime.nav().unwrap().active().current_href.as_deref(),
            Some("#service-section")
        );
    }

    #[test]
    fn test_submit_click_hands_back_payload() {
        let mut runtime = boot(1280.0);
        let doc = runtime.document_mut();
        doc.fill("#name", "John Doe");
        doc.fill("#email", "john@example.com");
        doc.fill("#subject", "Hi");
        doc.fill("#message", "Hello");

        let dispatch = click(&mut runtime, "#submitbtn");
        let payload = dispatch.pending_submission.unwrap();
        assert_eq!(payload.name, "John Doe");

        let again = click(&mut runtime, "#submitbtn");
        assert!(again.pending_submission.is_none());

        let outcome = runtime.complete_submission(
            Ok(ContactReply::Accepted {
                body: serde_json::json!({}),
            }),
            Duration::from_millis(10),
        );
        assert_eq!(outcome, Some(SubmitOutcome::Delivered));
        assert_eq!(runtime.next_deadline(), Some(Duration::from_millis(2010)));
    }
}
