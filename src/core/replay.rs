use crate::adapters::memory_dom::MemoryDocument;
use crate::config::scenario::{Action, Scenario, Step};
use crate::core::contact_form::{POPUP_SELECTOR, RESPONSE_SELECTOR, SUBMIT_SELECTOR};
use crate::core::menu::NAV_SELECTOR;
use crate::core::runtime::SiteRuntime;
use crate::domain::events::PageEvent;
use crate::domain::model::{ContactField, ElementId, SubmitOutcome};
use crate::domain::ports::{ContactTransport, Document};
use crate::utils::error::{Result, SiteError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Final UI state after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub scenario: String,
    pub clock_ms: u64,
    pub menu_open: bool,
    pub nav_aria_hidden: Option<String>,
    pub scroll_locked: bool,
    pub active_href: Option<String>,
    pub scroll_y: f64,
    pub scroll_requests: usize,
    pub modal_visible: bool,
    pub media_src: String,
    pub popup_visible: bool,
    pub response_message: String,
    pub field_errors: BTreeMap<String, String>,
    pub submissions: Vec<SubmitOutcome>,
}

/// Drives a [`SiteRuntime`] over an in-memory landing page, step by step.
pub struct Replayer<'a, T: ContactTransport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: ContactTransport + ?Sized> Replayer<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn run(&self, scenario: &Scenario) -> Result<ReplayReport> {
        tracing::info!("▶️ Replaying scenario '{}' ({} steps)", scenario.name, scenario.steps.len());

        let document = MemoryDocument::landing_page(&scenario.page);
        let mut runtime = SiteRuntime::boot(document, scenario.site.clone(), Duration::ZERO);
        let mut submissions = Vec::new();

        for (i, step) in scenario.steps.iter().enumerate() {
            let now = Duration::from_millis(step.at_ms);
            runtime.tick(now);
            tracing::debug!("step {} at {}ms: {:?}", i, step.at_ms, step.action);

            if let Some(outcome) = self.apply(&mut runtime, step, now).await? {
                submissions.push(outcome);
            }
        }

        let end = scenario.end_at_ms();
        runtime.tick(Duration::from_millis(end));

        Ok(Self::report(&runtime, &scenario.name, end, submissions))
    }

    async fn apply(
        &self,
        runtime: &mut SiteRuntime<MemoryDocument>,
        step: &Step,
        now: Duration,
    ) -> Result<Option<SubmitOutcome>> {
        match &step.action {
            Action::Click { selector } => {
                let target = Self::find(runtime.document(), selector)?;
                runtime.dispatch(PageEvent::click(target), now);
            }
            Action::ClickLink { href } => {
                let target = runtime
                    .document()
                    .link(href)
                    .ok_or_else(|| SiteError::missing(format!(".nav-link[href=\"{}\"]", href)))?;
                runtime.dispatch(PageEvent::click(target), now);
            }
            Action::Key { key } => {
                runtime.dispatch(PageEvent::key(key.as_str()), now);
            }
            Action::Resize { width } => {
                runtime.document_mut().set_inner_width(*width);
                runtime.dispatch(PageEvent::Resize, now);
            }
            Action::Scroll { y } => {
                runtime.document_mut().set_scroll_y(*y);
                if runtime.dispatch(PageEvent::Scroll, now).needs_animation_frame {
                    runtime.on_animation_frame();
                }
            }
            Action::Fill { selector, value } => {
                if !runtime.document_mut().fill(selector, value) {
                    return Err(SiteError::missing(selector.as_str()));
                }
            }
            Action::Submit => return Ok(Some(self.submit(runtime, now).await?)),
        }
        Ok(None)
    }

    async fn submit(
        &self,
        runtime: &mut SiteRuntime<MemoryDocument>,
        now: Duration,
    ) -> Result<SubmitOutcome> {
        let button = runtime
            .contact()
            .and_then(|c| c.submit_element())
            .ok_or_else(|| SiteError::missing(SUBMIT_SELECTOR))?;

        let dispatch = runtime.dispatch(PageEvent::click(button), now);
        let outcome = match dispatch.pending_submission {
            Some(payload) => runtime
                .send_submission(self.transport, payload, now)
                .await
                .unwrap_or(SubmitOutcome::TransportFailed),
            None => Self::rejected_locally(runtime),
        };
        tracing::info!("📨 submission outcome: {:?}", outcome);
        Ok(outcome)
    }

    fn rejected_locally(runtime: &SiteRuntime<MemoryDocument>) -> SubmitOutcome {
        match runtime.contact() {
            Some(form) if form.is_in_flight() => SubmitOutcome::Busy,
            _ => SubmitOutcome::Invalid {
                errors: Self::field_errors(runtime.document()).len(),
            },
        }
    }

    fn find(doc: &MemoryDocument, selector: &str) -> Result<ElementId> {
        doc.query(selector).ok_or_else(|| SiteError::missing(selector))
    }

    fn field_errors(doc: &MemoryDocument) -> BTreeMap<String, String> {
        ContactField::ALL
            .iter()
            .filter_map(|field| {
                let text = doc.query(field.error_selector()).map(|el| doc.text(el))?;
                (!text.is_empty()).then(|| (field.to_string(), text))
            })
            .collect()
    }

    fn report(
        runtime: &SiteRuntime<MemoryDocument>,
        scenario: &str,
        clock_ms: u64,
        submissions: Vec<SubmitOutcome>,
    ) -> ReplayReport {
        let doc = runtime.document();
        let text_of = |selector: &str| doc.query(selector).map(|el| doc.text(el)).unwrap_or_default();

        ReplayReport {
            scenario: scenario.to_string(),
            clock_ms,
            menu_open: runtime.menu().map(|m| m.is_open()).unwrap_or(false),
            nav_aria_hidden: doc
                .query(NAV_SELECTOR)
                .and_then(|nav| doc.attribute(nav, "aria-hidden")),
            scroll_locked: doc.style(doc.body(), "overflow").as_deref() == Some("hidden"),
            active_href: runtime
                .nav()
                .and_then(|n| n.active().current_href.clone()),
            scroll_y: doc.scroll_y(),
            scroll_requests: doc.scroll_log().len(),
            modal_visible: runtime.video().state().is_visible,
            media_src: runtime.video().state().media_src.clone(),
            popup_visible: doc
                .query(POPUP_SELECTOR)
                .and_then(|p| doc.style(p, "display"))
                .as_deref()
                == Some("flex"),
            response_message: text_of(RESPONSE_SELECTOR),
            field_errors: Self::field_errors(doc),
            submissions,
        }
    }
}
