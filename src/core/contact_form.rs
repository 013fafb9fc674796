use crate::config::site_config::ContactSettings;
use crate::core::timer::Deferred;
use crate::domain::model::{
    ContactField, ContactPayload, ContactReply, ElementId, SubmitOutcome, SubmitStart,
    ValidationReport,
};
use crate::domain::ports::{ContactTransport, Document};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::validate_contact;
use std::time::Duration;

pub const FORM_SELECTOR: &str = "#contactForm";
pub const SUBMIT_SELECTOR: &str = "#submitbtn";
pub const RESPONSE_SELECTOR: &str = "#responseMessage";
pub const POPUP_SELECTOR: &str = "#popupBox";

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Try again later.";

#[derive(Debug, Clone)]
struct FieldElements {
    input: ElementId,
    error: ElementId,
}

/// Contact form: validation, submission state and the confirmation popup.
#[derive(Debug, Clone)]
pub struct ContactForm {
    fields: [FieldElements; 4],
    form: ElementId,
    submit: Option<ElementId>,
    response: ElementId,
    popup: ElementId,
    settings: ContactSettings,
    popup_timer: Deferred,
    in_flight: bool,
}

impl ContactForm {
    pub fn attach<D: Document>(doc: &D, settings: ContactSettings) -> Result<Self> {
        let find = |selector: &str| doc.query(selector).ok_or_else(|| SiteError::missing(selector));

        let field = |f: ContactField| -> Result<FieldElements> {
            Ok(FieldElements {
                input: find(f.input_selector())?,
                error: find(f.error_selector())?,
            })
        };

        Ok(Self {
            fields: [
                field(ContactField::Name)?,
                field(ContactField::Email)?,
                field(ContactField::Subject)?,
                field(ContactField::Message)?,
            ],
            form: find(FORM_SELECTOR)?,
            submit: doc.query(SUBMIT_SELECTOR),
            response: find(RESPONSE_SELECTOR)?,
            popup: find(POPUP_SELECTOR)?,
            settings,
            popup_timer: Deferred::default(),
            in_flight: false,
        })
    }

    pub fn submit_element(&self) -> Option<ElementId> {
        self.submit
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_confirmation_visible<D: Document>(&self, doc: &D) -> bool {
        doc.style(self.popup, "display").as_deref() == Some("flex")
    }

    pub fn read_payload<D: Document>(&self, doc: &D) -> ContactPayload {
        let value = |f: ContactField| doc.value(self.fields[f as usize].input);
        ContactPayload {
            name: value(ContactField::Name),
            email: value(ContactField::Email),
            subject: value(ContactField::Subject),
            message: value(ContactField::Message),
        }
        .trimmed()
    }

    /// Clears every message, then writes the result of a full validation pass.
    pub fn validate<D: Document>(&self, doc: &mut D) -> ValidationReport {
        for field in &self.fields {
            doc.set_text(field.error, "");
        }
        doc.set_text(self.response, "");

        let report = validate_contact(&self.read_payload(doc));
        for (field, message) in report.errors() {
            doc.set_text(self.fields[field as usize].error, message);
        }
        report
    }

    /// Validates and, when the form is clean, marks a request as outstanding.
    pub fn prepare_submission<D: Document>(&mut self, doc: &mut D) -> SubmitStart {
        if self.in_flight {
            tracing::debug!("submit ignored, previous request still pending");
            return SubmitStart::Busy;
        }

        let report = self.validate(doc);
        if !report.is_valid() {
            tracing::debug!("contact form has {} invalid field(s)", report.error_count());
            return SubmitStart::Invalid(report);
        }

        self.in_flight = true;
        if let Some(button) = self.submit {
            doc.set_disabled(button, true);
        }
        SubmitStart::Ready(self.read_payload(doc))
    }

    /// Applies the transport result of a prepared submission.
    pub fn complete_submission<D: Document>(
        &mut self,
        doc: &mut D,
        now: Duration,
        result: Result<ContactReply>,
    ) -> SubmitOutcome {
        self.in_flight = false;
        if let Some(button) = self.submit {
            doc.set_disabled(button, false);
        }

        match result {
            Ok(ContactReply::Accepted { .. }) => {
                tracing::info!("contact message delivered");
                self.show_confirmation(doc, now);
                SubmitOutcome::Delivered
            }
            Ok(ContactReply::Rejected { status, message }) => {
                let message = message
                    .unwrap_or_else(|| format!("Request failed with status {}.", status));
                tracing::warn!("contact backend rejected message ({}): {}", status, message);
                doc.set_text(self.response, &message);
                SubmitOutcome::Rejected { message }
            }
            Err(e) => {
                tracing::warn!("contact submission failed: {}", e);
                doc.set_text(self.response, SERVER_ERROR_MESSAGE);
                SubmitOutcome::TransportFailed
            }
        }
    }

    /// Sends an already prepared payload and applies the result.
    pub async fn submit<D, T>(
        &mut self,
        doc: &mut D,
        transport: &T,
        payload: ContactPayload,
        now: Duration,
    ) -> SubmitOutcome
    where
        D: Document,
        T: ContactTransport + ?Sized,
    {
        let result = transport.send(&payload).await;
        self.complete_submission(doc, now, result)
    }

    /// Full submit-button flow: validate, send, report.
    pub async fn validate_and_submit<D, T>(
        &mut self,
        doc: &mut D,
        transport: &T,
        now: Duration,
    ) -> SubmitOutcome
    where
        D: Document,
        T: ContactTransport + ?Sized,
    {
        match self.prepare_submission(doc) {
            SubmitStart::Ready(payload) => self.submit(doc, transport, payload, now).await,
            SubmitStart::Invalid(report) => SubmitOutcome::Invalid {
                errors: report.error_count(),
            },
            SubmitStart::Busy => SubmitOutcome::Busy,
        }
    }

    pub fn show_confirmation<D: Document>(&mut self, doc: &mut D, now: Duration) {
        doc.set_style(self.popup, "display", "flex");
        self.popup_timer
            .schedule(now, self.settings.popup_dismiss());
    }

    pub fn dismiss_confirmation<D: Document>(&mut self, doc: &mut D) {
        self.popup_timer.cancel();
        doc.set_style(self.popup, "display", "none");
        doc.reset_form(self.form);
    }

    pub fn tick<D: Document>(&mut self, doc: &mut D, now: Duration) {
        if self.popup_timer.fire(now) {
            self.dismiss_confirmation(doc);
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.popup_timer.due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_dom::MemoryDocument;
    use crate::utils::validation::{NAME_REQUIRED, SUBJECT_REQUIRED};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
        reply: fn() -> Result<ContactReply>,
    }

    impl CountingTransport {
        fn new(reply: fn() -> Result<ContactReply>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContactTransport for CountingTransport {
        async fn send(&self, _payload: &ContactPayload) -> Result<ContactReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn accepted() -> Result<ContactReply> {
        Ok(ContactReply::Accepted {
            body: serde_json::json!({"success": true}),
        })
    }

    fn setup() -> (MemoryDocument, ContactForm) {
        let doc = MemoryDocument::default();
        let form = ContactForm::attach(&doc, ContactSettings::default()).unwrap();
        (doc, form)
    }

    fn fill(doc: &mut MemoryDocument, name: &str, email: &str, subject: &str, message: &str) {
        doc.fill("#name", name);
        doc.fill("#email", email);
        doc.fill("#subject", subject);
        doc.fill("#message", message);
    }

    fn text(doc: &MemoryDocument, selector: &str) -> String {
        doc.text(doc.query(selector).unwrap())
    }

    #[test]
    fn test_validate_writes_every_error() {
        let (mut doc, form) = setup();
        let report = form.validate(&mut doc);

        assert_eq!(report.error_count(), 4);
        assert_eq!(text(&doc, "#errorMessagefullName"), NAME_REQUIRED);
        assert_eq!(text(&doc, "#errMessageSubject"), SUBJECT_REQUIRED);
    }

    #[test]
    fn test_revalidation_clears_stale_messages() {
        let (mut doc, form) = setup();
        form.validate(&mut doc);
        let response = doc.query(RESPONSE_SELECTOR).unwrap();
        doc.set_text(response, "old reply");

        fill(&mut doc, "Ada", "ada@example.com", "", "Hi");
        let report = form.validate(&mut doc);

        assert_eq!(report.error_count(), 1);
        assert_eq!(text(&doc, "#errorMessagefullName"), "");
        assert_eq!(text(&doc, "#errMessageSubject"), SUBJECT_REQUIRED);
        assert_eq!(text(&doc, RESPONSE_SELECTOR), "");
    }

    #[test]
    fn test_values_are_trimmed() {
        let (mut doc, form) = setup();
        fill(&mut doc, "  John Doe ", " john@example.com", "Hi ", " Hello");
        let payload = form.read_payload(&doc);
        assert_eq!(payload.name, "John Doe");
        assert_eq!(payload.email, "john@example.com");
        assert!(form.validate(&mut doc).is_valid());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_transport() {
        let (mut doc, mut form) = setup();
        fill(&mut doc, "", "a@b.com", "s", "m");
        let transport = CountingTransport::new(accepted);

        let outcome = form
            .validate_and_submit(&mut doc, &transport, Duration::ZERO)
            .await;

        assert_eq!(outcome, SubmitOutcome::Invalid { errors: 1 });
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_second_submit_while_in_flight_is_busy() {
        let (mut doc, mut form) = setup();
        fill(&mut doc, "John Doe", "john@example.com", "Hi", "Hello");

        let first = form.prepare_submission(&mut doc);
        assert!(matches!(first, SubmitStart::Ready(_)));
        let button = form.submit_element().unwrap();
        assert!(doc.is_disabled(button));

        assert_eq!(form.prepare_submission(&mut doc), SubmitStart::Busy);

        form.complete_submission(&mut doc, Duration::ZERO, accepted());
        assert!(!doc.is_disabled(button));
        assert!(!form.is_in_flight());
    }

    #[test]
    fn test_rejection_shows_server_message_without_popup() {
        let (mut doc, mut form) = setup();
        let outcome = form.complete_submission(
            &mut doc,
            Duration::ZERO,
            Ok(ContactReply::Rejected {
                status: 400,
                message: Some("All fields required".to_string()),
            }),
        );

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: "All fields required".to_string()
            }
        );
        assert_eq!(text(&doc, RESPONSE_SELECTOR), "All fields required");
        assert!(!form.is_confirmation_visible(&doc));
    }

    #[test]
    fn test_rejection_without_message_names_status() {
        let (mut doc, mut form) = setup();
        form.complete_submission(
            &mut doc,
            Duration::ZERO,
            Ok(ContactReply::Rejected {
                status: 502,
                message: None,
            }),
        );
        assert_eq!(text(&doc, RESPONSE_SELECTOR), "Request failed with status 502.");
    }

    #[test]
    fn test_transport_error_shows_generic_message() {
        let (mut doc, mut form) = setup();
        let broken = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let outcome = form.complete_submission(&mut doc, Duration::ZERO, Err(broken.into()));

        assert_eq!(outcome, SubmitOutcome::TransportFailed);
        assert_eq!(text(&doc, RESPONSE_SELECTOR), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_popup_dismisses_after_two_seconds_and_resets_form() {
        let (mut doc, mut form) = setup();
        fill(&mut doc, "John Doe", "john@example.com", "Hi", "Hello");
        let start = Duration::from_millis(500);

        let payload = match form.prepare_submission(&mut doc) {
            SubmitStart::Ready(payload) => payload,
            other => panic!("expected ready, got {:?}", other),
        };
        let outcome = tokio_test::block_on(form.submit(
            &mut doc,
            &CountingTransport::new(accepted),
            payload,
            start,
        ));
        assert_eq!(outcome, SubmitOutcome::Delivered);
        assert!(form.is_confirmation_visible(&doc));
        assert_eq!(form.next_deadline(), Some(Duration::from_millis(2500)));

        form.tick(&mut doc, Duration::from_millis(2499));
        assert!(form.is_confirmation_visible(&doc));

        form.tick(&mut doc, Duration::from_millis(2500));
        assert!(!form.is_confirmation_visible(&doc));
        assert_eq!(doc.value(doc.query("#name").unwrap()), "");
        assert_eq!(doc.value(doc.query("#message").unwrap()), "");
    }
}
