use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element owned by a [`Document`](crate::domain::ports::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuState {
    pub is_open: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveLink {
    pub current_href: Option<String>,
}

/// Invariant: `is_visible == false` implies `media_src` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModalState {
    pub is_visible: bool,
    pub media_src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Subject,
        ContactField::Message,
    ];

    pub fn input_selector(self) -> &'static str {
        match self {
            ContactField::Name => "#name",
            ContactField::Email => "#email",
            ContactField::Subject => "#subject",
            ContactField::Message => "#message",
        }
    }

    pub fn error_selector(self) -> &'static str {
        match self {
            ContactField::Name => "#errorMessagefullName",
            ContactField::Email => "#errorMessageEmail",
            ContactField::Subject => "#errMessageSubject",
            ContactField::Message => "#errMessageMessage",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Subject => "subject",
            ContactField::Message => "message",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactPayload {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    /// Trims every field, matching what the form reads from its inputs.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: String,
}

impl FieldCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Result of one full validation pass over the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub name: FieldCheck,
    pub email: FieldCheck,
    pub subject: FieldCheck,
    pub message: FieldCheck,
}

impl ValidationReport {
    pub fn check(&self, field: ContactField) -> &FieldCheck {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    pub fn is_valid(&self) -> bool {
        ContactField::ALL.iter().all(|f| self.check(*f).valid)
    }

    pub fn errors(&self) -> Vec<(ContactField, &str)> {
        ContactField::ALL
            .iter()
            .filter_map(|f| {
                let check = self.check(*f);
                (!check.valid).then_some((*f, check.message.as_str()))
            })
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.errors().len()
    }
}

/// What the contact backend answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactReply {
    Accepted { body: serde_json::Value },
    Rejected { status: u16, message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Invalid { errors: usize },
    Busy,
    Delivered,
    Rejected { message: String },
    TransportFailed,
}

/// Result of starting a submission from the form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    Ready(ContactPayload),
    Invalid(ValidationReport),
    Busy,
}
