use crate::domain::model::{ContactPayload, FieldCheck, ValidationReport};
use crate::utils::error::{Result, SiteError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("name pattern compiles"));

// quoted or dotted local part, then a dotted domain with a 2+ letter TLD or a bracketed IPv4 literal
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

pub const NAME_REQUIRED: &str = "Please enter your name.";
pub const NAME_INVALID: &str = "Please enter a valid name (letters and spaces only).";
pub const EMAIL_REQUIRED: &str = "Please enter your email.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const SUBJECT_REQUIRED: &str = "Please enter a subject.";
pub const MESSAGE_REQUIRED: &str = "Please enter your message.";

pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks every field independently; never stops at the first failure.
pub fn validate_contact(payload: &ContactPayload) -> ValidationReport {
    let name = if payload.name.is_empty() {
        FieldCheck::fail(NAME_REQUIRED)
    } else if !is_valid_name(&payload.name) {
        FieldCheck::fail(NAME_INVALID)
    } else {
        FieldCheck::ok()
    };

    let email = if payload.email.is_empty() {
        FieldCheck::fail(EMAIL_REQUIRED)
    } else if !is_valid_email(&payload.email) {
        FieldCheck::fail(EMAIL_INVALID)
    } else {
        FieldCheck::ok()
    };

    let subject = if payload.subject.is_empty() {
        FieldCheck::fail(SUBJECT_REQUIRED)
    } else {
        FieldCheck::ok()
    };

    let message = if payload.message.is_empty() {
        FieldCheck::fail(MESSAGE_REQUIRED)
    } else {
        FieldCheck::ok()
    };

    ValidationReport {
        name,
        email,
        subject,
        message,
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SiteError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number >= 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_fragment_selectors(field_name: &str, selectors: &[String]) -> Result<()> {
    if selectors.is_empty() {
        return Err(SiteError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for selector in selectors {
        let id = selector.strip_prefix('#').unwrap_or_default();
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(SiteError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: selector.clone(),
                reason: "Expected an id selector such as '#about-section'".to_string(),
            });
        }
    }

    Ok(())
}
