use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Element not found: {selector}")]
    MissingElement { selector: String },
}

/// 錯誤分類：協作端、傳輸與頁面整合三種失敗來源，加上設定與系統錯誤
/// (欄位驗證錯誤不走 `Err`，由 `ValidationReport` 承載)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Collaborator,
    Transport,
    Integration,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn missing(selector: impl Into<String>) -> Self {
        SiteError::MissingElement {
            selector: selector.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::Http(e) if e.status().is_some() => ErrorCategory::Collaborator,
            SiteError::Http(_) | SiteError::Serialization(_) => ErrorCategory::Transport,
            SiteError::Io(_) => ErrorCategory::System,
            SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SiteError::MissingElement { .. } => ErrorCategory::Integration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Collaborator | ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Integration | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether a retry of the same action could succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Collaborator
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Transport | ErrorCategory::Collaborator => {
                "Server error. Try again later.".to_string()
            }
            ErrorCategory::Integration => format!("Page is missing an expected element ({})", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check that the contact backend is running and reachable",
            ErrorCategory::Collaborator => "Inspect the backend logs for the rejected request",
            ErrorCategory::Integration => "Check the page markup against the expected element ids",
            ErrorCategory::Configuration => "Fix the configuration file or the API_BASE_URL override",
            ErrorCategory::System => "Check file permissions and available resources",
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_is_integration_error() {
        let err = SiteError::missing("#videoModal");
        assert_eq!(err.category(), ErrorCategory::Integration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Element not found: #videoModal");
    }

    #[test]
    fn test_serialization_error_maps_to_transport() {
        let err: SiteError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.user_friendly_message(), "Server error. Try again later.");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_is_critical_and_not_retryable() {
        let err: SiteError = std::io::Error::new(std::io::ErrorKind::NotFound, "site.toml").into();
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_config_errors_are_configuration() {
        let err = SiteError::InvalidConfigValueError {
            field: "menu.breakpoint".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("menu.breakpoint"));
    }
}
