use crate::config::site_config::SiteConfig;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A scripted visit: a page layout plus the user input to replay against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub page: PageLayout,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Clock value the replay settles at; defaults to the last step.
    pub end_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub viewport_width: f64,
    pub header_height: f64,
    pub hash: Option<String>,
    pub sections: Vec<SectionLayout>,
    pub nav_links: Vec<String>,
    pub video_modal: bool,
    pub video_src: String,
    pub submit_button: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: String,
    pub top: f64,
    #[serde(default = "default_section_height")]
    pub height: f64,
}

fn default_section_height() -> f64 {
    800.0
}

impl Default for PageLayout {
    fn default() -> Self {
        let ids = [
            "about-section",
            "service-section",
            "testimonals-section",
            "team-section",
            "contact-form",
        ];
        let sections = ids
            .iter()
            .enumerate()
            .map(|(i, id)| SectionLayout {
                id: id.to_string(),
                top: 600.0 + 800.0 * i as f64,
                height: default_section_height(),
            })
            .collect();

        let mut nav_links = vec!["index.html".to_string()];
        nav_links.extend(ids.iter().map(|id| format!("#{}", id)));

        Self {
            viewport_width: 1280.0,
            header_height: 80.0,
            hash: None,
            sections,
            nav_links,
            video_modal: true,
            video_src: "https://www.youtube.com/embed/infinity-intro".to_string(),
            submit_button: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Click { selector: String },
    ClickLink { href: String },
    Key { key: String },
    Resize { width: f64 },
    Scroll { y: f64 },
    Fill { selector: String, value: String },
    Submit,
}

impl Scenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SiteError::ConfigValidationError {
            field: "scenario".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn end_at_ms(&self) -> u64 {
        let last = self.steps.iter().map(|s| s.at_ms).max().unwrap_or(0);
        self.end_at_ms.unwrap_or(last).max(last)
    }
}

impl Validate for Scenario {
    fn validate(&self) -> Result<()> {
        self.site.validate()?;
        validation::validate_non_negative("page.viewport_width", self.page.viewport_width)?;
        validation::validate_non_negative("page.header_height", self.page.header_height)?;

        let mut previous = 0;
        for (i, step) in self.steps.iter().enumerate() {
            if step.at_ms < previous {
                return Err(SiteError::InvalidConfigValueError {
                    field: format!("steps[{}].at_ms", i),
                    value: step.at_ms.to_string(),
                    reason: "Steps must be listed in time order".to_string(),
                });
            }
            previous = step.at_ms;
        }

        Ok(())
    }
}
