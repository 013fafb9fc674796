use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub api: ApiConfig,
    pub menu: MenuSettings,
    pub scrollspy: ScrollSpySettings,
    pub contact: ContactSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Widths at or below this are treated as mobile.
    pub breakpoint: u32,
    pub resize_debounce_ms: u64,
    pub hash_scroll_delay_ms: u64,
    pub hash_scroll_margin: f64,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            breakpoint: 991,
            resize_debounce_ms: 100,
            hash_scroll_delay_ms: 100,
            hash_scroll_margin: 20.0,
        }
    }
}

impl MenuSettings {
    pub fn is_mobile(&self, width: f64) -> bool {
        width <= f64::from(self.breakpoint)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn hash_scroll_delay(&self) -> Duration {
        Duration::from_millis(self.hash_scroll_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSpySettings {
    /// Approximate header height plus spacing.
    pub offset: f64,
    pub sections: Vec<String>,
    pub home_hrefs: Vec<String>,
}

impl Default for ScrollSpySettings {
    fn default() -> Self {
        Self {
            offset: 110.0,
            sections: [
                "#about-section",
                "#service-section",
                "#testimonals-section",
                "#team-section",
                "#contact-form",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            home_hrefs: ["index.html", "./index.html", "/index.html", "#top"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScrollSpySettings {
    pub fn is_home_href(&self, href: &str) -> bool {
        self.home_hrefs.iter().any(|h| h == href)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub popup_dismiss_ms: u64,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            popup_dismiss_ms: 2000,
        }
    }
}

impl ContactSettings {
    pub fn popup_dismiss(&self) -> Duration {
        Duration::from_millis(self.popup_dismiss_ms)
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::LazyLock;

        static PLACEHOLDER: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern compiles"));

        PLACEHOLDER
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 套用頁面層級的 API_BASE_URL 覆蓋值；空字串視為未設定
    pub fn with_api_base_override(mut self, base_url: Option<String>) -> Self {
        if let Some(base) = base_url.filter(|b| !b.trim().is_empty()) {
            tracing::debug!("API base overridden to {}", base);
            self.api.base_url = base.trim().to_string();
        }
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number(
            "menu.breakpoint",
            u64::from(self.menu.breakpoint),
            1,
        )?;
        validation::validate_non_negative("menu.hash_scroll_margin", self.menu.hash_scroll_margin)?;
        validation::validate_non_negative("scrollspy.offset", self.scrollspy.offset)?;
        validation::validate_fragment_selectors("scrollspy.sections", &self.scrollspy.sections)?;

        if self.scrollspy.home_hrefs.is_empty() {
            return Err(SiteError::MissingConfigError {
                field: "scrollspy.home_hrefs".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for SiteConfig {
    /// One trailing slash is stripped, so `http://host/` and `http://host` are equivalent.
    fn api_base_url(&self) -> String {
        let base = self.api.base_url.trim();
        base.strip_suffix('/').unwrap_or(base).to_string()
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
