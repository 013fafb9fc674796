use crate::config::site_config::SiteConfig;
use crate::domain::model::ContactPayload;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "site-kit")]
#[command(about = "Landing page controllers: contact delivery, backend checks and scenario replay")]
pub struct CliConfig {
    /// 站點設定檔 (TOML)；未指定時使用預設值
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆蓋 API 基底網址
    #[arg(long, env = "API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a contact message and post it to the backend
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Probe the backend health endpoint
    Ping,
    /// Load and validate a site configuration file
    CheckConfig { path: PathBuf },
    /// Replay a page interaction scenario and print the final UI state
    Replay { path: PathBuf },
}

impl CliConfig {
    /// 載入站點設定並套用命令列覆蓋值
    pub fn site_config(&self) -> Result<SiteConfig> {
        let base = match &self.config {
            Some(path) => {
                tracing::debug!("Loading site config from {}", path.display());
                SiteConfig::from_file(path)?
            }
            None => SiteConfig::default(),
        };
        Ok(base.with_api_base_override(self.api_base_url.clone()))
    }
}

impl Command {
    pub fn contact_payload(&self) -> Option<ContactPayload> {
        match self {
            Command::Contact {
                name,
                email,
                subject,
                message,
            } => Some(ContactPayload {
                name: name.clone(),
                email: email.clone(),
                subject: subject.clone(),
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;

    #[test]
    fn test_parse_contact_command() {
        let cli = CliConfig::try_parse_from([
            "site-kit",
            "contact",
            "--name",
            "John Doe",
            "--email",
            "john@example.com",
            "--subject",
            "Hi",
            "--message",
            "Hello",
        ])
        .unwrap();

        let payload = cli.command.contact_payload().unwrap();
        assert_eq!(payload.name, "John Doe");
        assert_eq!(payload.message, "Hello");
    }

    #[test]
    fn test_api_base_flag_overrides_default() {
        let cli = CliConfig::try_parse_from([
            "site-kit",
            "--api-base-url",
            "https://api.example.com/",
            "ping",
        ])
        .unwrap();

        let config = cli.site_config().unwrap();
        assert_eq!(config.contact_endpoint(), "https://api.example.com/api/contact");
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(CliConfig::try_parse_from(["site-kit", "--verbose"]).is_err());
    }
}
