use anyhow::Context;
use clap::Parser;
use site_kit::config::Command;
use site_kit::core::{ConfigProvider, ContactReply, ContactTransport};
use site_kit::utils::error::ErrorSeverity;
use site_kit::utils::validation::{validate_contact, Validate};
use site_kit::utils::logger;
use site_kit::{CliConfig, HttpContactClient, Replayer, Scenario, SiteConfig, SiteError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting site-kit CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        // 取出領域錯誤以決定退出碼
        match e.downcast_ref::<SiteError>() {
            Some(site_error) => {
                tracing::error!(
                    "❌ {:#} (Category: {:?}, Severity: {:?})",
                    e,
                    site_error.category(),
                    site_error.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", site_error.recovery_suggestion());

                eprintln!("❌ {}", site_error.user_friendly_message());
                eprintln!("💡 建議: {}", site_error.recovery_suggestion());

                if site_error.is_retryable() {
                    eprintln!("🔁 This error is temporary; running the command again may succeed.");
                }

                let exit_code = match site_error.severity() {
                    ErrorSeverity::Medium => 2,   // 可重試
                    ErrorSeverity::High => 1,     // 處理錯誤
                    ErrorSeverity::Critical => 3, // 系統錯誤
                };
                std::process::exit(exit_code);
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    match &cli.command {
        Command::CheckConfig { path } => {
            let config = SiteConfig::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            config.validate()?;
            tracing::info!("✅ Configuration is valid");
            println!("✅ {} is valid", path.display());
            println!("📮 Contact endpoint: {}", config.contact_endpoint());
        }
        Command::Ping => {
            let config = load_config(cli)?;
            let client = HttpContactClient::new(&config);
            let healthy = client.health().await?;
            if healthy {
                tracing::info!("✅ Backend is healthy");
                println!("✅ Backend is healthy");
            } else {
                tracing::warn!("⚠️ Backend answered but is not healthy");
                println!("⚠️ Backend answered but is not healthy");
                std::process::exit(2);
            }
        }
        Command::Contact { .. } => {
            let config = load_config(cli)?;
            let payload = cli
                .command
                .contact_payload()
                .context("contact command without payload")?
                .trimmed();

            let report = validate_contact(&payload);
            if !report.is_valid() {
                for (field, message) in report.errors() {
                    tracing::warn!("📝 {}: {}", field, message);
                    eprintln!("📝 {}: {}", field, message);
                }
                std::process::exit(1);
            }

            let client = HttpContactClient::new(&config);
            tracing::info!("📨 Sending contact message to {}", client.contact_endpoint());
            match client.send(&payload).await? {
                ContactReply::Accepted { .. } => {
                    tracing::info!("✅ Message sent");
                    println!("✅ Your message has been sent. Thank you!");
                }
                ContactReply::Rejected { status, message } => {
                    let message = message
                        .unwrap_or_else(|| format!("Request failed with status {}.", status));
                    tracing::warn!("⚠️ Backend rejected message ({}): {}", status, message);
                    eprintln!("⚠️ {}", message);
                    std::process::exit(1);
                }
            }
        }
        Command::Replay { path } => {
            let mut scenario = Scenario::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            scenario.validate()?;

            scenario.site = scenario
                .site
                .with_api_base_override(cli.api_base_url.clone());

            let client = HttpContactClient::new(&scenario.site);
            let report = Replayer::new(&client).run(&scenario).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> anyhow::Result<SiteConfig> {
    let config = cli.site_config()?;
    config.validate()?;
    tracing::debug!("API base: {}", config.api.base_url);
    Ok(config)
}
