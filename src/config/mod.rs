#[cfg(feature = "cli")]
pub mod cli;
pub mod scenario;
pub mod site_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use scenario::{PageLayout, Scenario};
pub use site_config::SiteConfig;
