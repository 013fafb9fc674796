pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpContactClient, memory_dom::MemoryDocument};
pub use config::{Scenario, SiteConfig};
pub use core::{replay::Replayer, runtime::SiteRuntime};
pub use utils::error::{Result, SiteError};
