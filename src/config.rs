//! Configuration file.
//!
//! A TOML file with a required `[x]` credentials section and optional
//! `[collect]`, `[pacing]` and `[retry]` sections:
//!
//! ```toml
//! [x]
//! username = "rider"
//! email = "rider@example.com"
//! password = "..."
//!
//! [collect]
//! minimum_posts = 5000
//! output_dir = "tweets"
//!
//! [pacing]
//! min_delay_secs = 5
//! max_delay_secs = 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::pacing::{PageDelay, RetryPolicy};
use crate::session::Credentials;
use crate::source::SearchQuery;

const DEFAULT_QUERY: &str =
    r#""scram440" (Royal Enfield OR RC) until:2025-01-28 since:2024-12-02"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub x: Credentials,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub pacing: PageDelay,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// What to search for and where results go.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub query: String,
    /// Result ordering requested from the service.
    pub product: String,
    pub page_size: u32,
    /// Stop once at least this many posts have been collected.
    pub minimum_posts: u64,
    pub output_dir: PathBuf,
    pub cookie_file: PathBuf,
    pub base_url: String,
    pub language: String,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            product: "Latest".to_string(),
            page_size: 100,
            minimum_posts: 1_000_000,
            output_dir: PathBuf::from("tweets"),
            cookie_file: PathBuf::from("x_cookies.json"),
            base_url: "https://api.x.com".to_string(),
            language: "en-US".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.collect.query.trim().is_empty(), "collect.query must not be empty");
        ensure!(self.collect.page_size > 0, "collect.page_size must be positive");
        ensure!(
            self.pacing.min_delay_secs <= self.pacing.max_delay_secs,
            "pacing.min_delay_secs ({}) exceeds pacing.max_delay_secs ({})",
            self.pacing.min_delay_secs,
            self.pacing.max_delay_secs
        );
        Ok(())
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            text: self.collect.query.clone(),
            product: self.collect.product.clone(),
            count: self.collect.page_size,
        }
    }
}
