//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub author: String,

    // Directory
    pub content_dir: String,
    pub site_dir: String,
    /// Artifact directory, relative to `site_dir`
    pub data_dir: String,

    // Writing
    pub default_category: String,
    pub excerpt_length: usize,
    pub words_per_minute: usize,
    /// IANA zone used when dates fall back to file timestamps (UTC when empty)
    pub timezone: String,
    pub include_unpublished: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Pages
    #[serde(default)]
    pub index: IndexConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Franco's Blog".to_string(),
            url: "http://localhost:4000".to_string(),
            author: "Franco".to_string(),

            content_dir: "content/posts".to_string(),
            site_dir: "source".to_string(),
            data_dir: "blog/data".to_string(),

            default_category: "Uncategorized".to_string(),
            excerpt_length: 160,
            words_per_minute: 200,
            timezone: String::new(),
            include_unpublished: true,
            highlight: HighlightConfig::default(),

            index: IndexConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.index.per_page == 0 {
            anyhow::bail!("index.per_page must be at least 1");
        }
        if self.words_per_minute == 0 {
            anyhow::bail!("words_per_minute must be at least 1");
        }
        if self.excerpt_length == 0 {
            anyhow::bail!("excerpt_length must be at least 1");
        }
        self.tz()?;
        Ok(())
    }

    /// Parsed timezone, `None` meaning UTC
    pub fn tz(&self) -> Result<Option<Tz>> {
        if self.timezone.trim().is_empty() {
            return Ok(None);
        }
        self.timezone
            .trim()
            .parse::<Tz>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Unknown timezone {:?}: {}", self.timezone, e))
    }
}

/// Server-side highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Index and post page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub per_page: usize,
    pub recent_posts: usize,
    pub related_posts: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            per_page: 6,
            recent_posts: 5,
            related_posts: 3,
        }
    }
}
