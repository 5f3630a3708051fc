//! postforge: builds JSON post artifacts for a static blog
//!
//! The build pipeline turns markdown posts with front-matter into one detail
//! artifact per post plus a summary index. The `client` module renders the
//! blog index and post pages from those artifacts.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown sources
    pub content_dir: PathBuf,
    /// Static site tree served to browsers
    pub site_dir: PathBuf,
    /// Artifact directory holding `posts.json`
    pub data_dir: PathBuf,
    /// Per-post detail artifacts
    pub posts_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let site_dir = base_dir.join(&config.site_dir);
        let data_dir = site_dir.join(&config.data_dir);
        let posts_dir = data_dir.join("posts");

        Self {
            config,
            base_dir,
            content_dir,
            site_dir,
            data_dir,
            posts_dir,
        }
    }

    /// Build all artifacts
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::build::run(self)
    }

    /// Remove generated artifacts
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::create_post(self, title)
    }
}
