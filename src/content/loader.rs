//! Content loader - finds and loads posts from the content directory

use anyhow::Result;
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::builder::{FileTimes, PostBuilder};
use super::{MarkdownRenderer, Post};
use crate::error::BuildError;
use crate::Blog;

/// Loads posts from the content directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
    tz: Option<Tz>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let renderer = if blog.config.highlight.enable {
            MarkdownRenderer::with_highlighting(&blog.config.highlight.theme)?
        } else {
            MarkdownRenderer::new()
        };
        let tz = blog.config.tz()?;
        Ok(Self { blog, renderer, tz })
    }

    /// All markdown files under the content directory, in file-name order
    ///
    /// A markdown entry that cannot be walked (a dangling symlink, say) is
    /// still listed so that loading it fails for that document alone. Other
    /// walk errors are logged and the rest of the tree is still searched.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let content_dir = &self.blog.content_dir;
        if !content_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    match e.path() {
                        Some(path) if is_markdown_file(path) => files.push(path.to_path_buf()),
                        Some(path) => tracing::error!("Cannot read {:?}: {}", path, e),
                        None => tracing::error!("Cannot read content directory: {}", e),
                    }
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post, BuildError> {
        let raw = fs::read_to_string(path)?;
        let metadata = fs::metadata(path)?;
        let times = FileTimes::from_metadata(&metadata, self.tz);

        PostBuilder::new(&self.blog.config, &self.renderer).build(&raw, times)
    }

    /// Path relative to the content directory, for log messages
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.blog.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
