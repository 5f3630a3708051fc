//! Remove generated artifacts

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Delete the artifact directory; sources and the rest of the site are kept
pub fn run(blog: &Blog) -> Result<()> {
    if blog.data_dir.exists() {
        fs::remove_dir_all(&blog.data_dir)?;
        tracing::info!("Deleted: {:?}", blog.data_dir);
    }

    Ok(())
}
