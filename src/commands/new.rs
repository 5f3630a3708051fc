//! Create a new post

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;

use crate::content::generate_slug;
use crate::Blog;

/// Scaffold `<slug>.md` in the content directory
pub fn create_post(blog: &Blog, title: &str) -> Result<PathBuf> {
    let slug = generate_slug(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title: {:?}", title);
    }

    let today = match blog.config.tz()? {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    };

    fs::create_dir_all(&blog.content_dir)?;
    let file_path = blog.content_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, scaffold(blog, title, today)?)?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}

fn scaffold(blog: &Blog, title: &str, date: NaiveDate) -> Result<String> {
    Ok(format!(
        "---\ntitle: {}\ndate: {}\nauthor: {}\ncategory: {}\ntags: []\nsummary: \"\"\nfeatured: false\npublished: true\n---\n\n",
        yaml_scalar(title)?,
        date.format("%Y-%m-%d"),
        yaml_scalar(&blog.config.author)?,
        yaml_scalar(&blog.config.default_category)?
    ))
}

/// A string as a YAML scalar, quoted when plain style would misparse
fn yaml_scalar(value: &str) -> Result<String> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_builds() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Hello: \"Rust\" World").unwrap();
        assert_eq!(path, blog.content_dir.join("hello-rust-world.md"));

        let report = blog.build().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, 0);

        let post: crate::content::Post = serde_json::from_str(
            &fs::read_to_string(blog.posts_dir.join("hello-rust-world.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(post.title, "Hello: \"Rust\" World");
        assert_eq!(post.category, "Uncategorized");
    }

    #[test]
    fn test_create_post_quotes_config_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "author: \"Franco: Dev\"\ndefault_category: \"Notes: Misc\"\n",
        )
        .unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.author, "Franco: Dev");

        create_post(&blog, "Quoted").unwrap();
        let report = blog.build().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, 0);

        let post: crate::content::Post = serde_json::from_str(
            &fs::read_to_string(blog.posts_dir.join("quoted.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(post.author, "Franco: Dev");
        assert_eq!(post.category, "Notes: Misc");
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        create_post(&blog, "Same").unwrap();
        assert!(create_post(&blog, "Same").is_err());
        assert!(create_post(&blog, "!!!").is_err());
    }
}
