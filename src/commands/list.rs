//! List site content

use anyhow::Result;

use crate::generator::{Corpus, Generator};
use crate::Blog;

/// List posts, categories or tags
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let (posts, _) = Generator::new(blog).load()?;
    let corpus = Corpus::aggregate(posts);
    print!("{}", render(&corpus, content_type)?);
    Ok(())
}

/// The listing for one content type
pub fn render(corpus: &Corpus, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            out.push_str(&format!("Posts ({}):\n", corpus.posts.len()));
            for post in &corpus.posts {
                let mut flags = String::new();
                if post.featured {
                    flags.push_str(" *");
                }
                if !post.published {
                    flags.push_str(" (draft)");
                }
                out.push_str(&format!(
                    "  {} - {} [{}]{}\n",
                    post.publish_date, post.title, post.slug, flags
                ));
            }
        }
        "category" | "categories" => {
            out.push_str(&format!("Categories ({}):\n", corpus.categories.len()));
            for category in &corpus.categories {
                out.push_str(&format!("  {} ({})\n", category.name, category.count));
            }
        }
        "tag" | "tags" => {
            out.push_str(&format!("Tags ({}):\n", corpus.tags.len()));
            for tag in &corpus.tags {
                out.push_str(&format!("  {} ({})\n", tag.name, tag.count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, tag",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn corpus() -> Corpus {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(
            blog.content_dir.join("a.md"),
            "---\ntitle: First\ndate: 2024-01-01\ncategory: Tech\ntags: [rust]\n---\nBody",
        )
        .unwrap();
        fs::write(
            blog.content_dir.join("b.md"),
            "---\ntitle: Second\ndate: 2024-02-01\ncategory: Tech\ntags: [rust, web]\nfeatured: true\npublished: false\n---\nBody",
        )
        .unwrap();
        let (posts, _) = Generator::new(&blog).load().unwrap();
        Corpus::aggregate(posts)
    }

    #[test]
    fn test_list_posts() {
        assert_eq!(
            render(&corpus(), "post").unwrap(),
            "Posts (2):\n  2024-02-01 - Second [second] * (draft)\n  2024-01-01 - First [first]\n"
        );
    }

    #[test]
    fn test_list_terms() {
        let corpus = corpus();
        assert_eq!(
            render(&corpus, "categories").unwrap(),
            "Categories (1):\n  Tech (2)\n"
        );
        assert_eq!(
            render(&corpus, "tag").unwrap(),
            "Tags (2):\n  rust (2)\n  web (1)\n"
        );
        assert!(render(&corpus, "page").is_err());
    }
}
