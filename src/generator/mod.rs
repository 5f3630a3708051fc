//! Generator module - aggregates posts and writes the JSON artifacts

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::loader::ContentLoader;
use crate::content::{generate_slug, CategoryStat, Post, PostSummary, SummaryIndex, TagStat};
use crate::error::BuildError;
use crate::Blog;

/// Counts printed after a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub categories: usize,
    pub tags: usize,
    pub published: usize,
    pub featured: usize,
    /// Documents that failed validation or parsing
    pub skipped: usize,
}

/// The sorted post list with its category and tag tallies
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub posts: Vec<Post>,
    pub categories: Vec<CategoryStat>,
    pub tags: Vec<TagStat>,
}

impl Corpus {
    /// Sort posts newest first and tally categories and tags
    pub fn aggregate(mut posts: Vec<Post>) -> Self {
        sort_posts(&mut posts);
        let categories = tally_categories(&posts);
        let tags = tally_tags(&posts);
        Self {
            posts,
            categories,
            tags,
        }
    }

    /// The `posts.json` artifact
    pub fn summary_index(&self) -> SummaryIndex {
        SummaryIndex {
            posts: self.posts.iter().map(PostSummary::from).collect(),
            categories: self.categories.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn report(&self, skipped: usize) -> BuildReport {
        BuildReport {
            posts: self.posts.len(),
            categories: self.categories.len(),
            tags: self.tags.len(),
            published: self.posts.iter().filter(|p| p.published).count(),
            featured: self.posts.iter().filter(|p| p.featured).count(),
            skipped,
        }
    }
}

/// Newest first by `publishDate`; equal dates keep their input order
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

/// Category counts in first-seen order
pub fn tally_categories(posts: &[Post]) -> Vec<CategoryStat> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for post in posts {
        *counts.entry(post.category.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(name, count)| CategoryStat {
            name: name.to_string(),
            slug: Some(generate_slug(name)),
            count,
        })
        .collect()
}

/// Tag counts in first-seen order
pub fn tally_tags(posts: &[Post]) -> Vec<TagStat> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(name, count)| TagStat {
            name: name.to_string(),
            slug: None,
            count,
        })
        .collect()
}

/// Runs the build pipeline over the content directory
pub struct Generator<'a> {
    blog: &'a Blog,
}

impl<'a> Generator<'a> {
    pub fn new(blog: &'a Blog) -> Self {
        Self { blog }
    }

    /// Build every post and write the artifacts
    pub fn generate(&self) -> Result<BuildReport> {
        self.ensure_dirs()?;

        let (posts, skipped) = self.load()?;
        if posts.is_empty() && skipped == 0 {
            return Ok(BuildReport::default());
        }
        if posts.is_empty() {
            tracing::warn!("No valid posts were processed");
            return Ok(BuildReport {
                skipped,
                ..Default::default()
            });
        }

        let posts = if self.blog.config.include_unpublished {
            posts
        } else {
            let before = posts.len();
            let posts: Vec<Post> = posts.into_iter().filter(|p| p.published).collect();
            tracing::debug!("Dropped {} unpublished posts", before - posts.len());
            posts
        };

        let corpus = Corpus::aggregate(posts);
        self.write(&corpus)?;

        Ok(corpus.report(skipped))
    }

    /// Load every markdown file; returns the valid posts and the number skipped
    pub fn load(&self) -> Result<(Vec<Post>, usize)> {
        let loader = ContentLoader::new(self.blog)?;
        let files = loader.discover()?;
        if files.is_empty() {
            tracing::info!("No markdown files found in {:?}", self.blog.content_dir);
            return Ok((Vec::new(), 0));
        }
        tracing::info!("Found {} markdown files", files.len());

        Ok(self.collect(&loader, &files))
    }

    /// Make sure the content and artifact directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.blog.content_dir, &self.blog.data_dir, &self.blog.posts_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory {:?}", dir))?;
                tracing::debug!("Created {:?}", dir);
            }
        }
        Ok(())
    }

    /// Load each file, skipping failures and slug collisions
    fn collect(&self, loader: &ContentLoader, files: &[PathBuf]) -> (Vec<Post>, usize) {
        let mut posts = Vec::new();
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut skipped = 0;

        for path in files {
            let name = loader.display_path(path);
            tracing::debug!("Processing: {}", name);

            let result = loader.load_post(path).and_then(|post| {
                match claimed.get(&post.slug) {
                    Some(existing) => Err(BuildError::DuplicateSlug {
                        slug: post.slug.clone(),
                        existing: existing.clone(),
                    }),
                    None => Ok(post),
                }
            });

            match result {
                Ok(post) => {
                    claimed.insert(post.slug.clone(), name);
                    posts.push(post);
                }
                Err(e) if e.is_warning() => {
                    tracing::warn!("Skipping {}: {}", name, e);
                    skipped += 1;
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", name, e);
                    skipped += 1;
                }
            }
        }

        (posts, skipped)
    }

    /// Write one detail file per post, then the summary index
    pub fn write(&self, corpus: &Corpus) -> Result<()> {
        for post in &corpus.posts {
            let path = self.blog.posts_dir.join(format!("{}.json", post.slug));
            write_json(&path, post)?;
            tracing::debug!("Generated: {:?}", path);
        }

        let index_path = self.blog.data_dir.join("posts.json");
        write_json(&index_path, &corpus.summary_index())?;
        tracing::info!("Generated master file: {:?}", index_path);

        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PostSummary, Seo};

    fn post(slug: &str, date: &str, category: &str, tags: &[&str]) -> Post {
        Post {
            id: slug.to_string(),
            title: slug.to_string(),
            slug: slug.to_string(),
            publish_date: date.to_string(),
            last_modified: date.to_string(),
            author: "Franco".to_string(),
            summary: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.to_string(),
            read_time: 1,
            featured: false,
            published: true,
            content: String::new(),
            seo: Seo {
                meta_description: String::new(),
                keywords: Vec::new(),
            },
        }
    }

    fn write_post(blog: &Blog, file: &str, body: &str) {
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(blog.content_dir.join(file), body).unwrap();
    }

    fn read_index(blog: &Blog) -> SummaryIndex {
        let raw = fs::read_to_string(blog.data_dir.join("posts.json")).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_byte_order_mark_post_builds() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "bom.md", "\u{feff}---\ntitle: With BOM\n---\nBody");

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(read_index(&blog).posts[0].title, "With BOM");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_skips_only_that_document() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "good.md", "---\ntitle: Good\ndate: 2024-01-01\n---\nBody");
        std::os::unix::fs::symlink(
            blog.content_dir.join("gone.md"),
            blog.content_dir.join("broken.md"),
        )
        .unwrap();

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(read_index(&blog).posts[0].slug, "good");
        assert!(blog.posts_dir.join("good.json").exists());
    }

    #[test]
    fn test_category_tally_first_seen() {
        let corpus = Corpus::aggregate(vec![
            post("a", "2024-04-01", "Tech", &[]),
            post("b", "2024-03-01", "Life", &[]),
            post("c", "2024-05-01", "Tech", &[]),
            post("d", "2024-01-01", "Tech", &[]),
        ]);
        let categories: Vec<(String, usize)> = corpus
            .categories
            .iter()
            .map(|c| (c.name.clone(), c.count))
            .collect();
        assert_eq!(
            categories,
            vec![("Tech".to_string(), 3), ("Life".to_string(), 1)]
        );
        assert_eq!(corpus.categories[0].slug.as_deref(), Some("tech"));
    }

    #[test]
    fn test_sort_newest_first_and_stable() {
        let corpus = Corpus::aggregate(vec![
            post("old", "2023-01-01", "X", &[]),
            post("tie-1", "2024-02-02", "X", &[]),
            post("new", "2024-06-01", "X", &[]),
            post("tie-2", "2024-02-02", "X", &[]),
        ]);
        let order: Vec<&str> = corpus.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["new", "tie-1", "tie-2", "old"]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let posts = vec![
            post("a", "2024-01-01", "X", &["t1"]),
            post("b", "2024-01-01", "Y", &["t2", "t1"]),
            post("c", "2025-01-01", "X", &[]),
        ];
        let first = Corpus::aggregate(posts.clone());
        let second = Corpus::aggregate(first.posts.clone());
        assert_eq!(first.posts, second.posts);
        assert_eq!(first.summary_index(), Corpus::aggregate(posts).summary_index());
    }

    #[test]
    fn test_tag_tally() {
        let tags = tally_tags(&[
            post("a", "2024-01-01", "X", &["rust", "web"]),
            post("b", "2024-01-01", "X", &["web"]),
        ]);
        assert_eq!(tags.len(), 2);
        assert_eq!((tags[0].name.as_str(), tags[0].count), ("rust", 1));
        assert_eq!((tags[1].name.as_str(), tags[1].count), ("web", 2));
        assert!(tags.iter().all(|t| t.slug.is_none()));
    }

    #[test]
    fn test_generate_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(
            &blog,
            "first.md",
            "---\ntitle: First Post\ndate: 2024-01-01\ncategory: Tech\ntags: [rust]\n---\nHello.\n",
        );
        write_post(
            &blog,
            "second.md",
            "---\ntitle: Second Post\ndate: 2024-02-01\ncategory: Life\nfeatured: true\npublished: false\n---\nWorld.\n",
        );

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(
            report,
            BuildReport {
                posts: 2,
                categories: 2,
                tags: 1,
                published: 1,
                featured: 1,
                skipped: 0,
            }
        );

        let index = read_index(&blog);
        let slugs: Vec<&str> = index.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second-post", "first-post"]);
        assert!(!index.posts[0].published);

        let raw = fs::read_to_string(blog.data_dir.join("posts.json")).unwrap();
        assert!(!raw.contains("\"content\""));
        assert!(raw.contains("\n  \"posts\": ["));

        let detail: Post = serde_json::from_str(
            &fs::read_to_string(blog.posts_dir.join("first-post.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(detail.content, "<p>Hello.</p>\n");
        assert_eq!(PostSummary::from(&detail), index.posts[1]);
    }

    #[test]
    fn test_missing_title_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "a.md", "---\ntitle: Valid One\n---\nBody");
        write_post(&blog, "b.md", "---\ncategory: Tech\n---\nNo title here");
        write_post(&blog, "c.md", "---\ntitle: Valid Two\n---\nBody");

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 2);
        assert_eq!(report.skipped, 1);
        assert!(blog.posts_dir.join("valid-one.json").exists());
        assert!(blog.posts_dir.join("valid-two.json").exists());
        assert_eq!(read_index(&blog).posts.len(), 2);
    }

    #[test]
    fn test_duplicate_slug_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        write_post(&blog, "a.md", "---\ntitle: Same Title\ndate: 2024-01-01\n---\nFirst");
        write_post(&blog, "b.md", "---\ntitle: Same Title\ndate: 2024-02-01\n---\nSecond");

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, 1);

        let detail: Post = serde_json::from_str(
            &fs::read_to_string(blog.posts_dir.join("same-title.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(detail.content, "<p>First</p>\n");
    }

    #[test]
    fn test_empty_corpus_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report, BuildReport::default());
        assert!(blog.content_dir.is_dir());
        assert!(blog.posts_dir.is_dir());
        assert!(!blog.data_dir.join("posts.json").exists());
    }

    #[test]
    fn test_all_invalid_leaves_stale_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.data_dir).unwrap();
        fs::write(blog.data_dir.join("posts.json"), "stale").unwrap();
        write_post(&blog, "a.md", "no front-matter at all");

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            fs::read_to_string(blog.data_dir.join("posts.json")).unwrap(),
            "stale"
        );
    }

    #[test]
    fn test_exclude_unpublished() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::SiteConfig {
            include_unpublished: false,
            ..Default::default()
        };
        let blog = Blog::with_config(dir.path(), config);
        write_post(&blog, "a.md", "---\ntitle: Public\n---\nBody");
        write_post(&blog, "b.md", "---\ntitle: Hidden\npublished: false\n---\nBody");

        let report = Generator::new(&blog).generate().unwrap();
        assert_eq!(report.posts, 1);
        assert!(!blog.posts_dir.join("hidden.json").exists());
        assert_eq!(read_index(&blog).posts[0].slug, "public");
    }
}
