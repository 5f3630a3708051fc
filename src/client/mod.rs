//! Page renderers for the blog index and post pages
//!
//! These consume the same artifacts a browser fetches (`posts.json` and
//! `posts/<slug>.json`) through an [`ArtifactSource`], and produce the markup
//! each page container should be replaced with. Page type is decided once by
//! [`PageKind::detect`]; only the renderer for that page is built.

pub mod detail;
pub mod index;
pub mod progress;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{Post, SummaryIndex};
use crate::helpers::Location;

pub use detail::DetailState;
pub use index::IndexController;

/// Why an artifact could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the page renderers fetch artifacts from
pub trait ArtifactSource {
    /// Fetch `posts.json`
    fn fetch_index(&self) -> Result<SummaryIndex, FetchError>;

    /// Fetch `posts/<slug>.json`
    fn fetch_post(&self, slug: &str) -> Result<Post, FetchError>;
}

/// Reads artifacts from a data directory on disk
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<T, FetchError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FetchError::NotFound(display.clone())
            } else {
                FetchError::Io {
                    path: display.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&raw).map_err(|source| FetchError::Decode {
            path: display,
            source,
        })
    }
}

impl ArtifactSource for DirSource {
    fn fetch_index(&self) -> Result<SummaryIndex, FetchError> {
        self.read(&self.root.join("posts.json"))
    }

    fn fetch_post(&self, slug: &str) -> Result<Post, FetchError> {
        // Keeps the lookup inside the posts directory
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FetchError::NotFound(format!("post {:?}", slug)));
        }
        self.read(&self.root.join("posts").join(format!("{}.json", slug)))
    }
}

/// Which blog page a location points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Index,
    /// A post page; the slug is missing when the query has no `post` parameter
    Post { slug: Option<String> },
    Other,
}

impl PageKind {
    pub fn detect(location: &Location) -> Self {
        let path = location.path.as_str();
        if path.ends_with("/post.html") || path == "post.html" {
            let slug = location
                .param("post")
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            PageKind::Post { slug }
        } else if path.contains("blog/index.html") || path.ends_with("blog/") || path.ends_with("/blog") {
            PageKind::Index
        } else {
            PageKind::Other
        }
    }
}

/// The renderer built for one page view
#[derive(Debug)]
pub enum Page {
    Index(IndexController),
    /// The summary index could not be loaded
    IndexUnavailable,
    Post(DetailState),
    Other,
}

/// Detect the page kind and build only the matching renderer
pub fn open<S: ArtifactSource>(source: &S, config: &SiteConfig, href: &str) -> Page {
    let location = Location::parse(href);
    match PageKind::detect(&location) {
        PageKind::Index => match IndexController::load(source, &config.index) {
            Ok(controller) => Page::Index(controller),
            Err(e) => {
                tracing::error!("Failed to load blog data: {}", e);
                Page::IndexUnavailable
            }
        },
        PageKind::Post { slug } => {
            let page_url = crate::helpers::join_url(&config.url, href_path_and_query(href));
            Page::Post(detail::load(source, config, slug.as_deref(), &page_url))
        }
        PageKind::Other => Page::Other,
    }
}

/// Strip scheme and host so the page URL can be rebuilt from the site URL
fn href_path_and_query(href: &str) -> &str {
    match href.find("://") {
        Some(pos) => {
            let after = &href[pos + 3..];
            after.find('/').map(|i| &after[i..]).unwrap_or("/")
        }
        None => href,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::{PostSummary, Seo};
    use std::collections::HashMap;

    /// In-memory artifacts for renderer tests
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub index: Option<SummaryIndex>,
        pub posts: HashMap<String, Post>,
    }

    impl ArtifactSource for MemorySource {
        fn fetch_index(&self) -> Result<SummaryIndex, FetchError> {
            self.index
                .clone()
                .ok_or_else(|| FetchError::NotFound("posts.json".to_string()))
        }

        fn fetch_post(&self, slug: &str) -> Result<Post, FetchError> {
            self.posts
                .get(slug)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(slug.to_string()))
        }
    }

    pub(crate) fn post(slug: &str, date: &str, category: &str, tags: &[&str]) -> Post {
        Post {
            id: slug.to_string(),
            title: format!("Title {}", slug),
            slug: slug.to_string(),
            publish_date: date.to_string(),
            last_modified: date.to_string(),
            author: "Franco".to_string(),
            summary: format!("Summary of {}", slug),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.to_string(),
            read_time: 3,
            featured: false,
            published: true,
            content: "<h2>Intro</h2><p>Body</p>".to_string(),
            seo: Seo {
                meta_description: format!("Meta {}", slug),
                keywords: tags.iter().map(|t| t.to_string()).collect(),
            },
        }
    }

    pub(crate) fn source_with(posts: Vec<Post>) -> MemorySource {
        let corpus = crate::generator::Corpus::aggregate(posts);
        MemorySource {
            index: Some(corpus.summary_index()),
            posts: corpus
                .posts
                .into_iter()
                .map(|p| (p.slug.clone(), p))
                .collect(),
        }
    }

    pub(crate) fn summary(slug: &str, date: &str, category: &str, tags: &[&str]) -> PostSummary {
        PostSummary::from(&post(slug, date, category, tags))
    }

    #[test]
    fn test_detect_page_kind() {
        let kind = |href: &str| PageKind::detect(&Location::parse(href));
        assert_eq!(kind("/blog/"), PageKind::Index);
        assert_eq!(kind("/blog/index.html"), PageKind::Index);
        assert_eq!(kind("http://localhost:4000/blog"), PageKind::Index);
        assert_eq!(
            kind("/blog/post.html?post=hello-world"),
            PageKind::Post {
                slug: Some("hello-world".to_string())
            }
        );
        assert_eq!(kind("/blog/post.html"), PageKind::Post { slug: None });
        assert_eq!(kind("/blog/post.html?post="), PageKind::Post { slug: None });
        assert_eq!(kind("/about.html"), PageKind::Other);
        assert_eq!(kind("/"), PageKind::Other);
    }

    #[test]
    fn test_dir_source_reads_built_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = crate::Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(
            blog.content_dir.join("hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nHi there.",
        )
        .unwrap();
        blog.build().unwrap();

        let source = DirSource::new(&blog.data_dir);
        let index = source.fetch_index().unwrap();
        assert_eq!(index.posts.len(), 1);
        let post = source.fetch_post("hello").unwrap();
        assert_eq!(post.title, "Hello");

        assert!(matches!(
            source.fetch_post("missing"),
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch_post("../posts"),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_dir_source_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("posts.json"), "{ not json").unwrap();
        let source = DirSource::new(dir.path());
        assert!(matches!(
            source.fetch_index(),
            Err(FetchError::Decode { .. })
        ));
    }

    #[test]
    fn test_open_builds_matching_renderer() {
        let config = SiteConfig::default();
        let source = source_with(vec![post("a", "2024-01-01", "Tech", &[])]);

        assert!(matches!(
            open(&source, &config, "/blog/"),
            Page::Index(_)
        ));
        assert!(matches!(
            open(&source, &config, "/blog/post.html?post=a"),
            Page::Post(DetailState::Loaded(_))
        ));
        assert!(matches!(
            open(&source, &config, "/blog/post.html?post=zzz"),
            Page::Post(DetailState::Error)
        ));
        assert!(matches!(open(&source, &config, "/contact.html"), Page::Other));
        assert!(matches!(
            open(&MemorySource::default(), &config, "/blog/"),
            Page::IndexUnavailable
        ));
    }

    #[test]
    fn test_href_path_and_query() {
        assert_eq!(
            href_path_and_query("http://h:1/blog/post.html?post=a"),
            "/blog/post.html?post=a"
        );
        assert_eq!(href_path_and_query("/blog/"), "/blog/");
    }
}
