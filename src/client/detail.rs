//! Post detail page: metadata, table of contents, related posts and sharing

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::SiteConfig;
use crate::content::{Post, PostSummary, SummaryIndex};
use crate::helpers::{
    encode_component, html_escape, link_to, long_date, meta_name, meta_property, post_url, strip_html,
};

use super::progress::{ProgressTracker, ScrollMetrics};
use super::ArtifactSource;

lazy_static! {
    static ref HEADING_RE: Regex = Regex::new(r"(?s)<h([2-4])(\s[^>]*)?>(.*?)</h[2-4]>").unwrap();
    static ref ID_ATTR_RE: Regex = Regex::new(r#"\s+id="[^"]*""#).unwrap();
}

/// Document title and social meta tags for a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub url: String,
    pub post_title: String,
}

impl PageMeta {
    pub fn new(post: &Post, site_title: &str, url: &str) -> Self {
        Self {
            title: format!("{} - {}", post.title, site_title),
            description: post.seo.meta_description.clone(),
            keywords: post.seo.keywords.clone(),
            url: url.to_string(),
            post_title: post.title.clone(),
        }
    }

    pub fn render(&self) -> String {
        [
            format!("<title>{}</title>", html_escape(&self.title)),
            meta_name("description", &self.description),
            meta_name("keywords", &self.keywords.join(", ")),
            meta_property("og:title", &self.post_title),
            meta_property("og:description", &self.description),
            meta_property("og:url", &self.url),
            meta_name("twitter:title", &self.post_title),
            meta_name("twitter:description", &self.description),
        ]
        .join("\n")
    }
}

/// One heading listed in the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Give every h2-h4 a sequential `heading-N` id and collect them
pub fn assign_heading_ids(body: &str) -> (String, Vec<TocEntry>) {
    let mut entries = Vec::new();
    let html = HEADING_RE.replace_all(body, |caps: &Captures| {
        let level: u8 = caps[1].parse().unwrap_or(2);
        let attrs = caps
            .get(2)
            .map(|m| ID_ATTR_RE.replace_all(m.as_str(), "").into_owned())
            .unwrap_or_default();
        let inner = &caps[3];
        let id = format!("heading-{}", entries.len());

        entries.push(TocEntry {
            level,
            id: id.clone(),
            text: strip_html(inner).trim().to_string(),
        });
        format!("<h{}{} id=\"{}\">{}</h{}>", level, attrs, id, inner, level)
    });
    (html.into_owned(), entries)
}

pub fn render_toc(entries: &[TocEntry]) -> String {
    if entries.is_empty() {
        return "<p>No headings found.</p>".to_string();
    }

    let mut html = String::from("<ul>");
    for entry in entries {
        // Heading text is taken from rendered HTML and is already escaped
        let link = format!("<a href=\"#{}\">{}</a>", entry.id, entry.text);
        match entry.level {
            3 => html.push_str(&format!("<li class=\"toc-indent-1\">{}</li>", link)),
            4 => html.push_str(&format!("<li class=\"toc-indent-2\">{}</li>", link)),
            _ => html.push_str(&format!("<li>{}</li>", link)),
        }
    }
    html.push_str("</ul>");
    html
}

/// Other published posts sharing the category or a tag, in index order
pub fn related_posts<'a>(index: &'a SummaryIndex, current: &Post, limit: usize) -> Vec<&'a PostSummary> {
    index
        .posts
        .iter()
        .filter(|p| p.id != current.id && p.published)
        .filter(|p| p.category == current.category || p.tags.iter().any(|t| current.tags.contains(t)))
        .take(limit)
        .collect()
}

pub fn render_related(posts: &[&PostSummary]) -> String {
    if posts.is_empty() {
        return "<p>No related posts found.</p>".to_string();
    }
    posts
        .iter()
        .map(|p| format!("<li>{}</li>", link_to(&post_url(&p.slug), &p.title)))
        .collect()
}

/// Social share targets for a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub twitter: String,
    pub linkedin: String,
    pub email: String,
}

impl ShareLinks {
    pub fn new(url: &str, title: &str, summary: &str) -> Self {
        let url = encode_component(url);
        let title = encode_component(title);
        Self {
            twitter: format!("https://twitter.com/intent/tweet?url={}&text={}", url, title),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={}", url),
            email: format!(
                "mailto:?subject={}&body={}%0A%0A{}",
                title,
                encode_component(summary),
                url
            ),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "<a href=\"{}\" class=\"share-btn twitter\" target=\"_blank\" rel=\"noopener\">Twitter</a>\
             <a href=\"{}\" class=\"share-btn linkedin\" target=\"_blank\" rel=\"noopener\">LinkedIn</a>\
             <a href=\"{}\" class=\"share-btn email\">Email</a>",
            html_escape(&self.twitter),
            html_escape(&self.linkedin),
            html_escape(&self.email)
        )
    }
}

/// Everything the post page shows once the post has loaded
#[derive(Debug, Clone)]
pub struct PostView {
    pub meta: PageMeta,
    pub title: String,
    pub date: String,
    pub category: String,
    pub read_time: u32,
    pub tags: String,
    pub body: String,
    pub toc: String,
    pub related: String,
    pub share: ShareLinks,
    pub progress: ProgressTracker,
}

impl PostView {
    pub fn new(post: &Post, related: &[&PostSummary], site_title: &str, url: &str) -> Self {
        let (body, entries) = assign_heading_ids(&post.content);
        let tags = post
            .tags
            .iter()
            .map(|t| format!("<span class=\"tag\">{}</span>", html_escape(t)))
            .collect();

        Self {
            meta: PageMeta::new(post, site_title, url),
            title: html_escape(&post.title),
            date: html_escape(&long_date(&post.publish_date)),
            category: html_escape(&post.category),
            read_time: post.read_time,
            tags,
            body,
            toc: render_toc(&entries),
            related: render_related(related),
            share: ShareLinks::new(url, &post.title, &post.summary),
            progress: ProgressTracker::default(),
        }
    }

    /// Scroll handler for the host page; true means request an animation frame
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.progress.on_scroll(metrics)
    }

    /// Animation frame callback; returns the new progress bar width
    pub fn on_frame(&mut self) -> Option<f64> {
        self.progress.on_frame()
    }

    /// The post header and body as they appear in the article container
    pub fn render(&self) -> String {
        format!(
            "<header class=\"post-header\">\n\
             <div class=\"post-meta\"><span class=\"post-date\">{}</span><span class=\"post-category\">{}</span><span class=\"post-read-time\">{} min read</span></div>\n\
             <h1 class=\"post-title\">{}</h1>\n\
             <div class=\"post-tags\">{}</div>\n\
             </header>\n\
             <div class=\"reading-progress\" style=\"width: {}\"></div>\n\
             <div class=\"post-content\">{}</div>\n",
            self.date,
            self.category,
            self.read_time,
            self.title,
            self.tags,
            self.progress.style(),
            self.body
        )
    }
}

/// Outcome of loading a post page
#[derive(Debug, Clone)]
pub enum DetailState {
    /// Missing slug or failed fetch
    Error,
    Loaded(Box<PostView>),
}

impl DetailState {
    pub fn render(&self) -> String {
        match self {
            DetailState::Error => "<div class=\"error-message\">\n\
                 <h2>Post not found</h2>\n\
                 <p>The post you're looking for doesn't exist or has been removed.</p>\n\
                 <a href=\"index.html\" class=\"back-link\">← Back to Blog</a>\n\
                 </div>\n"
                .to_string(),
            DetailState::Loaded(view) => view.render(),
        }
    }
}

/// Load the post for `slug` and assemble its page
pub fn load<S: ArtifactSource>(source: &S, config: &SiteConfig, slug: Option<&str>, url: &str) -> DetailState {
    let Some(slug) = slug else {
        tracing::warn!("No post specified in the page URL");
        return DetailState::Error;
    };

    let post = match source.fetch_post(slug) {
        Ok(post) => post,
        Err(e) => {
            tracing::error!("Failed to load post {}: {}", slug, e);
            return DetailState::Error;
        }
    };

    let index = match source.fetch_index() {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!("Failed to load related posts: {}", e);
            SummaryIndex::default()
        }
    };
    let related = related_posts(&index, &post, config.index.related_posts);

    DetailState::Loaded(Box::new(PostView::new(&post, &related, &config.title, url)))
}
