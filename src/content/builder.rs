//! Post builder - turns one source document into a `Post`

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use indexmap::IndexSet;
use std::fs::Metadata;
use std::time::SystemTime;

use super::frontmatter::non_empty;
use super::{FrontMatter, MarkdownRenderer, Post, Seo};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::helpers::strip_html;

/// Characters dropped from titles before slugging
const SLUG_REMOVE: &[char] = &['*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@'];

/// Calendar dates taken from the filesystem when front-matter has none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: NaiveDate,
    pub modified: NaiveDate,
}

impl FileTimes {
    /// Read creation/modification dates, falling back to mtime where the
    /// platform has no birth time
    pub fn from_metadata(metadata: &Metadata, tz: Option<Tz>) -> Self {
        let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        let created = metadata.created().unwrap_or(modified);
        Self {
            created: to_date(created, tz),
            modified: to_date(modified, tz),
        }
    }
}

fn to_date(time: SystemTime, tz: Option<Tz>) -> NaiveDate {
    let utc = DateTime::<Utc>::from(time);
    match tz {
        Some(tz) => utc.with_timezone(&tz).date_naive(),
        None => utc.date_naive(),
    }
}

/// Builds posts from raw documents
pub struct PostBuilder<'a> {
    config: &'a SiteConfig,
    renderer: &'a MarkdownRenderer,
}

impl<'a> PostBuilder<'a> {
    pub fn new(config: &'a SiteConfig, renderer: &'a MarkdownRenderer) -> Self {
        Self { config, renderer }
    }

    /// Build a post from raw document text
    pub fn build(&self, raw: &str, times: FileTimes) -> Result<Post, BuildError> {
        let (fm, body) = FrontMatter::parse(raw)?;
        let title = fm.title()?.to_string();

        let content = self.renderer.render(body);

        let slug = generate_slug(non_empty(&fm.slug).unwrap_or(&title));
        if slug.is_empty() {
            return Err(BuildError::Validation { field: "slug" });
        }

        let read_time = fm
            .read_time
            .filter(|minutes| *minutes >= 1)
            .unwrap_or_else(|| calculate_read_time(body, self.config.words_per_minute));

        let summary = non_empty(&fm.summary)
            .or_else(|| non_empty(&fm.excerpt))
            .map(str::to_string)
            .unwrap_or_else(|| generate_excerpt(&content, self.config.excerpt_length));

        let publish_date = fm.parse_date()?.unwrap_or(times.created);
        let last_modified = fm.parse_last_modified()?.unwrap_or(times.modified);

        let tags: Vec<String> = fm
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        let seo = Seo {
            meta_description: non_empty(&fm.description)
                .map(str::to_string)
                .unwrap_or_else(|| summary.clone()),
            keywords: fm.keywords.clone().unwrap_or_else(|| tags.clone()),
        };

        Ok(Post {
            id: slug.clone(),
            title,
            slug,
            publish_date: publish_date.format("%Y-%m-%d").to_string(),
            last_modified: last_modified.format("%Y-%m-%d").to_string(),
            author: non_empty(&fm.author)
                .unwrap_or(&self.config.author)
                .to_string(),
            summary,
            tags,
            category: non_empty(&fm.category)
                .unwrap_or(&self.config.default_category)
                .to_string(),
            read_time,
            featured: fm.featured,
            published: fm.published,
            content,
            seo,
        })
    }
}

/// URL-safe slug: punctuation dropped, lowercased, separators collapsed to `-`
pub fn generate_slug(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| !SLUG_REMOVE.contains(c)).collect();
    slug::slugify(cleaned)
}

/// Plain-text excerpt of rendered HTML, at most `max_length` characters
/// plus a trailing `...` when cut at a word boundary
pub fn generate_excerpt(html: &str, max_length: usize) -> String {
    let plain = strip_html(html);
    let plain = plain.trim();

    if plain.chars().count() <= max_length {
        return plain.to_string();
    }

    let truncated: String = plain.chars().take(max_length).collect();

    // A sentence end in the last fifth of the window is a good place to stop
    if let Some(dot) = truncated.rfind('.') {
        let position = truncated[..dot].chars().count();
        if position * 5 > max_length * 4 {
            return truncated[..=dot].to_string();
        }
    }

    match truncated.rfind(char::is_whitespace) {
        Some(space) => format!("{}...", truncated[..space].trim_end()),
        None => "...".to_string(),
    }
}

/// Minutes to read `body` at `words_per_minute`, never less than one
pub fn calculate_read_time(body: &str, words_per_minute: usize) -> u32 {
    let words = body.split_whitespace().count();
    let minutes = words.div_ceil(words_per_minute.max(1)).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
