//! Post records and the artifact shapes built from them

use serde::{Deserialize, Serialize};

/// Search engine metadata for a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_description: String,
    pub keywords: Vec<String>,
}

/// A blog post, as written to its detail artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// `YYYY-MM-DD`
    pub publish_date: String,
    /// `YYYY-MM-DD`
    pub last_modified: String,
    pub author: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub category: String,
    pub read_time: u32,
    pub featured: bool,
    pub published: bool,
    /// Rendered HTML body
    pub content: String,
    pub seo: Seo,
}

/// A post without its body, as listed in the summary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub publish_date: String,
    pub last_modified: String,
    pub author: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub category: String,
    pub read_time: u32,
    pub featured: bool,
    pub published: bool,
    pub seo: Seo,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            publish_date: post.publish_date.clone(),
            last_modified: post.last_modified.clone(),
            author: post.author.clone(),
            summary: post.summary.clone(),
            tags: post.tags.clone(),
            category: post.category.clone(),
            read_time: post.read_time,
            featured: post.featured,
            published: post.published,
            seo: post.seo.clone(),
        }
    }
}

/// A category or tag with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStat {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub count: usize,
}

pub type CategoryStat = TermStat;
pub type TagStat = TermStat;

/// The `posts.json` artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryIndex {
    pub posts: Vec<PostSummary>,
    pub categories: Vec<CategoryStat>,
    pub tags: Vec<TagStat>,
}
