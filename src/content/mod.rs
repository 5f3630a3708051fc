//! Content module - parses source documents into posts

mod builder;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use builder::{calculate_read_time, generate_excerpt, generate_slug, FileTimes, PostBuilder};
pub use frontmatter::FrontMatter;
pub use markdown::{heading_id, MarkdownRenderer};
pub use post::{CategoryStat, Post, PostSummary, Seo, SummaryIndex, TagStat, TermStat};
