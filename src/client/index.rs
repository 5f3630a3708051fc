//! Blog index page: filtering, search, pagination and sidebars

use crate::config::IndexConfig;
use crate::content::{generate_slug, CategoryStat, PostSummary, SummaryIndex, TagStat};
use crate::helpers::{html_escape, link_to, long_date, post_url};

use super::{ArtifactSource, FetchError};

/// Category selection on the index page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Matches a category by name (case-insensitive) or by slug
    Category(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(value.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(wanted) => {
                category.to_lowercase() == wanted.to_lowercase()
                    || generate_slug(category) == *wanted
            }
        }
    }

    fn is_category(&self, name: &str) -> bool {
        match self {
            CategoryFilter::All => false,
            CategoryFilter::Category(_) => self.matches(name),
        }
    }
}

/// Current filter, search term and page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexState {
    pub filter: CategoryFilter,
    /// Lowercased search term; empty means no search
    pub search: String,
    /// 1-based
    pub page: usize,
}

impl Default for IndexState {
    fn default() -> Self {
        Self {
            filter: CategoryFilter::All,
            search: String::new(),
            page: 1,
        }
    }
}

/// Interactions the index page reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetFilter(CategoryFilter),
    SetSearch(String),
    /// Clicking a tag searches for it
    SelectTag(String),
    GoToPage(usize),
}

/// Loaded index data, restricted to published posts
#[derive(Debug, Clone, Default)]
pub struct IndexData {
    pub posts: Vec<PostSummary>,
    pub categories: Vec<CategoryStat>,
    pub tags: Vec<TagStat>,
}

impl From<SummaryIndex> for IndexData {
    fn from(index: SummaryIndex) -> Self {
        Self {
            posts: index.posts.into_iter().filter(|p| p.published).collect(),
            categories: index.categories,
            tags: index.tags,
        }
    }
}

impl IndexData {
    /// Published posts passing the category filter and the search term, in index order
    pub fn filtered(&self, state: &IndexState) -> Vec<&PostSummary> {
        self.posts
            .iter()
            .filter(|p| state.filter.matches(&p.category))
            .filter(|p| matches_search(p, &state.search))
            .collect()
    }
}

fn matches_search(post: &PostSummary, search: &str) -> bool {
    search.is_empty()
        || post.title.to_lowercase().contains(search)
        || post.summary.to_lowercase().contains(search)
        || post
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(search))
}

/// Number of pages needed for `count` posts
pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    count.div_ceil(per_page)
}

/// Apply an action to the state
pub fn reduce(data: &IndexData, state: &IndexState, action: Action, per_page: usize) -> IndexState {
    match action {
        Action::SetFilter(filter) => IndexState {
            filter,
            page: 1,
            ..state.clone()
        },
        Action::SetSearch(term) => IndexState {
            search: term.trim().to_lowercase(),
            page: 1,
            ..state.clone()
        },
        Action::SelectTag(tag) => IndexState {
            search: tag.trim().to_lowercase(),
            page: 1,
            ..state.clone()
        },
        Action::GoToPage(page) => {
            let total = total_pages(data.filtered(state).len(), per_page);
            if page < 1 || page > total || page == state.page {
                state.clone()
            } else {
                IndexState {
                    page,
                    ..state.clone()
                }
            }
        }
    }
}

/// Markup for every container on the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView {
    pub posts: String,
    pub pagination: String,
    pub filters: String,
    pub categories: String,
    pub tags: String,
    pub recent: String,
}

/// Render the full index page for a state
pub fn render(data: &IndexData, state: &IndexState, config: &IndexConfig) -> IndexView {
    let filtered = data.filtered(state);
    let total = total_pages(filtered.len(), config.per_page);
    let start = (state.page.saturating_sub(1)).saturating_mul(config.per_page);
    let page_posts: Vec<&PostSummary> = filtered
        .into_iter()
        .skip(start)
        .take(config.per_page)
        .collect();

    IndexView {
        posts: render_posts(&page_posts),
        pagination: render_pagination(state.page, total),
        filters: render_filters(&data.categories, &state.filter),
        categories: render_categories(&data.categories),
        tags: render_tags(&data.tags),
        recent: render_recent(&data.posts, config.recent_posts),
    }
}

pub fn render_posts(posts: &[&PostSummary]) -> String {
    if posts.is_empty() {
        return r#"<p class="no-posts">No posts found matching your criteria.</p>"#.to_string();
    }
    posts.iter().map(|p| render_post_card(p)).collect()
}

pub fn render_post_card(post: &PostSummary) -> String {
    let href = html_escape(&post_url(&post.slug));
    let mut html = String::new();

    html.push_str(if post.featured {
        "<article class=\"post-card featured\">\n"
    } else {
        "<article class=\"post-card\">\n"
    });
    html.push_str("<div class=\"post-meta\">");
    html.push_str(&format!(
        "<span class=\"post-date\">{}</span>",
        html_escape(&long_date(&post.publish_date))
    ));
    html.push_str(&format!(
        "<span class=\"post-category\">{}</span>",
        html_escape(&post.category)
    ));
    html.push_str(&format!(
        "<span class=\"post-read-time\">{} min read</span>",
        post.read_time
    ));
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<h2 class=\"post-card-title\"><a href=\"{}\">{}</a></h2>\n",
        href,
        html_escape(&post.title)
    ));
    html.push_str(&format!(
        "<p class=\"post-card-summary\">{}</p>\n",
        html_escape(&post.summary)
    ));
    if !post.tags.is_empty() {
        html.push_str("<div class=\"post-card-tags\">");
        for tag in &post.tags {
            html.push_str(&format!("<span class=\"tag\">{}</span>", html_escape(tag)));
        }
        html.push_str("</div>\n");
    }
    html.push_str(&format!(
        "<a href=\"{}\" class=\"read-more\">Read More →</a>\n",
        href
    ));
    if post.featured {
        html.push_str("<span class=\"featured-badge\">Featured</span>\n");
    }
    html.push_str("</article>\n");
    html
}

/// Page buttons; empty when everything fits on one page
pub fn render_pagination(current: usize, total: usize) -> String {
    if total <= 1 {
        return String::new();
    }

    let mut html = String::new();
    if current > 1 {
        html.push_str(&format!(
            "<button class=\"pagination-btn\" data-page=\"{}\">← Previous</button>",
            current - 1
        ));
    }
    for page in 1..=total {
        let class = if page == current {
            "pagination-btn active"
        } else {
            "pagination-btn"
        };
        html.push_str(&format!(
            "<button class=\"{}\" data-page=\"{}\">{}</button>",
            class, page, page
        ));
    }
    if current < total {
        html.push_str(&format!(
            "<button class=\"pagination-btn\" data-page=\"{}\">Next →</button>",
            current + 1
        ));
    }
    html
}

pub fn render_filters(categories: &[CategoryStat], active: &CategoryFilter) -> String {
    let mut html = String::new();
    let all_class = if *active == CategoryFilter::All {
        "filter-btn active"
    } else {
        "filter-btn"
    };
    html.push_str(&format!(
        "<button class=\"{}\" data-category=\"all\">All</button>",
        all_class
    ));
    for category in categories {
        let class = if active.is_category(&category.name) {
            "filter-btn active"
        } else {
            "filter-btn"
        };
        html.push_str(&format!(
            "<button class=\"{}\" data-category=\"{}\">{}</button>",
            class,
            html_escape(&category_slug(category)),
            html_escape(&category.name)
        ));
    }
    html
}

pub fn render_categories(categories: &[CategoryStat]) -> String {
    categories
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"#\" data-category=\"{}\" class=\"category-link\">{} ({})</a></li>",
                html_escape(&category_slug(c)),
                html_escape(&c.name),
                c.count
            )
        })
        .collect()
}

pub fn render_tags(tags: &[TagStat]) -> String {
    tags.iter()
        .map(|t| {
            format!(
                "<span class=\"tag-link\" data-tag=\"{}\">{}</span>",
                html_escape(&t.name),
                html_escape(&t.name)
            )
        })
        .collect()
}

/// The newest `limit` posts as sidebar links
pub fn render_recent(posts: &[PostSummary], limit: usize) -> String {
    let mut recent: Vec<&PostSummary> = posts.iter().collect();
    recent.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

    recent
        .into_iter()
        .take(limit)
        .map(|p| {
            format!(
                "<li>{}<span class=\"recent-date\">{}</span></li>",
                link_to(&post_url(&p.slug), &p.title),
                html_escape(&long_date(&p.publish_date))
            )
        })
        .collect()
}

fn category_slug(category: &CategoryStat) -> String {
    category
        .slug
        .clone()
        .unwrap_or_else(|| generate_slug(&category.name))
}

/// Holds the loaded data and current state of one index page view
#[derive(Debug)]
pub struct IndexController {
    data: IndexData,
    state: IndexState,
    config: IndexConfig,
}

impl IndexController {
    pub fn new(data: IndexData, config: &IndexConfig) -> Self {
        Self {
            data,
            state: IndexState::default(),
            config: config.clone(),
        }
    }

    pub fn load<S: ArtifactSource>(source: &S, config: &IndexConfig) -> Result<Self, FetchError> {
        let index = source.fetch_index()?;
        tracing::debug!("Loaded index with {} posts", index.posts.len());
        Ok(Self::new(IndexData::from(index), config))
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    pub fn data(&self) -> &IndexData {
        &self.data
    }

    pub fn dispatch(&mut self, action: Action) -> &IndexState {
        self.state = reduce(&self.data, &self.state, action, self.config.per_page);
        &self.state
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.data.filtered(&self.state).len(), self.config.per_page)
    }

    pub fn view(&self) -> IndexView {
        render(&self.data, &self.state, &self.config)
    }
}
