//! Render a blog page from the built artifacts

use anyhow::Result;

use crate::client::index::{Action, CategoryFilter};
use crate::client::progress::ScrollMetrics;
use crate::client::{self, DirSource, Page};
use crate::Blog;

/// Page interactions to replay before rendering
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    /// Scroll samples for a post page, all delivered before one frame
    pub scroll: Vec<ScrollMetrics>,
}

pub fn run(blog: &Blog, location: &str, options: &PreviewOptions) -> Result<()> {
    print!("{}", render(blog, location, options)?);
    Ok(())
}

/// Markup for each page container, keyed by element id
pub fn render(blog: &Blog, location: &str, options: &PreviewOptions) -> Result<String> {
    let source = DirSource::new(&blog.data_dir);
    let mut out = String::new();

    match client::open(&source, &blog.config, location) {
        Page::Index(mut controller) => {
            if let Some(category) = &options.category {
                controller.dispatch(Action::SetFilter(CategoryFilter::parse(category)));
            }
            if let Some(search) = &options.search {
                controller.dispatch(Action::SetSearch(search.clone()));
            }
            if let Some(page) = options.page {
                controller.dispatch(Action::GoToPage(page));
            }

            let view = controller.view();
            section(&mut out, "categoryFilters", &view.filters);
            section(&mut out, "blogPosts", &view.posts);
            section(&mut out, "pagination", &view.pagination);
            section(&mut out, "categoriesList", &view.categories);
            section(&mut out, "tagsList", &view.tags);
            section(&mut out, "recentPosts", &view.recent);
        }
        Page::IndexUnavailable => {
            section(
                &mut out,
                "blogPosts",
                "<div class=\"error-message\"><p>Failed to load blog posts. Please try again later.</p></div>",
            );
        }
        Page::Post(mut state) => {
            if let client::DetailState::Loaded(view) = &mut state {
                for metrics in &options.scroll {
                    view.on_scroll(*metrics);
                }
                if let Some(width) = view.on_frame() {
                    tracing::debug!("Reading progress: {}%", width);
                }
            }
            if let client::DetailState::Loaded(view) = &state {
                section(&mut out, "head", &view.meta.render());
                section(&mut out, "postContent", &state.render());
                section(&mut out, "tableOfContents", &view.toc);
                section(&mut out, "relatedPosts", &view.related);
                section(&mut out, "share", &view.share.render());
            } else {
                section(&mut out, "errorState", &state.render());
            }
        }
        Page::Other => {
            anyhow::bail!("Not a blog page: {}", location);
        }
    }

    Ok(out)
}

fn section(out: &mut String, id: &str, html: &str) {
    out.push_str(&format!("<!-- #{} -->\n{}\n", id, html));
}
