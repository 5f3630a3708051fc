//! Build the JSON artifacts

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Quiet period after the last change before rebuilding
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Build every post and write the artifacts
pub fn run(blog: &Blog) -> Result<BuildReport> {
    let start = Instant::now();

    let report = Generator::new(blog).generate()?;

    if report.skipped > 0 {
        tracing::warn!("Skipped {} invalid documents", report.skipped);
    }
    tracing::info!(
        "Processed {} posts in {:.2}s",
        report.posts,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Human-readable build summary
pub fn summary(report: &BuildReport) -> String {
    format!(
        "Summary:\n  Posts: {}\n  Categories: {}\n  Tags: {}\n  Published: {}\n  Featured: {}",
        report.posts, report.categories, report.tags, report.published, report.featured
    )
}

/// Watch the content directory and config file, rebuilding on change
pub async fn watch(blog: &Blog) -> Result<()> {
    watch_with(blog, |_| {}).await
}

/// Rebuild once each burst of changes settles, then call `on_rebuild`
///
/// Changes arriving while a build runs are queued and trigger another build.
pub async fn watch_with<F>(blog: &Blog, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&BuildReport),
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
        let _ = tx.send(res);
    })?;

    debouncer
        .watcher()
        .watch(&blog.content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", blog.content_dir);

    let config_path = blog.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", blog.content_dir);

    while let Some(res) = rx.recv().await {
        let events = match res {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed = changed_paths(events.iter().map(|e| e.path.as_path()));
        if changed.is_empty() {
            continue;
        }
        for path in &changed {
            tracing::info!("File changed: {}", path.display());
        }

        // Pick up config edits as well
        match Blog::new(&blog.base_dir).and_then(|blog| run(&blog)) {
            Ok(report) => {
                println!("{}", summary(&report));
                on_rebuild(&report);
            }
            Err(e) => tracing::error!("Build failed: {}", e),
        }
    }

    Ok(())
}

/// Paths worth a rebuild; editor and VCS noise is dropped
fn changed_paths<'a>(paths: impl Iterator<Item = &'a Path>) -> Vec<&'a Path> {
    paths
        .filter(|path| {
            let path_str = path.to_string_lossy();
            !path_str.contains(".git")
                && !path_str.contains(".DS_Store")
                && !path_str.ends_with('~')
                && !path_str.ends_with(".swp")
        })
        .collect()
}
