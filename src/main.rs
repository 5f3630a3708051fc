//! CLI entry point for postforge

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postforge::client::progress::ScrollMetrics;
use postforge::commands::{build, list, preview};
use postforge::Blog;

#[derive(Parser)]
#[command(name = "postforge")]
#[command(version)]
#[command(about = "Builds JSON post artifacts for a static blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Defaults to `build`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the post artifacts
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the generated artifacts
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Render a blog page from the built artifacts
    Preview {
        /// Page location, e.g. `/blog/` or `/blog/post.html?post=hello-world`
        location: String,

        /// Category filter for the index page
        #[arg(long)]
        category: Option<String>,

        /// Search term for the index page
        #[arg(long)]
        search: Option<String>,

        /// Page number for the index page
        #[arg(long)]
        page: Option<usize>,

        /// Scroll sample for a post page: scrollTop,contentTop,contentHeight,windowHeight
        #[arg(long, value_name = "METRICS")]
        scroll: Vec<ScrollMetrics>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "postforge=debug,info"
    } else {
        "postforge=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let blog = Blog::new(&base_dir)?;

    match cli.command.unwrap_or(Commands::Build { watch: false }) {
        Commands::Build { watch } => {
            tracing::info!("Building post artifacts...");
            let report = blog.build()?;
            println!("{}", build::summary(&report));

            if watch {
                build::watch(&blog).await?;
            }
        }

        Commands::New { title } => {
            tracing::info!("Creating new post with title: {}", title);
            blog.new_post(&title)?;
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            tracing::info!("Building post artifacts...");
            let report = blog.build()?;
            println!("{}", build::summary(&report));

            tracing::info!("Starting server at http://{}:{}", ip, port);
            postforge::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            tracing::info!("Cleaning artifacts...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            list::run(&blog, &r#type)?;
        }

        Commands::Preview {
            location,
            category,
            search,
            page,
            scroll,
        } => {
            let options = preview::PreviewOptions {
                category,
                search,
                page,
                scroll,
            };
            preview::run(&blog, &location, &options)?;
        }
    }

    Ok(())
}
