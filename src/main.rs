//! CLI entry point for quillpress

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillpress::commands::build::BuildOptions;
use quillpress::content::Layout;

#[derive(Parser)]
#[command(name = "quillpress")]
#[command(version)]
#[command(about = "A small static site generator for Markdown blogs", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new document
        title: String,

        /// File name to use instead of the slugified title
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Build the site into the destination directory
    #[command(alias = "b")]
    Build {
        /// Include documents marked `published: false`
        #[arg(long)]
        drafts: bool,

        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove the destination directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, page, route)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "quillpress=debug,info"
    } else {
        "quillpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            quillpress::commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            name,
        } => {
            let blog = quillpress::Blog::new(&base_dir)?;
            let layout = Layout::from_name(&layout)
                .with_context(|| format!("Unknown layout {:?}. Available: post, page", layout))?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            let path =
                quillpress::commands::new::create_document(&blog, &title, layout, name.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::Build { drafts, watch } => {
            let blog = quillpress::Blog::new(&base_dir)?;
            let options = BuildOptions { drafts };
            tracing::info!("Building site...");

            let report = quillpress::commands::build::run(&blog, &options)?;
            println!(
                "Built {} posts and {} pages into {:?}",
                report.posts, report.pages, blog.dest_dir
            );

            if watch {
                quillpress::commands::build::watch(&blog, &options)?;
            }
        }

        Commands::Clean => {
            let blog = quillpress::Blog::new(&base_dir)?;
            tracing::info!("Cleaning destination folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = quillpress::Blog::new(&base_dir)?;
            quillpress::commands::list::run(&blog, &r#type)?;
        }
    }

    Ok(())
}
