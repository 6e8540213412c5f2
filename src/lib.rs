//! quillpress: a small static site generator for Markdown blogs
//!
//! Documents carry a `---` fenced front-matter block. Posts live in `_posts`
//! with `YYYY-MM-DD-slug` filenames, pages anywhere else. A build resolves
//! every document to a permalink, renders it through the embedded layouts and
//! writes an RSS feed of the posts.

pub mod commands;
pub mod config;
pub mod content;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod router;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main application: configuration plus resolved directories
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Destination (output) directory
    pub dest_dir: PathBuf,
}

impl Blog {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config = config::SiteConfig::load_or_default(base_dir.as_ref())?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source);
        let dest_dir = base_dir.join(&config.destination);

        Self {
            config,
            base_dir,
            source_dir,
            dest_dir,
        }
    }

    /// Build the static site
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::build::run(self, &commands::build::BuildOptions::default())
    }

    /// Clean the destination directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new document
    pub fn new_document(&self, title: &str, layout: content::Layout) -> Result<PathBuf> {
        commands::new::create_document(self, title, layout, None)
    }
}
