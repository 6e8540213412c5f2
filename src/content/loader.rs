//! Content loader - loads posts, pages and static assets from the source directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{Document, Layout, Site};
use crate::Blog;

/// Directory holding dated posts
pub const POSTS_DIR: &str = "_posts";

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    include_drafts: bool,
    markdown_ext: Vec<String>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        Self {
            blog,
            include_drafts: blog.config.show_drafts,
            markdown_ext: blog.config.markdown_extensions(),
        }
    }

    /// Also load documents marked `published: false`
    pub fn with_drafts(mut self, include_drafts: bool) -> Self {
        self.include_drafts = self.include_drafts || include_drafts;
        self
    }

    /// Walk the source directory and load every document and asset
    pub fn load_site(&self) -> Result<Site> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.is_dir() {
            anyhow::bail!("Source directory {:?} does not exist", source_dir);
        }

        let mut documents = Vec::new();
        let mut assets = Vec::new();

        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| self.should_visit(e));

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(source_dir).unwrap_or(path).to_path_buf();

            let in_posts = relative
                .components()
                .next()
                .is_some_and(|c| c.as_os_str() == POSTS_DIR);

            if in_posts {
                if self.is_markdown_file(path) || is_html_file(path) {
                    self.load_into(&mut documents, path, relative, Layout::Post);
                }
                continue;
            }

            if is_private(&relative) {
                continue;
            }

            if (self.is_markdown_file(path) || is_html_file(path)) && has_frontmatter(path) {
                self.load_into(&mut documents, path, relative, Layout::Page);
            } else {
                assets.push(relative);
            }
        }

        let site = Site::new(documents, assets);
        tracing::debug!(
            "Loaded {} posts, {} pages, {} assets from {:?}",
            site.posts().count(),
            site.pages().count(),
            site.assets().len(),
            source_dir
        );
        Ok(site)
    }

    fn load_into(
        &self,
        documents: &mut Vec<Document>,
        path: &Path,
        relative: PathBuf,
        default_layout: Layout,
    ) {
        match self.load_document(path, relative, default_layout) {
            Ok(doc) if doc.published || self.include_drafts => documents.push(doc),
            Ok(doc) => tracing::debug!("Skipping unpublished {:?}", doc.source),
            Err(e) => tracing::warn!("Failed to load {:?}: {:#}", path, e),
        }
    }

    /// Load a single document from a file
    fn load_document(
        &self,
        path: &Path,
        relative: PathBuf,
        default_layout: Layout,
    ) -> Result<Document> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Document::from_source(relative, &text, default_layout))
    }

    /// Skip the destination directory and excluded entries
    fn should_visit(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if entry.path() == self.blog.dest_dir {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        !name.starts_with('.') && !self.blog.config.is_excluded(&name)
    }

    /// Check if a file is a markdown file
    fn is_markdown_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.markdown_ext.iter().any(|m| m.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Paths with a component starting with `_` or `.` are never published
pub(crate) fn is_private(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('_') || name.starts_with('.')
        }
        _ => false,
    })
}

/// Only files opening with a front-matter block are documents outside `_posts`
fn has_frontmatter(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|text| super::FrontMatter::detect(&text))
        .unwrap_or(false)
}
