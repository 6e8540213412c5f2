//! Permalink routing
//!
//! Every document resolves to a permalink, either the one declared in its
//! front-matter or a default derived from its layout. Each permalink maps to
//! one output file under the destination directory. Two documents claiming
//! the same permalink or output file, or a document landing on a static
//! asset, abort the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{Document, Layout, Site};

/// Routing failures. Both are fatal for a build.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("permalink collision: {first:?} and {second:?} both resolve to {permalink} ({output:?})")]
    Collision {
        permalink: String,
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{document:?} claims {permalink}, which is reserved for the feed")]
    Reserved { permalink: String, document: PathBuf },
}

/// A resolved document location
#[derive(Debug, Clone)]
pub struct Route<'a> {
    /// Normalized permalink, always starting with `/`
    pub permalink: String,
    /// File path relative to the destination directory
    pub output: PathBuf,
    pub document: &'a Document,
}

/// Permalink table for a site
#[derive(Debug, Clone, Default)]
pub struct Routes<'a> {
    by_permalink: BTreeMap<String, Route<'a>>,
    by_source: BTreeMap<PathBuf, String>,
    /// output file -> source that claimed it, documents and assets alike
    outputs: BTreeMap<PathBuf, PathBuf>,
}

impl<'a> Routes<'a> {
    /// Resolve every document of the site
    pub fn build(site: &'a Site, config: &SiteConfig) -> Result<Self, RouteError> {
        let pattern = config.post_permalink_pattern();
        let feed_permalink = normalize_permalink(&config.feed_path);
        let feed_output = output_path(&feed_permalink);

        let mut routes = Routes::default();

        for asset in site.assets() {
            if *asset == feed_output {
                return Err(RouteError::Reserved {
                    permalink: feed_permalink,
                    document: asset.clone(),
                });
            }
            routes.outputs.insert(asset.clone(), asset.clone());
        }

        for document in site.documents() {
            let permalink = resolve_permalink(document, pattern);
            let output = output_path(&permalink);

            if output == feed_output {
                return Err(RouteError::Reserved {
                    permalink,
                    document: document.source.clone(),
                });
            }

            if let Some(first) = routes.outputs.get(&output) {
                return Err(RouteError::Collision {
                    permalink,
                    output,
                    first: first.clone(),
                    second: document.source.clone(),
                });
            }

            tracing::debug!("Route {} -> {:?}", permalink, document.source);
            routes
                .outputs
                .insert(output.clone(), document.source.clone());
            routes
                .by_source
                .insert(document.source.clone(), permalink.clone());
            routes.by_permalink.insert(
                permalink.clone(),
                Route {
                    permalink,
                    output,
                    document,
                },
            );
        }

        Ok(routes)
    }

    /// Document served at a permalink
    pub fn get(&self, permalink: &str) -> Option<&'a Document> {
        self.by_permalink
            .get(&normalize_permalink(permalink))
            .map(|r| r.document)
    }

    /// Permalink assigned to a document
    pub fn permalink_of(&self, document: &Document) -> Option<&str> {
        self.by_source.get(&document.source).map(String::as_str)
    }

    pub fn contains(&self, permalink: &str) -> bool {
        self.by_permalink.contains_key(&normalize_permalink(permalink))
    }

    /// Whether a document or asset writes this file, relative to the destination
    pub fn is_claimed(&self, output: &Path) -> bool {
        self.outputs.contains_key(output)
    }

    /// Routes in permalink order
    pub fn iter(&self) -> impl Iterator<Item = &Route<'a>> {
        self.by_permalink.values()
    }

    pub fn len(&self) -> usize {
        self.by_permalink.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_permalink.is_empty()
    }
}

/// Explicit permalink if declared, otherwise the layout default
pub fn resolve_permalink(document: &Document, post_pattern: &str) -> String {
    match document.permalink.as_deref() {
        Some(explicit) => normalize_permalink(explicit),
        None => default_permalink(document, post_pattern),
    }
}

/// Default permalink.
///
/// Posts expand the configured pattern; pages mirror their source path,
/// `about.md` -> `/about/`, `docs/index.md` -> `/docs/`.
pub fn default_permalink(document: &Document, post_pattern: &str) -> String {
    match document.layout {
        Layout::Post => match document.date {
            Some(date) => normalize_permalink(
                &post_pattern
                    .replace(":year", &date.format("%Y").to_string())
                    .replace(":i_month", &date.format("%-m").to_string())
                    .replace(":month", &date.format("%m").to_string())
                    .replace(":i_day", &date.format("%-d").to_string())
                    .replace(":y_day", &date.format("%j").to_string())
                    .replace(":day", &date.format("%d").to_string())
                    .replace(":categories", "")
                    .replace(":title", &document.slug)
                    .replace(":slug", &document.slug),
            ),
            None => {
                tracing::debug!(
                    "Post {:?} has no date, routing by slug",
                    document.source
                );
                normalize_permalink(&format!("/{}/", document.slug))
            }
        },
        Layout::Page => page_permalink(&document.source),
    }
}

fn page_permalink(source: &Path) -> String {
    let without_ext = source.with_extension("");
    let mut segments: Vec<String> = without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        normalize_permalink(&format!("/{}/", segments.join("/")))
    }
}

/// Leading slash, no empty, `.` or `..` segments, trailing slash preserved
pub fn normalize_permalink(permalink: &str) -> String {
    let permalink = permalink.trim();
    let segments: Vec<&str> = permalink
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if permalink.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Output file for a permalink, relative to the destination directory.
///
/// Directory-style permalinks (trailing slash, or no extension) get an
/// `index.html`.
pub fn output_path(permalink: &str) -> PathBuf {
    let relative = permalink.trim_start_matches('/');
    let path = PathBuf::from(relative);

    if relative.is_empty() || permalink.ends_with('/') || path.extension().is_none() {
        path.join("index.html")
    } else {
        path
    }
}
