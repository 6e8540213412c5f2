//! Document and Site models

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::FrontMatter;

lazy_static! {
    /// `YYYY-MM-DD-slug` file stems used for posts
    static ref DATED_STEM: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$").unwrap();
}

/// Kind of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Page,
    Post,
}

impl Layout {
    /// Map a front-matter `layout` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "page" => Some(Layout::Page),
            "post" => Some(Layout::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Page => "page",
            Layout::Post => "post",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the body is turned into HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    Markdown,
    /// Passed through untouched
    Html,
}

/// A post or page loaded from the source tree
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Page or post
    pub layout: Layout,

    /// Title from front-matter
    pub title: Option<String>,

    /// Explicit permalink from front-matter
    pub permalink: Option<String>,

    /// Summary used for meta tags and the feed
    pub description: Option<String>,

    /// Explicit `date`, or the date prefix of the filename
    pub date: Option<DateTime<FixedOffset>>,

    /// Whether comments are enabled
    pub comments: bool,

    pub keywords: Vec<String>,

    /// Whether the document is published
    pub published: bool,

    /// URL-friendly name derived from the filename
    pub slug: String,

    /// Source file path relative to the source directory
    pub source: PathBuf,

    pub format: BodyFormat,

    /// Raw body (everything after the front-matter block)
    pub body: String,

    /// Custom front-matter fields
    pub extra: BTreeMap<String, String>,
}

impl Document {
    /// Build a document from its source path and raw text.
    ///
    /// `default_layout` applies when front-matter names no known layout.
    pub fn from_source(source: impl Into<PathBuf>, text: &str, default_layout: Layout) -> Self {
        let source = source.into();
        let (fm, body) = FrontMatter::parse(text);

        let layout = match fm.layout() {
            Some(name) => Layout::from_name(name).unwrap_or_else(|| {
                tracing::debug!(
                    "Unknown layout '{}' in {:?}, using {}",
                    name,
                    source,
                    default_layout
                );
                default_layout
            }),
            None => default_layout,
        };

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let (stem_date, stem_slug) = split_dated_stem(stem);

        let title = fm.title().map(str::to_string);
        let slug = match slug::slugify(stem_slug) {
            s if !s.is_empty() => s,
            _ => title.as_deref().map(slug::slugify).unwrap_or_default(),
        };

        let format = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                BodyFormat::Html
            }
            _ => BodyFormat::Markdown,
        };

        Self {
            layout,
            title,
            permalink: fm.permalink().map(str::to_string),
            description: fm.description().map(str::to_string),
            date: fm.parse_date().or(stem_date),
            comments: fm.comments(),
            keywords: fm.keywords(),
            published: fm.published(),
            slug,
            source,
            format,
            body: body.to_string(),
            extra: fm.extra(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.layout == Layout::Post
    }

    /// Title for display, falling back to the slug
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }
}

/// Split `2019-08-21-akka-streams` into its date and `akka-streams`
fn split_dated_stem(stem: &str) -> (Option<DateTime<FixedOffset>>, &str) {
    let Some(caps) = DATED_STEM.captures(stem) else {
        return (None, stem);
    };
    let date = (|| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(FixedOffset::east_opt(0)?.from_utc_datetime(&midnight))
    })();
    match (date, caps.get(4)) {
        (Some(date), Some(rest)) => (Some(date), rest.as_str()),
        _ => (None, stem),
    }
}

/// All content of a site, in source-path order
#[derive(Debug, Clone, Default)]
pub struct Site {
    documents: Vec<Document>,
    /// Non-document files copied verbatim, relative to the source directory
    assets: Vec<PathBuf>,
}

impl Site {
    pub fn new(mut documents: Vec<Document>, mut assets: Vec<PathBuf>) -> Self {
        documents.sort_by(|a, b| a.source.cmp(&b.source));
        assets.sort();
        Self { documents, assets }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn posts(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.layout == Layout::Post)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.layout == Layout::Page)
    }

    pub fn assets(&self) -> &[PathBuf] {
        &self.assets
    }

    /// Find a document by its relative source path
    pub fn get(&self, source: &Path) -> Option<&Document> {
        self.documents.iter().find(|d| d.source == source)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
