//! RSS feed generation.
//!
//! Selects posts from the routing table, newest first, and serializes them as
//! an RSS 2.0 channel.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset};
use rss::{validation::Validate, ChannelBuilder, GuidBuilder, ItemBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::helpers::full_url_for;
use crate::router::{self, Route, Routes};

/// One syndicated post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry<'a> {
    pub title: &'a str,
    pub permalink: &'a str,
    pub description: Option<&'a str>,
    pub date: DateTime<FixedOffset>,
}

/// Posts eligible for the feed, newest first.
///
/// Only `post` documents are considered. Posts without a title or a date are
/// skipped. Posts sharing a date are ordered by permalink.
pub fn entries<'r>(routes: &'r Routes<'r>) -> impl Iterator<Item = FeedEntry<'r>> {
    let mut entries: Vec<FeedEntry<'r>> = routes
        .iter()
        .filter(|route| route.document.is_post())
        .filter_map(feed_entry)
        .collect();

    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.permalink.cmp(b.permalink))
    });

    entries.into_iter()
}

fn feed_entry<'r>(route: &'r Route<'r>) -> Option<FeedEntry<'r>> {
    let document = route.document;

    let Some(title) = document.title.as_deref() else {
        tracing::warn!("Post {:?} has no title, leaving it out of the feed", document.source);
        return None;
    };
    let Some(date) = document.date else {
        tracing::warn!("Post {:?} has no date, leaving it out of the feed", document.source);
        return None;
    };

    Some(FeedEntry {
        title,
        permalink: &route.permalink,
        description: document.description.as_deref(),
        date,
    })
}

/// Serialize entries as an RSS 2.0 document
pub fn to_xml<'a>(
    config: &SiteConfig,
    entries: impl IntoIterator<Item = FeedEntry<'a>>,
) -> Result<String> {
    let entries: Vec<_> = entries.into_iter().collect();

    let items: Vec<rss::Item> = entries
        .iter()
        .map(|entry| {
            let link = full_url_for(config, entry.permalink);
            ItemBuilder::default()
                .title(entry.title.to_string())
                .link(Some(link.clone()))
                .guid(GuidBuilder::default().permalink(true).value(link).build())
                .description(entry.description.map(str::to_string))
                .pub_date(entry.date.to_rfc2822())
                .build()
        })
        .collect();

    // Newest post date rather than the clock keeps rebuilds byte-identical
    let last_build_date = entries.iter().map(|e| e.date).max().map(|d| d.to_rfc2822());

    let channel = ChannelBuilder::default()
        .title(&config.title)
        .link(full_url_for(config, "/"))
        .description(&config.description)
        .last_build_date(last_build_date)
        .generator("quillpress".to_string())
        .items(items)
        .build();

    // Without a site `url` links stay root-relative, which validation rejects
    if config.url.trim().is_empty() {
        tracing::warn!("Site url is empty, feed links will be relative");
    } else {
        channel
            .validate()
            .map_err(|e| anyhow!("rss validation failed: {e}"))?;
    }
    Ok(channel.to_string())
}

/// Write the feed for all routed posts. Returns the file written.
pub fn write_feed(config: &SiteConfig, routes: &Routes<'_>, dest_dir: &Path) -> Result<PathBuf> {
    let xml = to_xml(config, entries(routes))?;
    let path = dest_dir.join(router::output_path(&router::normalize_permalink(
        &config.feed_path,
    )));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(&path, xml).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("Generated {}", config.feed_path);
    Ok(path)
}
