//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file at the site root
pub const CONFIG_FILE: &str = "_config.yml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub baseurl: String,
    /// Permalink pattern for posts, or one of the named styles
    /// (`pretty`, `date`, `none`)
    pub permalink: String,

    // Directory
    pub source: String,
    pub destination: String,
    pub exclude: Vec<String>,

    // Feed
    pub feed_path: String,

    // Writing
    /// Comma separated list of extensions treated as Markdown
    pub markdown_ext: String,
    pub highlight_theme: String,
    pub show_drafts: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://localhost:4000".to_string(),
            baseurl: String::new(),
            permalink: "pretty".to_string(),

            source: ".".to_string(),
            destination: "_site".to_string(),
            exclude: vec![
                "Gemfile".to_string(),
                "Gemfile.lock".to_string(),
                "node_modules".to_string(),
                "vendor".to_string(),
            ],

            feed_path: "feed.xml".to_string(),

            markdown_ext: "markdown,mkdown,mkdn,mkd,md".to_string(),
            highlight_theme: "InspiredGitHub".to_string(),
            show_drafts: false,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        // An empty file is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Load `_config.yml` from the site root, falling back to defaults
    pub fn load_or_default<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let path = base_dir.as_ref().join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// The permalink pattern applied to posts without an explicit permalink
    pub fn post_permalink_pattern(&self) -> &str {
        match self.permalink.trim() {
            "" | "pretty" => "/:year/:month/:day/:title/",
            "date" => "/:categories/:year/:month/:day/:title.html",
            "ordinal" => "/:categories/:year/:y_day/:title.html",
            "none" => "/:categories/:title.html",
            pattern => pattern,
        }
    }

    /// Extensions (without the leading dot) rendered as Markdown
    pub fn markdown_extensions(&self) -> Vec<String> {
        self.markdown_ext
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Whether a file or directory name is listed in `exclude`
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e.trim_end_matches('/') == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.destination, "_site");
        assert_eq!(config.feed_path, "feed.xml");
        assert_eq!(config.post_permalink_pattern(), "/:year/:month/:day/:title/");
        assert!(config.is_excluded("Gemfile"));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Notes on Scala
author: Test User
url: https://blog.example.com
permalink: /blog/:year/:title.html
markdown_ext: "md, .markdown"
github_username: tester
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Notes on Scala");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.post_permalink_pattern(), "/blog/:year/:title.html");
        assert_eq!(config.markdown_extensions(), vec!["md", "markdown"]);
        assert_eq!(
            config.extra.get("github_username").and_then(|v| v.as_str()),
            Some("tester")
        );
        // Unset keys keep their defaults
        assert_eq!(config.destination, "_site");
    }

    #[test]
    fn test_named_permalink_styles() {
        let mut config = SiteConfig::default();
        config.permalink = "none".to_string();
        assert_eq!(config.post_permalink_pattern(), "/:categories/:title.html");
        config.permalink = "date".to_string();
        assert_eq!(
            config.post_permalink_pattern(),
            "/:categories/:year/:month/:day/:title.html"
        );
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "My Blog");
    }
}
