//! Generator module - writes routed documents, static assets and the feed

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use tera::Context;

use crate::content::{BodyFormat, Layout, MarkdownRenderer, Site};
use crate::feed;
use crate::helpers::url_for;
use crate::router::{output_path, normalize_permalink, Route, Routes};
use crate::templates::{PageData, PostSummary, SiteData, TemplateRenderer};
use crate::Blog;

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
    pub feed_entries: usize,
    /// Whether a post index was generated at `/`
    pub index_generated: bool,
}

/// Static site generator using the embedded Tera layouts
pub struct Generator<'a> {
    blog: &'a Blog,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog) -> Result<Self> {
        Ok(Self {
            blog,
            renderer: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::with_theme(&blog.config.highlight_theme),
        })
    }

    /// Generate the entire site
    pub fn generate(&self, site: &Site, routes: &Routes<'_>) -> Result<BuildReport> {
        let dest_dir = &self.blog.dest_dir;
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create dir {:?}", dest_dir))?;

        self.copy_assets(site)?;

        let site_data = self.build_site_data();
        let mut report = BuildReport {
            assets: site.assets().len(),
            ..BuildReport::default()
        };

        for route in routes.iter() {
            let html = self.render_document(route, &site_data)?;
            write_output(&dest_dir.join(&route.output), &html)?;
            tracing::debug!("Generated {} -> {:?}", route.permalink, route.output);
            match route.document.layout {
                Layout::Post => report.posts += 1,
                Layout::Page => report.pages += 1,
            }
        }

        if !routes.is_claimed(&output_path("/")) {
            self.generate_index(routes, &site_data)?;
            report.index_generated = true;
        }

        report.feed_entries = feed::entries(routes).count();
        feed::write_feed(&self.blog.config, routes, dest_dir)?;

        Ok(report)
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData {
        let config = &self.blog.config;
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            home_url: url_for(config, "/"),
            feed_url: url_for(config, &normalize_permalink(&config.feed_path)),
        }
    }

    /// Render one document through its layout
    fn render_document(&self, route: &Route<'_>, site_data: &SiteData) -> Result<String> {
        let document = route.document;

        let content = match document.format {
            BodyFormat::Markdown => self
                .markdown
                .render(&document.body)
                .with_context(|| format!("Failed to render {:?}", document.source))?,
            BodyFormat::Html => document.body.clone(),
        };

        let page = PageData {
            title: document.display_title().to_string(),
            date: document.date.map(|d| d.format("%Y-%m-%d").to_string()),
            url: url_for(&self.blog.config, &route.permalink),
            description: document.description.clone(),
            keywords: document.keywords.clone(),
            comments: document.comments,
            content,
        };

        let template = match document.layout {
            Layout::Post => "post.html",
            Layout::Page => "page.html",
        };

        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("page", &page);

        self.renderer
            .render(template, &context)
            .with_context(|| format!("Failed to apply {} to {:?}", template, document.source))
    }

    /// Post listing at `/`, written when no document claims it
    fn generate_index(&self, routes: &Routes<'_>, site_data: &SiteData) -> Result<()> {
        let posts: Vec<PostSummary> = feed::entries(routes)
            .map(|entry| PostSummary {
                title: entry.title.to_string(),
                date: entry.date.format("%Y-%m-%d").to_string(),
                url: url_for(&self.blog.config, entry.permalink),
                description: entry.description.map(str::to_string),
            })
            .collect();

        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("posts", &posts);

        let html = self.renderer.render("index.html", &context)?;
        write_output(&self.blog.dest_dir.join(output_path("/")), &html)?;
        tracing::debug!("Generated index with {} posts", posts.len());
        Ok(())
    }

    /// Copy static assets to the destination directory
    fn copy_assets(&self, site: &Site) -> Result<()> {
        for relative in site.assets() {
            let from = self.blog.source_dir.join(relative);
            let to = self.blog.dest_dir.join(relative);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create dir {:?}", parent))?;
            }
            fs::copy(&from, &to).with_context(|| format!("Failed to copy {:?}", from))?;
        }
        Ok(())
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
