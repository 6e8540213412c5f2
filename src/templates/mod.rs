//! Built-in layouts using the Tera template engine
//!
//! The templates are embedded in the binary so a site needs nothing but its
//! content and `_config.yml`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded layouts
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all layouts loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered bodies are HTML already; text fields are escaped in the
        // templates with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("post.html", include_str!("theme/post.html")),
            ("page.html", include_str!("theme/page.html")),
            ("index.html", include_str!("theme/index.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Site-wide values available to every layout as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub home_url: String,
    pub feed_url: String,
}

/// The document being rendered, available as `page`
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub comments: bool,
    pub content: String,
}

/// Entry of the generated post index
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub date: String,
    pub url: String,
    pub description: Option<String>,
}
