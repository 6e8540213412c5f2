//! Create a new post or page

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::loader::POSTS_DIR;
use crate::content::Layout;
use crate::Blog;

/// Create a new post or page and return its path.
///
/// Posts land in `_posts` as `YYYY-MM-DD-slug.md`, pages at the source root
/// as `slug.md`. `name` overrides the slug-derived file name.
pub fn create_document(
    blog: &Blog,
    title: &str,
    layout: Layout,
    name: Option<&str>,
) -> Result<PathBuf> {
    let now = chrono::Local::now();
    let slug = match name {
        Some(name) => name.trim_end_matches(".md").to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = match layout {
        Layout::Post => blog
            .source_dir
            .join(POSTS_DIR)
            .join(format!("{}-{}.md", now.format("%Y-%m-%d"), slug)),
        Layout::Page => blog.source_dir.join(format!("{}.md", slug)),
    };

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // Let YAML decide whether the title needs quoting
    let title_yaml = serde_yaml::to_string(title)?;
    let mut content = format!("---\nlayout: {}\ntitle: {}\n", layout, title_yaml.trim_end());
    match layout {
        Layout::Post => {
            content.push_str(&format!("date: {}\n", now.format("%Y-%m-%d %H:%M:%S %z")));
            content.push_str("description:\ncomments: true\n");
        }
        Layout::Page => content.push_str(&format!("permalink: /{}/\n", slug)),
    }
    content.push_str("---\n");

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Document;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());

        let path = create_document(&blog, "Akka: Streams", Layout::Post, None).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.ends_with("-akka-streams.md"));
        assert!(path.starts_with(dir.path().join("_posts")));

        let text = fs::read_to_string(&path).unwrap();
        let doc = Document::from_source(format!("_posts/{}", file_name), &text, Layout::Page);
        assert_eq!(doc.layout, Layout::Post);
        assert_eq!(doc.title.as_deref(), Some("Akka: Streams"));
        assert!(doc.date.is_some());
        assert!(doc.comments);

        // Same title again collides
        assert!(create_document(&blog, "Akka: Streams", Layout::Post, None).is_err());
    }

    #[test]
    fn test_create_page() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());

        let path = create_document(&blog, "About", Layout::Page, None).unwrap();
        assert_eq!(path, dir.path().join("./about.md"));
        let text = fs::read_to_string(&path).unwrap();
        let doc = Document::from_source("about.md", &text, Layout::Post);
        assert_eq!(doc.layout, Layout::Page);
        assert_eq!(doc.permalink.as_deref(), Some("/about/"));
    }
}
