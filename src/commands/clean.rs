//! Clean the destination directory

use anyhow::{Context, Result};
use std::fs;

use crate::Blog;

/// Remove the generated site
pub fn run(blog: &Blog) -> Result<()> {
    let dest = &blog.dest_dir;
    if dest == &blog.base_dir || dest == &blog.source_dir {
        anyhow::bail!(
            "Refusing to delete {:?}: destination overlaps the site sources",
            dest
        );
    }

    if dest.exists() {
        fs::remove_dir_all(dest).with_context(|| format!("Failed to delete {:?}", dest))?;
        tracing::info!("Deleted: {:?}", dest);
    } else {
        tracing::debug!("Nothing to clean at {:?}", dest);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(blog.dest_dir.join("about")).unwrap();
        fs::write(blog.dest_dir.join("about/index.html"), "x").unwrap();

        run(&blog).unwrap();
        assert!(!blog.dest_dir.exists());
        // Cleaning twice is fine
        run(&blog).unwrap();
    }

    #[test]
    fn test_clean_refuses_source_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.destination = ".".to_string();
        let blog = Blog::with_config(dir.path(), config);
        assert!(run(&blog).is_err());
        assert!(dir.path().exists());
    }
}
