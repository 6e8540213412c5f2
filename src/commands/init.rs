//! Initialize a new site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::content::loader::POSTS_DIR;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Blog
description: ''
author: ''

# URL
url: http://localhost:4000
baseurl: ''
# pretty, date, none, or a pattern using :year :month :day :title
permalink: pretty

# Directories
source: .
destination: _site
exclude:
  - Gemfile
  - Gemfile.lock
  - node_modules
  - vendor

# Feed
feed_path: feed.xml

# Writing
markdown_ext: markdown,mkdown,mkdn,mkd,md
highlight_theme: InspiredGitHub
show_drafts: false
"#;

const ABOUT_PAGE: &str = r#"---
layout: page
title: About
permalink: /about/
---

Write something about yourself here.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already contains a site", target_dir);
    }

    fs::create_dir_all(target_dir.join(POSTS_DIR))
        .with_context(|| format!("Failed to create {:?}", target_dir))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("about.md"), ABOUT_PAGE)?;

    let now = chrono::Local::now();
    let welcome = format!(
        r#"---
layout: post
title: Welcome
date: {}
description: The first post of this blog
---

This post was generated by `quillpress init`. Edit it, or create a new one:

```bash
$ quillpress new "My New Post"
```

Then build the site into `_site/`:

```bash
$ quillpress build
```
"#,
        now.format("%Y-%m-%d %H:%M:%S %z")
    );
    fs::write(
        target_dir
            .join(POSTS_DIR)
            .join(format!("{}-welcome.md", now.format("%Y-%m-%d"))),
        welcome,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;

    #[test]
    fn test_init_then_build() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "My Blog");

        let report = blog.build().unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.pages, 1);
        assert_eq!(report.feed_entries, 1);
        assert!(blog.dest_dir.join("about/index.html").exists());

        // A second init must not clobber the site
        assert!(init_site(dir.path()).is_err());
    }
}
