//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::CONFIG_FILE;
use crate::content::loader::ContentLoader;
use crate::generator::{BuildReport, Generator};
use crate::router::Routes;
use crate::Blog;

/// Options for a build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Include documents marked `published: false`
    pub drafts: bool,
}

/// Load, route and render the site
pub fn run(blog: &Blog, options: &BuildOptions) -> Result<BuildReport> {
    let start = Instant::now();

    let site = ContentLoader::new(blog)
        .with_drafts(options.drafts)
        .load_site()?;
    tracing::info!(
        "Loaded {} posts and {} pages",
        site.posts().count(),
        site.pages().count()
    );

    let routes = Routes::build(&site, &blog.config)?;

    let report = Generator::new(blog)?.generate(&site, &routes)?;

    tracing::info!(
        "Generated {} posts, {} pages, {} assets in {:.2}s",
        report.posts,
        report.pages,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Watch for file changes and rebuild
pub fn watch(blog: &Blog, options: &BuildOptions) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&blog.source_dir, notify::RecursiveMode::Recursive)?;

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    let dest_dir = canonical(&blog.dest_dir);
    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", blog.source_dir);

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // Our own output lands inside the watched tree
                if event.paths.iter().all(|p| canonical(p).starts_with(&dest_dir)) {
                    continue;
                }
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    // Pick up `_config.yml` edits as well
                    let result = Blog::new(&blog.base_dir).and_then(|b| run(&b, options));
                    if let Err(e) = result {
                        tracing::error!("Build failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use walkdir::WalkDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_blog(root: &Path) {
        write(
            root,
            "_config.yml",
            "title: Notes\nurl: https://blog.example.com\ndescription: Notes on the JVM\n",
        );
        write(
            root,
            "_posts/2019-08-21-akka-streams.md",
            "---\nlayout: post\ntitle: Akka Streams\ndescription: Streams\ncomments: true\n---\n\n{% highlight scala %}\nSource(1 to 10)\n{% endhighlight %}\n",
        );
        write(
            root,
            "_posts/2019-07-01-actors.md",
            "---\nlayout: post\ntitle: Actors\n---\nActors.\n",
        );
        write(
            root,
            "_posts/2018-01-01-hbase.md",
            "---\nlayout: post\ntitle: HBase\nkeywords: hbase, bigtable\n---\nHBase.\n",
        );
        write(
            root,
            "about.md",
            "---\nlayout: page\ntitle: About\npermalink: /about/\n---\nAbout me.\n",
        );
        write(root, "css/main.css", "body { margin: 0 }");
    }

    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());

        let blog = Blog::new(dir.path()).unwrap();
        let report = run(&blog, &BuildOptions::default()).unwrap();
        assert_eq!(report.posts, 3);
        assert_eq!(report.pages, 1);
        assert_eq!(report.feed_entries, 3);
        assert!(report.index_generated);

        let dest = &blog.dest_dir;
        assert!(dest.join("2019/08/21/akka-streams/index.html").exists());
        assert!(dest.join("about/index.html").exists());
        assert!(dest.join("css/main.css").exists());
        assert!(!dest.join("_config.yml").exists());

        let feed = fs::read_to_string(dest.join("feed.xml")).unwrap();
        let streams = feed.find("Akka Streams").unwrap();
        let actors = feed.find("Actors").unwrap();
        let hbase = feed.find("HBase").unwrap();
        assert!(streams < actors && actors < hbase);
        assert!(!feed.contains("https://blog.example.com/about/"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());
        let blog = Blog::new(dir.path()).unwrap();

        run(&blog, &BuildOptions::default()).unwrap();
        let first = snapshot(&blog.dest_dir);
        run(&blog, &BuildOptions::default()).unwrap();
        let second = snapshot(&blog.dest_dir);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_without_site_url() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());
        write(dir.path(), "_config.yml", "title: Notes\nurl: \"\"\n");
        let blog = Blog::new(dir.path()).unwrap();

        let report = run(&blog, &BuildOptions::default()).unwrap();
        assert_eq!(report.feed_entries, 3);
        let feed = fs::read_to_string(blog.dest_dir.join("feed.xml")).unwrap();
        assert!(feed.contains("<link>/2019/07/01/actors/</link>"));
    }

    #[test]
    fn test_custom_home_survives_build() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());
        write(
            dir.path(),
            "home.md",
            "---\ntitle: Home\npermalink: /index.html\n---\nWelcome home.\n",
        );
        let blog = Blog::new(dir.path()).unwrap();

        let report = run(&blog, &BuildOptions::default()).unwrap();
        assert!(!report.index_generated);
        let index = fs::read_to_string(blog.dest_dir.join("index.html")).unwrap();
        assert!(index.contains("Welcome home."));
    }

    #[test]
    fn test_feed_asset_halts_build() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());
        write(dir.path(), "feed.xml", "<rss/>");
        let blog = Blog::new(dir.path()).unwrap();

        let err = run(&blog, &BuildOptions::default()).unwrap_err();
        assert!(err.to_string().contains("reserved for the feed"));
        assert!(!blog.dest_dir.exists());
    }

    #[test]
    fn test_collision_halts_build() {
        let dir = tempfile::tempdir().unwrap();
        sample_blog(dir.path());
        write(
            dir.path(),
            "me.md",
            "---\ntitle: Me\npermalink: /about/\n---\n",
        );
        let blog = Blog::new(dir.path()).unwrap();

        let err = run(&blog, &BuildOptions::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("about.md"));
        assert!(message.contains("me.md"));
        assert!(!blog.dest_dir.exists());
    }
}
