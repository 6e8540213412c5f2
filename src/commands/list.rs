//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::router::Routes;
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    for line in lines(blog, content_type)? {
        println!("{}", line);
    }
    Ok(())
}

/// The listing as text lines
pub fn lines(blog: &Blog, content_type: &str) -> Result<Vec<String>> {
    let site = ContentLoader::new(blog).load_site()?;
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let mut posts: Vec<_> = site.posts().collect();
            posts.sort_by(|a, b| b.date.cmp(&a.date));
            out.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = post
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                out.push(format!(
                    "  {} - {} [{}]",
                    date,
                    post.display_title(),
                    post.source.display()
                ));
            }
        }
        "page" | "pages" => {
            let pages: Vec<_> = site.pages().collect();
            out.push(format!("Pages ({}):", pages.len()));
            for page in pages {
                out.push(format!("  {} [{}]", page.display_title(), page.source.display()));
            }
        }
        "route" | "routes" => {
            let routes = Routes::build(&site, &blog.config)?;
            out.push(format!("Routes ({}):", routes.len()));
            for route in routes.iter() {
                out.push(format!(
                    "  {} -> {} [{}]",
                    route.permalink,
                    route.output.display(),
                    route.document.source.display()
                ));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, route",
                content_type
            );
        }
    }

    Ok(out)
}
