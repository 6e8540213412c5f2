//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped in URL paths
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// Generate a site-relative URL under `baseurl`
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.baseurl.trim_matches('/');
    let path = path.trim_start_matches('/');

    match (base.is_empty(), path.is_empty()) {
        (true, _) => format!("/{}", path),
        (false, true) => format!("/{}/", base),
        (false, false) => format!("/{}/{}", base, path),
    }
}

/// Generate a full URL including the domain, percent-encoding the path
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let host = config.url.trim_end_matches('/');
    format!("{}{}", host, encode_path(&url_for(config, path)))
}

/// Encode a URL path
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config.baseurl = "/blog".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, "/"), "/blog/");
        assert_eq!(url_for(&SiteConfig::default(), "/about/"), "/about/");
        assert_eq!(url_for(&SiteConfig::default(), ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
        assert_eq!(
            full_url_for(&config, "/2019/08/21/akka streams/"),
            "https://example.com/blog/2019/08/21/akka%20streams/"
        );
    }
}
