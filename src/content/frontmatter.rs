//! Front-matter parsing
//!
//! A document may start with a block of `key: value` lines fenced by `---`
//! delimiter lines. Everything after the closing delimiter line is the body.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;

/// Line that opens and closes a front-matter block
const DELIMITER: &str = "---";

/// Front-matter data from a post or page.
///
/// Values are kept as strings; typed accessors interpret the handful of keys
/// the generator understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    ///
    /// Never fails: a missing or unterminated block yields empty front-matter
    /// and the whole input as body.
    pub fn parse(content: &str) -> (Self, &str) {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(rest) = strip_opening_delimiter(text) else {
            return (FrontMatter::default(), content);
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == DELIMITER {
                let block = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return match Self::decode(block) {
                    Some(fm) => (fm, body),
                    None => (FrontMatter::default(), content),
                };
            }
            offset += line.len();
        }

        tracing::warn!("Unterminated front-matter block, treating document as body");
        (FrontMatter::default(), content)
    }

    /// Whether the text opens with a front-matter delimiter line
    pub fn detect(content: &str) -> bool {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);
        strip_opening_delimiter(text).is_some()
    }

    /// Decode the lines between the delimiters.
    /// Returns None when the block does not look like metadata at all.
    fn decode(block: &str) -> Option<Self> {
        if block.trim().is_empty() {
            return Some(FrontMatter::default());
        }

        // A fenced block of prose (e.g. a horizontal rule followed by text) is
        // not front-matter
        if !block.lines().any(looks_like_key_value) {
            return None;
        }

        let fields = match serde_yaml::from_str::<BTreeMap<String, serde_yaml::Value>>(block) {
            Ok(map) => {
                let written = decode_lines(block);
                map.into_iter()
                    .filter_map(|(key, value)| {
                        let value = match value {
                            // Scalars keep their source text: `0x10` stays `0x10`
                            serde_yaml::Value::Number(_) | serde_yaml::Value::Bool(_) => written
                                .get(&key)
                                .map(|raw| strip_comment(raw).to_string())
                                .or_else(|| flatten_value(value)),
                            value => flatten_value(value),
                        };
                        match value {
                            Some(value) => Some((key, value)),
                            None => {
                                tracing::warn!(
                                    "Ignoring nested front-matter value for key '{}'",
                                    key
                                );
                                None
                            }
                        }
                    })
                    .collect()
            }
            Err(e) => {
                tracing::debug!("Front-matter is not strict YAML ({}), reading it line by line", e);
                decode_lines(block)
            }
        };

        Some(Self { fields })
    }

    /// Raw string value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Keys declared in the block, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn layout(&self) -> Option<&str> {
        self.non_empty("layout")
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty("title")
    }

    pub fn permalink(&self) -> Option<&str> {
        self.non_empty("permalink")
    }

    pub fn description(&self) -> Option<&str> {
        self.non_empty("description")
    }

    /// Comments are off unless enabled explicitly
    pub fn comments(&self) -> bool {
        self.flag("comments").unwrap_or(false)
    }

    /// Documents are published unless `published: false`
    pub fn published(&self) -> bool {
        self.flag("published").unwrap_or(true)
    }

    /// Comma separated (or YAML list) keywords
    pub fn keywords(&self) -> Vec<String> {
        self.get("keywords")
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse the `date` key into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<FixedOffset>> {
        self.non_empty("date").and_then(parse_date_string)
    }

    /// Keys other than the ones with dedicated accessors
    pub fn extra(&self) -> BTreeMap<String, String> {
        const KNOWN: [&str; 8] = [
            "layout",
            "title",
            "permalink",
            "description",
            "date",
            "comments",
            "keywords",
            "published",
        ];
        self.fields
            .iter()
            .filter(|(k, _)| !KNOWN.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

/// Returns the text after the opening delimiter line
fn strip_opening_delimiter(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    (first.trim_end() == DELIMITER).then_some(rest)
}

/// Whether a line has the `key: value` (or bare `key:`) shape
fn looks_like_key_value(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    let Some(colon_pos) = trimmed.find(':') else {
        return false;
    };
    let key = &trimmed[..colon_pos];
    let is_valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "http" | "https" | "ftp");
    let after_colon = &trimmed[colon_pos + 1..];
    is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
}

/// Collapse a YAML value to a string; nested mappings are rejected
fn flatten_value(value: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        Value::Sequence(items) => Some(
            items
                .into_iter()
                .filter_map(flatten_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Mapping(_) => None,
        Value::Tagged(tagged) => flatten_value(tagged.value),
    }
}

/// Line-oriented fallback: split each line at its first colon
fn decode_lines(block: &str) -> BTreeMap<String, String> {
    block
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

/// Drop a trailing ` # comment`
fn strip_comment(value: &str) -> &str {
    value.split_once(" #").map_or(value, |(v, _)| v).trim_end()
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse a date string in various formats.
/// Times without an offset are taken as UTC.
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let zoned_formats = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M %z", "%Y-%m-%dT%H:%M:%S%z"];
    for fmt in zoned_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let utc = FixedOffset::east_opt(0)?;

    let naive_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(utc.from_utc_datetime(&dt));
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = "---\nlayout: post\ntitle: Akka Streams in Practice\ndescription: Backpressure without tears\ncomments: true\nkeywords: scala, akka, streams\n---\n\nThis is the content.\n";

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(
            fm.keys().collect::<Vec<_>>(),
            vec!["comments", "description", "keywords", "layout", "title"]
        );
        assert_eq!(fm.layout(), Some("post"));
        assert_eq!(fm.title(), Some("Akka Streams in Practice"));
        assert_eq!(fm.description(), Some("Backpressure without tears"));
        assert!(fm.comments());
        assert_eq!(fm.keywords(), vec!["scala", "akka", "streams"]);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_body_is_byte_identical() {
        let body = "# Heading\r\n\r\n  indented line\n\n---\nnot metadata: here\n";
        let content = format!("---\r\ntitle: CRLF\r\n---\r\n{}", body);

        let (fm, parsed) = FrontMatter::parse(&content);
        assert_eq!(fm.title(), Some("CRLF"));
        assert_eq!(fm.len(), 1);
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Just some text.\n---\ntitle: nope\n---\n";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
        assert!(!FrontMatter::detect(content));
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let content = "---\ntitle: Never closed\n\nBody text.\n";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let content = "---\n---\nBody\n";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_colon_in_value_falls_back_to_lines() {
        let content = "---\ntitle: HBase: a gentle introduction\npermalink: '/hbase/'\n---\nBody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title(), Some("HBase: a gentle introduction"));
        assert_eq!(fm.permalink(), Some("/hbase/"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_yaml_list_keywords() {
        let content = "---\ntitle: List\nkeywords:\n  - scala\n  - hbase\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.keywords(), vec!["scala", "hbase"]);
    }

    #[test]
    fn test_values_stay_strings() {
        let content = "---\ntitle: 2019\npublished: false\nauthor: someone\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.title(), Some("2019"));
        assert!(!fm.published());
        assert_eq!(fm.extra().get("author").map(String::as_str), Some("someone"));
        assert!(!fm.extra().contains_key("title"));
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        // A document opening with a horizontal rule and prose
        let content = r#"---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\nCheck out https://example.com/path\n---\nMore content.\n";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert!(body.contains("https://example.com"));
    }

    #[test]
    fn test_numeric_scalars_keep_source_text() {
        let content =
            "---\ntitle: 0x10\nviews: 1e3\nversion: 2.10 # minor\npublished: False\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.title(), Some("0x10"));
        assert_eq!(fm.get("views"), Some("1e3"));
        assert_eq!(fm.get("version"), Some("2.10"));
        assert_eq!(fm.get("published"), Some("False"));
        assert!(!fm.published());
    }

    #[test]
    fn test_bom_is_skipped() {
        let content = "\u{feff}---\ntitle: BOM\n---\nBody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title(), Some("BOM"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_date() {
        let content = "---\ndate: 2019-08-21 10:30:00\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2019-08-21 10:30");

        let dt = parse_date_string("2019-07-01 09:00:00 +0200").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);

        assert!(parse_date_string("2018-01-01").is_some());
        assert!(parse_date_string("yesterday").is_none());
    }
}
