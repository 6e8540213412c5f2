//! Content module - handles documents, front-matter and Markdown rendering

mod document;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{BodyFormat, Document, Layout, Site};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
