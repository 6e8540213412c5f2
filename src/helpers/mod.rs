//! Helper functions shared by the generator, feed and templates

mod url;

pub use url::*;
