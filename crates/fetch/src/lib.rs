//! Fetching remote content and turning it into documents.
//!
//! - [`LinkFetcher`]: best-effort HTTP GET of a batch of URLs
//! - [`HtmlConverter`] / [`TextFileConverter`]: raw content → [`Document`]s
//! - [`HackerNewsFetcher`]: top stories as documents, via [`ArticleSource`]
//!
//! [`Document`]: pipewright_core::Document

pub mod convert;
pub mod hacker_news;
pub mod link;

pub use convert::{HtmlConverter, TextFileConverter, html_to_text};
pub use hacker_news::{ArticleSource, HackerNewsFetcher};
pub use link::{ByteStream, LinkFetcher};
