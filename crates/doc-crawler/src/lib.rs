//! Same-site crawler that collects documentation pages as Markdown.
//!
//! Starting from a seed URL, the crawler walks links breadth-first up to a fixed
//! depth, stays on the seed's host, honours robots.txt and paces its requests.
//! Every fetched page is reported as a [`PageResult`](page::PageResult) on a
//! stream, which [`ContentProcessor`](processor::ContentProcessor) turns into
//! Markdown through the `doc-markdown` pipeline.
//!
//! # Features
//!
//! - Lazy result stream with cooperative cancellation
//! - robots.txt compliance, cached per origin and failing open
//! - Bounded request concurrency and politeness delays
//! - Main-content extraction and noise filtering
//! - Crawl statistics as Markdown or JSON
//!
//! # Usage
//!
//! ```rust,no_run
//! use doc_crawler::config::CrawlerConfig;
//! use doc_crawler::crawler::Crawler;
//! use doc_crawler::processor::ContentProcessor;
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let config = CrawlerConfig::default();
//!     let mut crawler = Crawler::new(&config)?;
//!     let processor = ContentProcessor::default();
//!
//!     let results: Vec<_> = crawler
//!         .crawl("https://docs.example.com", 1, config.delay, CancellationToken::new())
//!         .collect()
//!         .await;
//!     println!("{}", processor.process_multiple(&results, true));
//!     Ok(())
//! }
//! ```
pub mod config;
pub mod crawler;
pub mod error;
pub mod http_client;
pub mod links;
pub mod normalize;
pub mod output;
pub mod page;
pub mod processor;
pub mod robots;
pub mod stats;

pub use error::{CrawlError, FetchError};
pub use page::PageResult;
