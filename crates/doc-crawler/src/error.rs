use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Per-page failure. Carried inside a [`PageResult`](crate::page::PageResult) and never
/// stops the crawl.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("blocked by robots policy")]
    PolicyBlocked,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug, Diagnostic)]
pub enum CrawlError {
    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(
        code(doc_crawler::client_build),
        help("Check the user agent and timeout settings.")
    )]
    ClientBuild(String),

    #[error("Failed to write {}", path.display())]
    #[diagnostic(
        code(doc_crawler::output),
        help("Make sure the output directory exists and is writable.")
    )]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Crawl worker failed: {0}")]
    #[diagnostic(code(doc_crawler::worker))]
    Worker(String),
}
