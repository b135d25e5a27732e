//! # doc-markdown: HTML page to clean Markdown
//!
//! This crate turns crawled HTML pages into Markdown suitable for documentation
//! dumps. It is used by `doc-crawler`, but has no networking of its own.
//!
//! The pipeline has three stages:
//!
//! - **Extraction** ([`extract`]): strips boilerplate such as navigation, footers and
//!   cookie banners, then selects the main content region.
//! - **Conversion** ([`html_to_markdown`]): converts a whitelist of tags to Markdown
//!   and flattens everything else to plain text.
//! - **Cleaning** ([`clean`]): removes encoded blobs, very short lines and
//!   repeated-character lines outside fenced code.
//!
//! ## Quick Start
//!
//! ```rust
//! use doc_markdown::{MarkdownOptions, MarkdownPipeline};
//!
//! let pipeline = MarkdownPipeline::default();
//! let html = "<html><body><nav>Home</nav><main><h1>Guide</h1><p>Read this first.</p></main></body></html>";
//! assert_eq!(pipeline.page_to_markdown(html), "# Guide\n\nRead this first.");
//! ```
pub mod clean;
pub mod extract;
pub mod html_to_markdown;

pub use clean::clean_markdown;
pub use extract::{ContentExtractor, ExtractOptions, extract_main_content};
pub use html_to_markdown::{
    HeadingStyle, HtmlToMarkdownError, MarkdownOptions, convert_html_to_markdown,
};

/// Converts an HTML fragment to cleaned Markdown.
///
/// Never fails: a conversion error is rendered as a placeholder line.
pub fn to_markdown(html: &str, options: &MarkdownOptions) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    match convert_html_to_markdown(html, options) {
        Ok(markdown) => clean_markdown(&markdown),
        Err(e) => {
            tracing::warn!(error = %e, "HTML conversion failed");
            format!("Error processing HTML content: {}", e)
        }
    }
}

/// Extraction, conversion and cleaning with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct MarkdownPipeline {
    extractor: ContentExtractor,
    options: MarkdownOptions,
}

impl MarkdownPipeline {
    pub fn new(extractor: ContentExtractor, options: MarkdownOptions) -> Self {
        Self { extractor, options }
    }

    /// Converts a full HTML page into Markdown of its main content.
    pub fn page_to_markdown(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }
        to_markdown(&self.extractor.extract(html), &self.options)
    }
}
