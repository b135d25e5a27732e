use doc_markdown::MarkdownPipeline;

use crate::page::PageResult;

pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Renders crawl results as Markdown.
#[derive(Debug, Clone, Default)]
pub struct ContentProcessor {
    pipeline: MarkdownPipeline,
}

impl ContentProcessor {
    pub fn new(pipeline: MarkdownPipeline) -> Self {
        Self { pipeline }
    }

    /// Markdown for one result. Empty when the page has nothing worth keeping.
    pub fn process_result(&self, result: &PageResult, include_metadata: bool) -> String {
        if let Some(error) = &result.error {
            return format!(
                "**Error processing page**\n\n**URL:** `{}`\n**Error:** {}\n",
                result.url, error
            );
        }

        let Some(content) = result.content.as_deref().filter(|c| !c.trim().is_empty()) else {
            return String::new();
        };

        let markdown = self.pipeline.page_to_markdown(content);
        if markdown.trim().is_empty() {
            tracing::debug!("No content left after cleaning {}", result.url);
            return String::new();
        }

        if include_metadata && !result.title.is_empty() {
            format!(
                "# {}\n**Source:** `{}`\n\n---\n\n{}",
                result.title, result.url, markdown
            )
        } else {
            markdown
        }
    }

    pub fn process_multiple(&self, results: &[PageResult], include_metadata: bool) -> String {
        join_pages(
            results
                .iter()
                .map(|result| self.process_result(result, include_metadata)),
        )
    }
}

/// Joins rendered pages with [`PAGE_SEPARATOR`], skipping empty ones.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    pages
        .into_iter()
        .filter(|page| !page.as_ref().is_empty())
        .fold(String::new(), |mut combined, page| {
            if !combined.is_empty() {
                combined.push_str(PAGE_SEPARATOR);
            }
            combined.push_str(page.as_ref());
            combined
        })
}
