//! Converts HTML content to Markdown.
//!
//! Only tags listed in [`MarkdownOptions::converted_tags`] become Markdown syntax.
//! Every other element is flattened to the plain text of its children, and
//! non-content elements such as `<script>` and `<style>` are dropped.

pub mod converter;
pub mod error;
pub mod node;
pub mod options;
pub mod parser;

use scraper::Html;

pub use error::HtmlToMarkdownError;
pub use options::{HeadingStyle, MarkdownOptions};

/// Converts an HTML document or fragment to Markdown.
///
/// Returns an empty string for blank input.
pub fn convert_html_to_markdown(
    html_input: &str,
    options: &MarkdownOptions,
) -> Result<String, HtmlToMarkdownError> {
    if html_input.trim().is_empty() {
        return Ok(String::new());
    }

    let fragment = Html::parse_fragment(html_input);
    let nodes = parser::map_scraper_nodes_to_html_nodes(fragment.root_element().children());

    converter::convert_nodes_to_markdown(&nodes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("   \n\t", "")]
    #[case("<h1>Title</h1><p>Body text</p>", "# Title\n\nBody text")]
    #[case(
        "<html><head><title>T</title><style>p{}</style></head><body><p>Only body</p></body></html>",
        "Only body"
    )]
    #[case(
        "<div><span>Inline</span> <b>bold</b></div>",
        "Inline bold"
    )]
    #[case(
        "<p>Line one<br>line two</p>",
        "Line one line two"
    )]
    fn test_convert_html_to_markdown(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(
            convert_html_to_markdown(html, &MarkdownOptions::default()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_code_block_keeps_inner_whitespace() {
        let html = "<pre><code class=\"language-python\">def f():\n    return 1\n</code></pre>";
        assert_eq!(
            convert_html_to_markdown(html, &MarkdownOptions::default()).unwrap(),
            "```python\ndef f():\n    return 1\n```"
        );
    }
}
