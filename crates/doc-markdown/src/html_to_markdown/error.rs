use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HtmlToMarkdownError {
    #[error("Invalid CSS selector `{selector}`: {message}")]
    #[diagnostic(
        code(doc_markdown::html::invalid_selector),
        help("Check the junk and main-content selector lists passed to the extractor.")
    )]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid HTML structure: {message}")]
    #[diagnostic(
        code(doc_markdown::html::invalid_structure),
        help("The HTML structure is invalid or unexpected.")
    )]
    InvalidStructure { message: String },
}
