use ego_tree::NodeId;
use scraper::{Html, Selector};

use crate::html_to_markdown::HtmlToMarkdownError;

/// Elements removed before the main content region is chosen.
pub const DEFAULT_JUNK_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "aside",
    "header",
    "menu",
    r#"[role="navigation"]"#,
    r#"[role="banner"]"#,
    r#"[role="contentinfo"]"#,
    r#"[id*="cookie"]"#,
    r#"[class*="cookie"]"#,
    r#"[id*="consent"]"#,
    r#"[class*="consent"]"#,
    r#"[id*="sidebar"]"#,
    r#"[class*="sidebar"]"#,
    r#"[id*="popup"]"#,
    r#"[class*="popup"]"#,
    r#"[class*="social"]"#,
    r#"[class*="related"]"#,
    r#"[class*="advert"]"#,
];

/// Candidate main-content regions, tried in order.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    ".main-content",
    ".content",
    "#main",
    "#content",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub junk_selectors: Vec<String>,
    pub content_selectors: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            junk_selectors: DEFAULT_JUNK_SELECTORS.iter().map(|s| s.to_string()).collect(),
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Picks the main content region of a page after stripping boilerplate.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    junk: Vec<Selector>,
    content: Vec<Selector>,
    body: Selector,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(&ExtractOptions::default()).expect("Built-in selectors are valid")
    }
}

fn parse_selectors(selectors: &[String]) -> Result<Vec<Selector>, HtmlToMarkdownError> {
    selectors
        .iter()
        .map(|selector| {
            Selector::parse(selector).map_err(|e| HtmlToMarkdownError::InvalidSelector {
                selector: selector.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

impl ContentExtractor {
    pub fn new(options: &ExtractOptions) -> Result<Self, HtmlToMarkdownError> {
        Ok(Self {
            junk: parse_selectors(&options.junk_selectors)?,
            content: parse_selectors(&options.content_selectors)?,
            body: Selector::parse("body").expect("Invalid body selector"),
        })
    }

    /// Returns the HTML of the main content region with junk elements and comments removed.
    pub fn extract(&self, html: &str) -> String {
        let mut document = Html::parse_document(html);

        let mut doomed: Vec<NodeId> = self
            .junk
            .iter()
            .flat_map(|selector| document.select(selector).map(|el| el.id()))
            .collect();
        doomed.extend(
            document
                .tree
                .nodes()
                .filter(|node| node.value().is_comment())
                .map(|node| node.id()),
        );

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        // `Html::select` also visits detached nodes, so search from the root element.
        let root = document.root_element();
        if let Some(main) = self
            .content
            .iter()
            .find_map(|selector| root.select(selector).next())
        {
            return main.html();
        }

        root.select(&self.body)
            .next()
            .map(|body| body.html())
            .unwrap_or_else(|| root.html())
    }
}

/// Extracts the main content of `html` using the built-in selector lists.
pub fn extract_main_content(html: &str) -> String {
    ContentExtractor::default().extract(html)
}
