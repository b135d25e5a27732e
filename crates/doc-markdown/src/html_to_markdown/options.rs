use std::collections::BTreeSet;

/// How headings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// `# Heading`
    #[default]
    Atx,
    /// Underlined with `=` (h1) or `-` (h2). Deeper levels fall back to ATX.
    Setext,
}

/// Tags converted to Markdown syntax by default. Anything else is rendered as plain text.
pub const DEFAULT_CONVERTED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "a", "img", "pre", "code",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub heading_style: HeadingStyle,
    pub bullet: char,
    pub converted_tags: BTreeSet<String>,
    pub preserve_links: bool,
    pub preserve_images: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        MarkdownOptions {
            heading_style: HeadingStyle::Atx,
            bullet: '-',
            converted_tags: DEFAULT_CONVERTED_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            preserve_links: true,
            preserve_images: true,
        }
    }
}

impl MarkdownOptions {
    pub fn converts(&self, tag_name: &str) -> bool {
        match tag_name {
            "a" => self.preserve_links && self.converted_tags.contains(tag_name),
            "img" => self.preserve_images && self.converted_tags.contains(tag_name),
            _ => self.converted_tags.contains(tag_name),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.converted_tags
            .extend(tags.into_iter().map(|tag| tag.into().to_lowercase()));
        self
    }
}
