use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Text(String),
    Element(HtmlElement),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag_name: String,
    pub attributes: FxHashMap<String, Option<String>>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(
        tag_name: &str,
        attributes: FxHashMap<String, Option<String>>,
        children: Vec<HtmlNode>,
    ) -> Self {
        HtmlElement {
            tag_name: tag_name.to_lowercase(),
            attributes,
            children,
        }
    }

    /// Returns the attribute value when present and non-empty.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|value| value.as_deref())
            .filter(|value| !value.is_empty())
    }
}
