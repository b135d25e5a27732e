use super::node::{HtmlElement, HtmlNode};
use ego_tree::NodeRef;
use rustc_hash::FxHashMap;
use scraper::Node;

fn map_scraper_node_to_html_node(node: NodeRef<'_, Node>) -> Option<HtmlNode> {
    match node.value() {
        Node::Text(text) => Some(HtmlNode::Text(text.to_string())),
        Node::Element(element) => {
            let attributes: FxHashMap<String, Option<String>> = element
                .attrs()
                .map(|(name, value)| (name.to_string(), Some(value.to_string())))
                .collect();
            let children = map_scraper_nodes_to_html_nodes(node.children());

            Some(HtmlNode::Element(HtmlElement::new(
                element.name(),
                attributes,
                children,
            )))
        }
        Node::Comment(comment) => Some(HtmlNode::Comment(comment.to_string())),
        Node::Document | Node::Fragment | Node::Doctype(_) | Node::ProcessingInstruction(_) => {
            None
        }
    }
}

pub fn map_scraper_nodes_to_html_nodes<'a>(
    nodes: impl Iterator<Item = NodeRef<'a, Node>>,
) -> Vec<HtmlNode> {
    nodes.filter_map(map_scraper_node_to_html_node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_maps_elements_text_and_comments() {
        let fragment = Html::parse_fragment(r#"<p class="x">Hi<!-- note --></p>"#);
        let nodes = map_scraper_nodes_to_html_nodes(fragment.root_element().children());

        assert_eq!(nodes.len(), 1);
        let HtmlNode::Element(p) = &nodes[0] else {
            panic!("expected element, got {:?}", nodes[0]);
        };
        assert_eq!(p.tag_name, "p");
        assert_eq!(p.attr("class"), Some("x"));
        assert_eq!(
            p.children,
            vec![
                HtmlNode::Text("Hi".to_string()),
                HtmlNode::Comment(" note ".to_string())
            ]
        );
    }
}
