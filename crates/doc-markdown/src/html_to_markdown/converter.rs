use itertools::Itertools;

use super::error::HtmlToMarkdownError;
use super::node::{HtmlElement, HtmlNode};
use super::options::{HeadingStyle, MarkdownOptions};

type MarkdownInline = bool;
type MarkdownBlock = (String, MarkdownInline);
type Result<T> = std::result::Result<T, HtmlToMarkdownError>;

/// Elements whose content never reaches the output.
const SKIPPED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "script", "style", "noscript", "template", "svg", "iframe",
    "object", "embed", "canvas",
];

/// Elements that start a new block even when they are not converted.
const BLOCK_TAGS: &[&str] = &[
    "html", "body", "div", "main", "article", "section", "header", "footer", "nav", "aside",
    "hgroup", "figure", "figcaption", "details", "summary", "form", "fieldset", "address",
    "center", "table", "caption", "thead", "tbody", "tfoot", "tr", "td", "th", "dl", "dt", "dd",
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "blockquote", "hr",
];

fn collapse_whitespace(text: &str) -> String {
    let words = text.split_whitespace().join(" ");
    if words.is_empty() {
        return if text.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let leading = if text.starts_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let trailing = if text.ends_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    format!("{}{}{}", leading, words, trailing)
}

fn extract_text_from_pre_children(nodes: &[HtmlNode]) -> String {
    let mut text_content = String::new();
    for node in nodes {
        match node {
            HtmlNode::Text(text) => text_content.push_str(text),
            HtmlNode::Element(el) if el.tag_name == "br" => text_content.push('\n'),
            HtmlNode::Element(el) => {
                text_content.push_str(&extract_text_from_pre_children(&el.children));
            }
            HtmlNode::Comment(_) => {}
        }
    }
    text_content
}

fn process_url_for_markdown(url: &str) -> String {
    let processed_url = url.replace(' ', "%20");
    if processed_url.contains('(') || processed_url.contains(')') {
        format!("<{}>", processed_url)
    } else {
        processed_url
    }
}

fn title_part(element: &HtmlElement) -> String {
    element
        .attr("title")
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn handle_anchor_element(element: &HtmlElement, link_text: String) -> Option<String> {
    let link_text = link_text.replace('\n', " ").trim().to_string();
    let Some(href) = element.attr("href") else {
        return (!link_text.is_empty()).then_some(link_text);
    };
    if link_text.is_empty() {
        return None;
    }
    if link_text == href && element.attr("title").is_none() {
        return Some(format!("<{}>", href));
    }
    Some(format!(
        "[{}]({}{})",
        link_text,
        process_url_for_markdown(href),
        title_part(element)
    ))
}

fn handle_img_element(element: &HtmlElement, options: &MarkdownOptions) -> Option<String> {
    if !options.converts("img") {
        return None;
    }
    let src_url = element.attr("src")?;
    let alt_text = element.attr("alt").unwrap_or("");
    Some(format!(
        "![{}]({}{})",
        alt_text,
        process_url_for_markdown(src_url),
        title_part(element)
    ))
}

fn handle_code_span(text: &str) -> String {
    let text = text.trim();
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

fn convert_inline_element(
    element: &HtmlElement,
    options: &MarkdownOptions,
) -> Result<Option<String>> {
    let tag_name = element.tag_name.as_str();
    if SKIPPED_TAGS.contains(&tag_name) {
        return Ok(None);
    }

    match tag_name {
        "br" => Ok(Some(if options.converts("br") {
            "  \n".to_string()
        } else {
            " ".to_string()
        })),
        "img" => Ok(handle_img_element(element, options)),
        "code" | "pre" if options.converts(tag_name) => {
            let code_text = extract_text_from_pre_children(&element.children);
            if code_text.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(handle_code_span(&code_text)))
            }
        }
        _ => {
            let content = convert_children_to_string(&element.children, options)?;
            if !options.converts(tag_name) {
                return Ok(Some(content));
            }
            let wrapped = match tag_name {
                "a" => return Ok(handle_anchor_element(element, content)),
                "strong" | "b" => wrap_non_empty(&content, "**"),
                "em" | "i" => wrap_non_empty(&content, "*"),
                "s" | "strike" | "del" => wrap_non_empty(&content, "~~"),
                _ => content,
            };
            Ok(Some(wrapped))
        }
    }
}

fn wrap_non_empty(content: &str, marker: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        content.to_string()
    } else {
        format!("{}{}{}", marker, trimmed, marker)
    }
}

pub fn convert_children_to_string(
    nodes: &[HtmlNode],
    options: &MarkdownOptions,
) -> Result<String> {
    let mut parts = Vec::new();
    for node in nodes {
        match node {
            HtmlNode::Text(text) => parts.push(collapse_whitespace(text)),
            HtmlNode::Element(element) => {
                if let Some(inline_md) = convert_inline_element(element, options)? {
                    parts.push(inline_md);
                }
            }
            HtmlNode::Comment(_) => {}
        }
    }
    Ok(parts.join(""))
}

fn handle_heading_element(element: &HtmlElement, options: &MarkdownOptions) -> Result<String> {
    let text = convert_children_to_string(&element.children, options)?
        .replace('\n', " ")
        .trim()
        .to_string();
    if text.is_empty() {
        return Ok(String::new());
    }

    let level: usize =
        element.tag_name[1..]
            .parse()
            .map_err(|_| HtmlToMarkdownError::InvalidStructure {
                message: format!("Unexpected heading tag: <{}>", element.tag_name),
            })?;

    Ok(match (options.heading_style, level) {
        (HeadingStyle::Setext, 1) => {
            format!("{}\n{}", text, "=".repeat(text.chars().count().max(3)))
        }
        (HeadingStyle::Setext, 2) => {
            format!("{}\n{}", text, "-".repeat(text.chars().count().max(3)))
        }
        _ => format!("{} {}", "#".repeat(level), text),
    })
}

fn handle_blockquote_element(element: &HtmlElement, options: &MarkdownOptions) -> Result<String> {
    let inner_markdown = convert_nodes_to_markdown(&element.children, options)?;
    if inner_markdown.is_empty() {
        return Ok(String::new());
    }
    Ok(inner_markdown
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .join("\n"))
}

fn handle_pre_element(element: &HtmlElement) -> String {
    let mut lang_specifier = String::new();
    let mut content_nodes = &element.children;
    if let Some(HtmlNode::Element(code_element)) = element
        .children
        .iter()
        .find(|node| !matches!(node, HtmlNode::Text(text) if text.trim().is_empty()))
        && code_element.tag_name == "code"
    {
        content_nodes = &code_element.children;
        if let Some(class_attr) = code_element.attr("class") {
            lang_specifier = class_attr
                .split_whitespace()
                .find_map(|class_name| {
                    class_name
                        .strip_prefix("language-")
                        .or_else(|| class_name.strip_prefix("lang-"))
                })
                .unwrap_or_default()
                .to_string();
        }
    }

    let mut text_content = extract_text_from_pre_children(content_nodes);
    if text_content.starts_with('\n') {
        text_content.remove(0);
    }
    format!(
        "```{}\n{}\n```",
        lang_specifier,
        text_content.trim_end_matches('\n')
    )
}

fn convert_html_list_to_markdown(
    list_element: &HtmlElement,
    options: &MarkdownOptions,
) -> Result<String> {
    let mut markdown_items = Vec::new();
    let mut current_list_number = list_element
        .attr("start")
        .and_then(|start| start.parse::<usize>().ok())
        .unwrap_or(1);

    for node in &list_element.children {
        let HtmlNode::Element(child) = node else {
            continue;
        };

        match child.tag_name.as_str() {
            "li" => {
                let marker_prefix = match list_element.tag_name.as_str() {
                    "ul" => format!("{} ", options.bullet),
                    "ol" => {
                        let marker = format!("{}. ", current_list_number);
                        current_list_number += 1;
                        marker
                    }
                    other => {
                        return Err(HtmlToMarkdownError::InvalidStructure {
                            message: format!("Unexpected list tag name: {}", other),
                        });
                    }
                };
                let continuation_indent = " ".repeat(marker_prefix.len());
                let li_content_markdown = convert_nodes_to_markdown(&child.children, options)?;

                for (index, line) in li_content_markdown
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .enumerate()
                {
                    let prefix = if index == 0 {
                        marker_prefix.as_str()
                    } else {
                        continuation_indent.as_str()
                    };
                    markdown_items.push(format!("{}{}", prefix, line));
                }
            }
            "ul" | "ol" => {
                // A list nested directly in a list belongs to the previous item.
                let nested = convert_html_list_to_markdown(child, options)?;
                markdown_items.extend(nested.lines().map(|line| format!("  {}", line)));
            }
            _ => {}
        }
    }

    Ok(markdown_items.join("\n"))
}

fn join_blocks(blocks: Vec<MarkdownBlock>) -> String {
    let mut result = String::new();
    let mut previous_inline = false;

    for (block_content, is_inline) in blocks {
        let starts_paragraph = result.is_empty() || !(is_inline && previous_inline);
        if starts_paragraph && !result.is_empty() {
            result.truncate(result.trim_end().len());
            result.push_str("\n\n");
        }

        let content = if starts_paragraph {
            block_content.trim_start()
        } else {
            block_content.as_str()
        };
        let content = if is_inline { content } else { content.trim_end() };
        result.push_str(content);
        previous_inline = is_inline;
    }

    result.trim_end().to_string()
}

pub fn convert_nodes_to_markdown(nodes: &[HtmlNode], options: &MarkdownOptions) -> Result<String> {
    let mut markdown_blocks: Vec<MarkdownBlock> = Vec::new();

    for node in nodes {
        match node {
            HtmlNode::Text(text) => {
                if !text.trim().is_empty() {
                    markdown_blocks.push((collapse_whitespace(text), true));
                } else if matches!(markdown_blocks.last(), Some((_, true))) {
                    markdown_blocks.push((" ".to_string(), true));
                }
            }
            HtmlNode::Element(element) => {
                let tag_name = element.tag_name.as_str();
                if SKIPPED_TAGS.contains(&tag_name) {
                    continue;
                }

                let block = match tag_name {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if options.converts(tag_name) => {
                        handle_heading_element(element, options)?
                    }
                    "ul" | "ol" if options.converts(tag_name) => {
                        convert_html_list_to_markdown(element, options)?
                    }
                    "pre" if options.converts(tag_name) => handle_pre_element(element),
                    "blockquote" if options.converts(tag_name) => {
                        handle_blockquote_element(element, options)?
                    }
                    "hr" if options.converts(tag_name) => "---".to_string(),
                    "p" => convert_children_to_string(&element.children, options)?,
                    _ if BLOCK_TAGS.contains(&tag_name) => {
                        convert_nodes_to_markdown(&element.children, options)?
                    }
                    _ => {
                        if let Some(inline_md) = convert_inline_element(element, options)?
                            && !inline_md.is_empty()
                        {
                            markdown_blocks.push((inline_md, true));
                        }
                        continue;
                    }
                };

                if !block.trim().is_empty() {
                    markdown_blocks.push((block, false));
                }
            }
            HtmlNode::Comment(_) => {}
        }
    }

    Ok(join_blocks(markdown_blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rustc_hash::FxHashMap;

    fn text_node(text: &str) -> HtmlNode {
        HtmlNode::Text(text.to_string())
    }

    fn element_node(tag: &str, children: Vec<HtmlNode>) -> HtmlNode {
        HtmlNode::Element(HtmlElement {
            tag_name: tag.to_string(),
            attributes: FxHashMap::default(),
            children,
        })
    }

    fn element_with_attrs(tag: &str, attrs: &[(&str, &str)], children: Vec<HtmlNode>) -> HtmlNode {
        HtmlNode::Element(HtmlElement {
            tag_name: tag.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
            children,
        })
    }

    #[rstest]
    #[case(
        vec![element_node("p", vec![text_node("Hello, world!")])],
        "Hello, world!"
    )]
    #[case(
        vec![element_node("h2", vec![text_node("Title")])],
        "## Title"
    )]
    #[case(
        vec![element_node(
            "p",
            vec![
                element_node("strong", vec![text_node("Bold")]),
                text_node(" and "),
                element_node("em", vec![text_node("Italic")]),
            ],
        )],
        "Bold and Italic"
    )]
    #[case(
        vec![element_with_attrs("a", &[("href", "https://example.com")], vec![text_node("link")])],
        "[link](https://example.com)"
    )]
    #[case(
        vec![element_node(
            "ul",
            vec![
                element_node("li", vec![text_node("Item 1")]),
                element_node("li", vec![text_node("Item 2")]),
            ],
        )],
        "- Item 1\n- Item 2"
    )]
    #[case(
        vec![element_with_attrs(
            "ol",
            &[("start", "3")],
            vec![
                element_node("li", vec![text_node("Third")]),
                element_node("li", vec![text_node("Fourth")]),
            ],
        )],
        "3. Third\n4. Fourth"
    )]
    #[case(
        vec![element_node(
            "pre",
            vec![element_with_attrs("code", &[("class", "language-rust")], vec![text_node("let x = 1;\nlet y = 2;")])],
        )],
        "```rust\nlet x = 1;\nlet y = 2;\n```"
    )]
    #[case(
        vec![element_with_attrs("img", &[("src", "img.png"), ("alt", "alt text")], vec![])],
        "![alt text](img.png)"
    )]
    #[case(
        vec![element_node("div", vec![
            element_node("h1", vec![text_node("Top")]),
            text_node("\n    "),
            element_node("p", vec![text_node("First\n   paragraph")]),
            element_node("p", vec![text_node("Second")]),
        ])],
        "# Top\n\nFirst paragraph\n\nSecond"
    )]
    #[case(
        vec![element_node("ul", vec![
            element_node("li", vec![
                text_node("Parent"),
                element_node("ul", vec![element_node("li", vec![text_node("Child")])]),
            ]),
        ])],
        "- Parent\n  - Child"
    )]
    #[case(
        vec![element_node("p", vec![
            text_node("Use "),
            element_node("code", vec![text_node("cargo run")]),
            text_node(" to start."),
        ])],
        "Use `cargo run` to start."
    )]
    #[case(
        vec![
            element_node("script", vec![text_node("alert(1)")]),
            element_node("p", vec![text_node("Visible")]),
        ],
        "Visible"
    )]
    fn test_convert_nodes_to_markdown_param(#[case] nodes: Vec<HtmlNode>, #[case] expected: &str) {
        let md = convert_nodes_to_markdown(&nodes, &MarkdownOptions::default()).unwrap();
        assert_eq!(md, expected);
    }

    #[test]
    fn test_links_dropped_to_text_when_not_preserved() {
        let options = MarkdownOptions {
            preserve_links: false,
            ..Default::default()
        };
        let nodes = vec![element_node(
            "p",
            vec![
                text_node("See "),
                element_with_attrs("a", &[("href", "/docs")], vec![text_node("the docs")]),
            ],
        )];
        assert_eq!(
            convert_nodes_to_markdown(&nodes, &options).unwrap(),
            "See the docs"
        );
    }

    #[test]
    fn test_images_dropped_when_not_preserved() {
        let options = MarkdownOptions {
            preserve_images: false,
            ..Default::default()
        };
        let nodes = vec![
            element_with_attrs("img", &[("src", "a.png")], vec![]),
            element_node("p", vec![text_node("Caption")]),
        ];
        assert_eq!(convert_nodes_to_markdown(&nodes, &options).unwrap(), "Caption");
    }

    #[test]
    fn test_setext_headings() {
        let options = MarkdownOptions {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let nodes = vec![
            element_node("h1", vec![text_node("Title")]),
            element_node("h3", vec![text_node("Deep")]),
        ];
        assert_eq!(
            convert_nodes_to_markdown(&nodes, &options).unwrap(),
            "Title\n=====\n\n### Deep"
        );
    }

    #[test]
    fn test_extended_whitelist_converts_emphasis() {
        let options = MarkdownOptions::default().with_tags(["strong", "blockquote"]);
        let nodes = vec![element_node(
            "blockquote",
            vec![element_node(
                "p",
                vec![element_node("strong", vec![text_node("Quoted")])],
            )],
        )];
        assert_eq!(
            convert_nodes_to_markdown(&nodes, &options).unwrap(),
            "> **Quoted**"
        );
    }

    #[test]
    fn test_custom_bullet() {
        let options = MarkdownOptions {
            bullet: '*',
            ..Default::default()
        };
        let nodes = vec![element_node(
            "ul",
            vec![element_node("li", vec![text_node("One")])],
        )];
        assert_eq!(convert_nodes_to_markdown(&nodes, &options).unwrap(), "* One");
    }
}
