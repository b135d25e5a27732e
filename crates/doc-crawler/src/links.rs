use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::normalize::NormalizedUrl;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to parse 'a[href]' selector"));

fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Collects same-host http(s) links from `document`, resolved against `base_url`.
///
/// Document order is kept and duplicates are not removed.
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<NormalizedUrl> {
    let Some(base_host) = host_with_port(base_url) else {
        return Vec::new();
    };

    let links: Vec<NormalizedUrl> = document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base_url.join(href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(href, base = %base_url, error = %e, "Skipping unparsable link");
                None
            }
        })
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| {
            host_with_port(url).is_some_and(|host| host.eq_ignore_ascii_case(&base_host))
        })
        .filter_map(|url| NormalizedUrl::from_url(&url).ok())
        .collect();

    tracing::debug!("Extracted {} links from {}", links.len(), base_url);
    links
}
