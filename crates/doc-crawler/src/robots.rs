use std::collections::HashMap;

use robots_txt::Robots;
use robots_txt::matcher::SimpleMatcher;
use url::Url;

use crate::http_client::HttpClient;
use crate::normalize::NormalizedUrl;

// Stores the robots.txt text and parses it on demand.
// No text means every path is allowed.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    robots_text: Option<String>,
}

impl RobotsTxt {
    pub fn unrestricted() -> Self {
        Self { robots_text: None }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            robots_text: Some(text.into()),
        }
    }

    /// Fetches `{origin}/robots.txt`. Any failure yields an unrestricted entry.
    pub async fn fetch(client: &HttpClient, origin: &str) -> Self {
        let robots_url = match Url::parse(origin).and_then(|base| base.join("/robots.txt")) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Invalid robots.txt URL for {}: {}", origin, e);
                return Self::unrestricted();
            }
        };

        tracing::info!("Fetching robots.txt from: {}", robots_url);

        match client.get(robots_url).await {
            Ok(page) if (200..300).contains(&page.status) => {
                tracing::debug!("robots.txt content for {}:\n{}", origin, page.body);
                Self::from_text(page.body)
            }
            Ok(page) => {
                tracing::warn!(
                    "Failed to fetch robots.txt for {}: HTTP {}",
                    origin,
                    page.status
                );
                Self::unrestricted()
            }
            Err(e) => {
                tracing::warn!("Error fetching robots.txt for {}: {}", origin, e);
                Self::unrestricted()
            }
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.robots_text.is_none()
    }

    /// Checks whether `path` may be crawled by `user_agent`.
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        let Some(text) = &self.robots_text else {
            return true;
        };

        let parsed_robots = Robots::from_str_lossy(text);
        let section = parsed_robots.choose_section(product_token(user_agent));
        let matcher = SimpleMatcher::new(&section.rules);

        matcher.check_path(path)
    }
}

/// `doc-crawler/0.2.0 (+https://…)` matches robots.txt groups as `doc-crawler`.
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|token| !token.is_empty())
        .unwrap_or(user_agent)
}

/// Per-origin robots.txt entries, fetched lazily and kept for the lifetime of the cache.
#[derive(Debug)]
pub struct RobotsCache {
    respect_robots: bool,
    entries: HashMap<String, RobotsTxt>,
}

impl RobotsCache {
    pub fn new(respect_robots: bool) -> Self {
        Self {
            respect_robots,
            entries: HashMap::new(),
        }
    }

    pub fn respects_robots(&self) -> bool {
        self.respect_robots
    }

    pub async fn can_fetch(
        &mut self,
        client: &HttpClient,
        url: &NormalizedUrl,
        user_agent: &str,
    ) -> bool {
        if !self.respect_robots {
            return true;
        }

        if !self.entries.contains_key(url.origin()) {
            let robots = RobotsTxt::fetch(client, url.origin()).await;
            self.entries.insert(url.origin().to_string(), robots);
        }

        // Rules see the normalized path, so `/private/` is checked as `/private`.
        self.entries
            .get(url.origin())
            .is_none_or(|robots| robots.is_allowed(url.path(), user_agent))
    }
}
