use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;
use std::time::Duration;

use futures::Stream;
use futures::stream;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use crate::http_client::{FetchedPage, HttpClient};
use crate::links::extract_links;
use crate::normalize::{NormalizedUrl, normalize};
use crate::page::PageResult;
use crate::robots::RobotsCache;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Failed to parse 'title' selector"));

/// Breadth-first, same-site crawler.
///
/// The HTTP client and the robots.txt cache live as long as the crawler and are
/// reused by consecutive [`Crawler::crawl`] calls.
#[derive(Debug)]
pub struct Crawler {
    http_client: HttpClient,
    robots_cache: RobotsCache,
}

struct CrawlState<'a> {
    crawler: &'a mut Crawler,
    frontier: VecDeque<(NormalizedUrl, usize)>,
    visited: HashSet<NormalizedUrl>,
    max_depth: usize,
    delay: Duration,
    cancel: CancellationToken,
    start_error: Option<PageResult>,
    pause_before_next: bool,
}

impl Crawler {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let http_client = HttpClient::new(
            &config.user_agent,
            config.request_timeout,
            config.concurrency_limit,
        )?;
        Ok(Self::with_client(http_client, config.respect_robots))
    }

    pub fn with_client(http_client: HttpClient, respect_robots: bool) -> Self {
        Self {
            http_client,
            robots_cache: RobotsCache::new(respect_robots),
        }
    }

    /// Fetches a single page. Failures are reported inside the returned result.
    pub async fn fetch_page(&mut self, url: &NormalizedUrl) -> PageResult {
        if !self
            .robots_cache
            .can_fetch(&self.http_client, url, self.http_client.user_agent())
            .await
        {
            tracing::warn!("Skipping URL disallowed by robots.txt: {}", url);
            return PageResult::failure(url.as_str(), 403, FetchError::PolicyBlocked);
        }

        match self.http_client.get(url.to_url()).await {
            Ok(page) => page_result_from_response(url, page),
            Err(e) => {
                let status = match &e {
                    FetchError::HttpStatus { status, .. } => *status,
                    _ => 0,
                };
                tracing::warn!("Failed to fetch URL {}: {}", url, e);
                PageResult::failure(url.as_str(), status, e)
            }
        }
    }

    /// Crawls from `start_url` breadth-first, yielding one result per fetched page.
    ///
    /// Nothing is fetched until the stream is polled. Cancellation is observed between
    /// pages and during the politeness delay, never in the middle of a fetch.
    pub fn crawl<'a>(
        &'a mut self,
        start_url: &str,
        max_depth: usize,
        delay: Duration,
        cancel: CancellationToken,
    ) -> impl Stream<Item = PageResult> + use<'a> {
        let mut state = CrawlState {
            crawler: self,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
            delay,
            cancel,
            start_error: None,
            pause_before_next: false,
        };

        match normalize(start_url) {
            Ok(start) => {
                tracing::info!(
                    "Crawl started at {} (max depth {}, delay {:?})",
                    start,
                    max_depth,
                    delay
                );
                state.visited.insert(start.clone());
                state.frontier.push_back((start, 0));
            }
            Err(e) => {
                tracing::warn!("Cannot crawl {}: {}", start_url, e);
                state.start_error = Some(PageResult::failure(start_url, 0, e));
            }
        }

        stream::unfold(state, |mut state| async move {
            if let Some(result) = state.start_error.take() {
                return Some((result, state));
            }

            if state.pause_before_next {
                state.pause_before_next = false;
                tokio::select! {
                    _ = state.cancel.cancelled() => {}
                    _ = tokio::time::sleep(state.delay) => {}
                }
            }

            if state.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled with {} URLs left", state.frontier.len());
                return None;
            }

            let Some((url, depth)) = state.frontier.pop_front() else {
                tracing::info!("Crawl finished after visiting {} URLs", state.visited.len());
                return None;
            };

            tracing::info!("Processing URL: {} (depth {})", url, depth);
            let result = state.crawler.fetch_page(&url).await;

            if result.is_success() && depth < state.max_depth {
                for link in &result.links {
                    if state.visited.insert(link.clone()) {
                        state.frontier.push_back((link.clone(), depth + 1));
                    }
                }
            }

            state.pause_before_next = !state.delay.is_zero() && !state.frontier.is_empty();
            Some((result, state))
        })
    }
}

fn page_result_from_response(requested: &NormalizedUrl, page: FetchedPage) -> PageResult {
    let final_url = NormalizedUrl::from_url(&page.final_url).unwrap_or_else(|_| requested.clone());
    let document = Html::parse_document(&page.body);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let links = extract_links(&document, &page.final_url);

    if requested != &final_url {
        tracing::debug!("{} redirected to {}", requested, final_url);
    }

    PageResult::success(requested, &final_url, page.status, page.body, title, links)
}
