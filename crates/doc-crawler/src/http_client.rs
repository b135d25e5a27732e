use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::redirect::Policy;
use tokio::sync::Semaphore;
use url::Url;

use crate::error::{CrawlError, FetchError};

/// Response of a successful GET, after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,
    pub status: u16,
    pub body: String,
}

/// HTTP client shared by page and robots.txt fetches.
///
/// Clones share the connection pool and the concurrency gate.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    permits: Arc<Semaphore>,
    user_agent: String,
}

impl HttpClient {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        concurrency_limit: usize,
    ) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| CrawlError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            user_agent: user_agent.to_string(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// GETs `url`, following redirects. A final status outside 2xx/3xx is an error.
    pub async fn get(&self, url: Url) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {}", e)))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
