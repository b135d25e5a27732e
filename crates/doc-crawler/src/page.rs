use crate::error::FetchError;
use crate::normalize::NormalizedUrl;

/// Outcome of fetching one page.
///
/// A result either carries content and links or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Normalized final URL, after redirects.
    pub url: String,
    pub requested_url: String,
    /// 0 when the request never produced an HTTP response.
    pub status_code: u16,
    pub content: Option<String>,
    pub title: String,
    pub links: Vec<NormalizedUrl>,
    pub error: Option<FetchError>,
    pub was_redirected: bool,
}

impl PageResult {
    pub fn success(
        requested_url: &NormalizedUrl,
        final_url: &NormalizedUrl,
        status_code: u16,
        content: String,
        title: String,
        links: Vec<NormalizedUrl>,
    ) -> Self {
        Self {
            url: final_url.to_string(),
            requested_url: requested_url.to_string(),
            status_code,
            content: Some(content),
            title,
            links,
            error: None,
            was_redirected: requested_url != final_url,
        }
    }

    pub fn failure(requested_url: &str, status_code: u16, error: FetchError) -> Self {
        Self {
            url: requested_url.to_string(),
            requested_url: requested_url.to_string(),
            status_code,
            content: None,
            title: String::new(),
            links: Vec::new(),
            error: Some(error),
            was_redirected: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
