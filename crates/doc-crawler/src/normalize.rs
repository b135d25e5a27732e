use std::fmt;
use std::hash::{Hash, Hasher};

use url::Url;

use crate::error::FetchError;

/// Canonical page identity: `scheme://host[:port]path` without query, fragment
/// or trailing slashes.
#[derive(Debug, Clone)]
pub struct NormalizedUrl {
    text: String,
    host: String,
    origin: String,
    url: Url,
}

impl NormalizedUrl {
    pub fn from_url(url: &Url) -> Result<Self, FetchError> {
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| FetchError::InvalidUrl(format!("{}: missing host", url)))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let origin = format!("{}://{}", url.scheme(), authority);
        let path = url.path().trim_end_matches('/');

        let mut request_url = url.clone();
        request_url.set_query(None);
        request_url.set_fragment(None);
        request_url.set_path(path);

        Ok(Self {
            text: format!("{}{}", origin, path),
            host: authority,
            origin,
            url: request_url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lowercased host, including the port when one was given explicitly.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `scheme://host[:port]`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn to_url(&self) -> Url {
        self.url.clone()
    }
}

impl PartialEq for NormalizedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for NormalizedUrl {}

impl Hash for NormalizedUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Parses and canonicalizes `raw`. Malformed input and host-less URLs are errors.
pub fn normalize(raw: &str) -> Result<NormalizedUrl, FetchError> {
    let url =
        Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    NormalizedUrl::from_url(&url)
}
