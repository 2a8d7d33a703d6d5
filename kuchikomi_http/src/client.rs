//! HTTP client for fetching review listing and detail pages.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::{user_agent::UserAgent, Error};

/// Settings for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User-agent policy applied to every request.
    pub user_agent: UserAgent,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: UserAgent::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for HTML pages.
///
/// Sends browser-like `accept` headers and a user agent chosen by the
/// configured [`UserAgent`] policy. The underlying `reqwest::Client` is built
/// once and reused for every page of a run.
pub struct Client {
    http: reqwest::Client,
    user_agent: UserAgent,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(Error::Build)?;
        Ok(Self {
            http,
            user_agent: config.user_agent,
        })
    }

    pub fn user_agent(&self) -> &UserAgent {
        &self.user_agent
    }

    /// Fetches `url` and returns the body decoded with the response charset.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, Error> {
        let mut request = self
            .http
            .get(url.clone())
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache");
        if let Some(ua) = self.user_agent.header_value() {
            request = request.header(USER_AGENT, ua);
        }

        tracing::debug!("GET {}", url);
        let resp = request.send().await.map_err(|e| {
            tracing::error!("Failed to get {}: {}", url, e);
            Error::Transport {
                url: url.to_string(),
                source: e,
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", url, e);
            Error::Transport {
                url: url.to_string(),
                source: e,
            }
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request to {} failed with status {}", url, status);
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }
}

/// Parses an absolute URL.
pub fn parse_url(raw: &str) -> Result<Url, Error> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Resolves `href` (absolute or relative) against the page it was found on.
pub fn resolve_link(page: &Url, href: &str) -> Result<Url, Error> {
    page.join(href.trim()).map_err(|e| Error::InvalidUrl {
        url: href.to_string(),
        reason: e.to_string(),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "口".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() <= 500 + "...[truncated]".len());
    }

    #[test]
    fn short_body_untouched() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn resolve_relative_and_absolute_links() {
        let page = parse_url("https://www.cosme.net/products/1/review/?page=2").unwrap();
        assert_eq!(
            resolve_link(&page, "/reviews/123").unwrap().as_str(),
            "https://www.cosme.net/reviews/123"
        );
        assert_eq!(
            resolve_link(&page, "https://example.com/r/9").unwrap().as_str(),
            "https://example.com/r/9"
        );
    }

    #[test]
    fn parse_url_rejects_garbage() {
        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
