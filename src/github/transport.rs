// HTTP transport seam.
// Normalizes a network exchange into status, body, and the rate-limit header
// triple; the trait lets tests substitute a scripted transport.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{GitscoutError, Result};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Rate-limit header triple read from a response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateHeaders {
    pub remaining: Option<u32>,
    pub reset_epoch_secs: Option<i64>,
    pub limit: Option<u32>,
}

impl RateHeaders {
    /// The triple only counts when all three headers were present.
    pub fn complete(&self) -> Option<(u32, i64, u32)> {
        Some((self.remaining?, self.reset_epoch_secs?, self.limit?))
    }
}

/// One completed network exchange, successful or not.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: StatusCode,
    pub body: String,
    pub rate: RateHeaders,
}

/// Executes a single GET exchange against the provider.
pub trait Transport: Send + Sync {
    fn execute(&self, url: &str) -> impl Future<Output = Result<Exchange>> + Send;
}

/// Production transport over reqwest with default-header auth.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport. A missing token still permits calls at the
    /// provider's lower anonymous budget.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                GitscoutError::RequestFailed {
                    status: 0,
                    status_text: "invalid token header value".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gitscout"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(GitscoutError::Http)?;

        Ok(Self { client })
    }

    /// Create a transport from the GITHUB_TOKEN environment variable,
    /// falling back to anonymous access when unset.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").ok();
        Self::new(token.as_deref())
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, url: &str) -> Result<Exchange> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GitscoutError::Http)?;

        let status = response.status();
        let rate = rate_headers(response.headers());
        let body = response.text().await.map_err(GitscoutError::Http)?;

        Ok(Exchange { status, body, rate })
    }
}

fn rate_headers(headers: &HeaderMap) -> RateHeaders {
    fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    RateHeaders {
        remaining: parse(headers, "x-ratelimit-remaining"),
        reset_epoch_secs: parse(headers, "x-ratelimit-reset"),
        limit: parse(headers, "x-ratelimit-limit"),
    }
}
