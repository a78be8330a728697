// Search client.
// Executes single logical search/lookup requests: cache first, then the
// network, updating the rate-limit tracker from response metadata and
// normalizing failures into the crate error taxonomy.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::{CacheStore, request_key};
use crate::error::{GitscoutError, Result};
use crate::filters::SearchFilters;
use crate::query;

use super::rate_limit::RateLimitTracker;
use super::transport::{GITHUB_API_BASE, Transport};
use super::types::{RepoRecord, ResultSet, SearchUsersResponse, UserRecord};

/// Cached, rate-aware client for the provider's search and profile API.
pub struct SearchClient<T: Transport> {
    transport: Arc<T>,
    cache: CacheStore,
    rate_limit: Arc<RateLimitTracker>,
}

// Derived Clone would require T: Clone; only the Arcs are cloned.
impl<T: Transport> Clone for SearchClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            cache: self.cache.clone(),
            rate_limit: self.rate_limit.clone(),
        }
    }
}

impl<T: Transport> SearchClient<T> {
    pub fn new(transport: Arc<T>, cache: CacheStore, rate_limit: Arc<RateLimitTracker>) -> Self {
        Self {
            transport,
            cache,
            rate_limit,
        }
    }

    /// Last provider-reported rate budget.
    pub fn rate_limit(&self) -> Option<super::rate_limit::RateLimitState> {
        self.rate_limit.read()
    }

    /// Search user profiles matching the given filters.
    pub async fn search_users(
        &self,
        filters: &SearchFilters,
        page: u32,
        per_page: u32,
    ) -> Result<ResultSet> {
        let q = query::build(filters);
        let params = encode_params(&[
            ("q", q.as_str()),
            ("sort", filters.sort_by.as_param()),
            ("order", filters.order.as_param()),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ]);
        let url = format!("{}/search/users?{}", GITHUB_API_BASE, params);

        let raw: SearchUsersResponse = self.fetch_json(&url).await?;
        Ok(raw.into())
    }

    /// Look up a single profile by login.
    pub async fn get_user(&self, login: &str) -> Result<UserRecord> {
        let url = format!("{}/users/{}", GITHUB_API_BASE, login);
        self.fetch_json(&url).await
    }

    /// List a user's repositories, most recently updated first.
    pub async fn get_user_repos(
        &self,
        login: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepoRecord>> {
        let params = encode_params(&[
            ("sort", "updated"),
            ("direction", "desc"),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ]);
        let url = format!("{}/users/{}/repos?{}", GITHUB_API_BASE, login, params);
        self.fetch_json(&url).await
    }

    /// Byte counts per language for a repository.
    pub async fn get_repo_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<BTreeMap<String, u64>> {
        let url = format!("{}/repos/{}/{}/languages", GITHUB_API_BASE, owner, repo);
        self.fetch_json(&url).await
    }

    /// Cached fetch discipline shared by every operation.
    ///
    /// On a cache hit no network call occurs and the tracker is untouched.
    /// On a miss the tracker updates from the header triple regardless of
    /// exchange outcome; 403/429 maps to `RateLimitExceeded`, other
    /// non-success statuses to `RequestFailed`, and only a decoded body is
    /// cached.
    async fn fetch_json<R>(&self, url: &str) -> Result<R>
    where
        R: DeserializeOwned + Serialize,
    {
        let key = request_key("GET", url);
        if let Some(hit) = self.cache.get::<R>(&key) {
            return Ok(hit);
        }

        debug!(url, "cache miss, fetching");
        let exchange = self.transport.execute(url).await?;

        if let Some((remaining, reset, limit)) = exchange.rate.complete() {
            self.rate_limit.update(remaining, reset, limit);
        }

        if exchange.status == StatusCode::FORBIDDEN
            || exchange.status == StatusCode::TOO_MANY_REQUESTS
        {
            return Err(GitscoutError::RateLimitExceeded {
                reset_at: self.rate_limit.read().and_then(|s| s.reset_at()),
            });
        }

        if !exchange.status.is_success() {
            return Err(GitscoutError::RequestFailed {
                status: exchange.status.as_u16(),
                status_text: exchange
                    .status
                    .canonical_reason()
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }

        let decoded: R = serde_json::from_str(&exchange.body)?;
        self.cache.set(&key, &decoded);
        Ok(decoded)
    }
}

fn encode_params(pairs: &[(&str, &str)]) -> String {
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        out.append_pair(name, value);
    }
    out.finish()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::cache::{CacheStore, MemoryMedium};

    fn client() -> (Arc<FakeTransport>, SearchClient<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let medium = Arc::new(MemoryMedium::new());
        let cache = CacheStore::new(medium.clone());
        let tracker = Arc::new(RateLimitTracker::new(medium));
        (
            transport.clone(),
            SearchClient::new(transport, cache, tracker),
        )
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_cache_and_leaves_rate_state_alone() {
        let (transport, client) = client();
        transport.push(ok_exchange(&user_json("torvalds", 150000)));

        let first = client.get_user("torvalds").await.unwrap();
        assert_eq!(transport.calls(), 1);
        let rate_after_first = client.rate_limit();
        assert_eq!(rate_after_first.unwrap().remaining, 29);

        let second = client.get_user("torvalds").await.unwrap();
        assert_eq!(transport.calls(), 1, "second call must not hit the network");
        assert_eq!(first, second);
        assert_eq!(client.rate_limit(), rate_after_first);
    }

    #[tokio::test]
    async fn test_forbidden_updates_tracker_and_fails_rate_limited() {
        let (transport, client) = client();
        transport.push(status_exchange(StatusCode::FORBIDDEN, "{}"));

        let err = client.get_user("anyone").await.unwrap_err();
        assert!(matches!(err, GitscoutError::RateLimitExceeded { .. }));

        let state = client.rate_limit().unwrap();
        assert_eq!(state.remaining, 0);
        assert_eq!(state.reset_at_ms, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_too_many_requests_maps_to_rate_limited() {
        let (transport, client) = client();
        transport.push(status_exchange(StatusCode::TOO_MANY_REQUESTS, "{}"));

        let err = client.get_user("anyone").await.unwrap_err();
        assert!(matches!(err, GitscoutError::RateLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_other_failure_surfaces_status() {
        let (transport, client) = client();
        transport.push(status_exchange(StatusCode::INTERNAL_SERVER_ERROR, ""));

        let err = client.get_user("anyone").await.unwrap_err();
        match err {
            GitscoutError::RequestFailed {
                status,
                status_text,
            } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_failure_is_hard_and_not_cached() {
        let (transport, client) = client();
        transport.push(ok_exchange("not json"));
        transport.push(ok_exchange(&user_json("octocat", 10)));

        let err = client.get_user("octocat").await.unwrap_err();
        assert!(matches!(err, GitscoutError::Decode(_)));

        // Nothing was cached, so the retry reaches the network and succeeds.
        let user = client.get_user("octocat").await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(user.login, "octocat");
    }

    #[tokio::test]
    async fn test_search_url_carries_query_and_transport_params() {
        let (transport, client) = client();
        transport.push(ok_exchange(&search_json(&["a", "b"], 2)));

        let filters = SearchFilters {
            query: "dev".into(),
            language: Some("Python".into()),
            ..Default::default()
        };
        let set = client.search_users(&filters, 2, 30).await.unwrap();
        assert_eq!(set.items.len(), 2);
        assert_eq!(set.total_count, 2);

        let url = transport.urls.lock().unwrap()[0].clone();
        assert!(url.contains("/search/users?"));
        assert!(url.contains("q=dev+language%3APython+type%3Auser"));
        assert!(url.contains("sort=followers"));
        assert!(url.contains("order=desc"));
        assert!(url.contains("page=2"));
        assert!(url.contains("per_page=30"));
    }

    #[tokio::test]
    async fn test_identical_searches_share_one_cache_entry() {
        let (transport, client) = client();
        transport.push(ok_exchange(&search_json(&["a"], 1)));

        let filters = SearchFilters {
            query: "dev".into(),
            ..Default::default()
        };
        let first = client.search_users(&filters, 1, 30).await.unwrap();
        let second = client.search_users(&filters.clone(), 1, 30).await.unwrap();
        assert_eq!(transport.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_repo_languages_decodes_byte_map() {
        let (transport, client) = client();
        transport.push(ok_exchange(r#"{"Rust": 120000, "Shell": 500}"#));

        let languages = client.get_repo_languages("rust-lang", "rust").await.unwrap();
        assert_eq!(languages.get("Rust"), Some(&120000));
        assert_eq!(languages.get("Shell"), Some(&500));
    }
}
