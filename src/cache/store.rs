// Time-bounded response cache.
// Wraps a key/value medium with JSON serialization, TTL checking, and
// deterministic request-key derivation. Caching is best-effort: failures
// degrade to misses, never to errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::medium::KvMedium;

/// TTL applied uniformly to all entries: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Namespace prefix for request-identity keys.
const REQUEST_KEY_PREFIX: &str = "req:";

/// Derive the cache key for a request identity.
///
/// Deterministic and collision-free for distinct identities: two logically
/// identical requests map to the same key regardless of how their argument
/// objects were built.
pub fn request_key(method: &str, url: &str) -> String {
    let digest = Sha256::digest(format!("{} {}", method, url).as_bytes());
    format!("{}{}", REQUEST_KEY_PREFIX, hex::encode(digest))
}

/// Wrapper persisted in the medium alongside each payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(payload: T) -> Self {
        Self {
            payload,
            stored_at: Utc::now(),
        }
    }

    /// An entry is stale strictly after the TTL elapses.
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        elapsed > ttl
    }
}

/// Time-bounded cache over an injected durable medium.
#[derive(Clone)]
pub struct CacheStore {
    medium: Arc<dyn KvMedium>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(medium: Arc<dyn KvMedium>) -> Self {
        Self {
            medium,
            ttl: DEFAULT_TTL,
        }
    }

    /// Read a payload, treating expired or corrupt entries as absent.
    /// Eviction is lazy: staleness is only checked here, and stale or
    /// malformed entries are removed on the spot.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache entry, discarding");
                self.discard(key);
                return None;
            }
        };

        if entry.is_expired(self.ttl, Utc::now()) {
            debug!(key, "cache entry expired");
            self.discard(key);
            return None;
        }

        debug!(key, "cache hit");
        Some(entry.payload)
    }

    /// Store a payload. Write failures are non-fatal: the medium simply
    /// behaves as a miss on the next read.
    pub fn set<T: Serialize>(&self, key: &str, payload: &T) {
        let entry = CacheEntry::new(payload);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache serialization failed, skipping write");
                return;
            }
        };
        if let Err(e) = self.medium.put(key, &raw) {
            warn!(key, error = %e, "cache write failed");
        }
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.medium.remove(key) {
            warn!(key, error = %e, "failed to remove cache entry");
        }
    }
}
