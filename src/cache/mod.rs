// Cache module for the durable local medium and the TTL response cache.
// Shared by the search client and the rate-limit tracker.

pub mod medium;
pub mod store;

pub use medium::{FsMedium, KvMedium, MemoryMedium};
pub use store::{CacheStore, DEFAULT_TTL, request_key};
