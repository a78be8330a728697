// GitHub API module.
// Transport, cached search client, response types, and rate budget tracking.

pub mod client;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use client::SearchClient;
pub use rate_limit::{LOW_REMAINING_THRESHOLD, RateLimitState, RateLimitTracker};
pub use transport::{Exchange, HttpTransport, RateHeaders, Transport};
pub use types::{RepoRecord, ResultSet, UserRecord};
