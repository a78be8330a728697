// gitscout: locate and rank GitHub developer profiles under a tight
// per-hour call budget.
//
// The crate centers on three cooperating pieces: a time-bounded response
// cache over a durable key/value medium, a rate-limit tracker fed from
// response metadata, and an orchestrator that debounces intent changes and
// chooses between fresh remote searches and local re-filtering. Rendering,
// credential flows, and favorites live outside this crate; they consume the
// orchestrator's watch snapshots and feed it intents.

pub mod cache;
pub mod error;
pub mod filter_engine;
pub mod filters;
pub mod github;
pub mod query;
pub mod state;

pub use cache::{CacheStore, FsMedium, KvMedium, MemoryMedium};
pub use error::{GitscoutError, Result};
pub use filters::{ExperienceLevel, SearchFilters, SortField, SortOrder};
pub use github::{
    HttpTransport, RateLimitState, RateLimitTracker, RepoRecord, ResultSet, SearchClient,
    Transport, UserRecord,
};
pub use state::{Intent, Phase, SearchOrchestrator, ViewState};
