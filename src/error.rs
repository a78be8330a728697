// Error types for the gitscout crate.
// Covers provider API errors, decode failures, and cache medium errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitscoutError {
    #[error("rate limit exceeded{}", reset_display(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    #[error("request failed: HTTP {status} {status_text}")]
    RequestFailed { status: u16, status_text: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn reset_display(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(", resets at {}", at.format("%H:%M:%S")),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, GitscoutError>;
