// GitHub API response types.
// Defines structs for deserializing user-search and profile responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A developer profile as returned by the provider.
///
/// Search payloads omit the profile detail fields (bio, location, counts,
/// created_at); those default so the same struct can carry both a search hit
/// and a full `/users/{login}` lookup. Records are never mutated, only
/// filtered, sorted, and re-shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A repository in a user's profile listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    pub updated_at: DateTime<Utc>,
}

/// One complete, atomically visible set of search results.
///
/// Always replaced wholesale, never partially updated, so consumers can
/// assume they see a full set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<UserRecord>,
    pub total_count: u64,
    pub incomplete: bool,
}

/// Raw `/search/users` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<UserRecord>,
}

impl From<SearchUsersResponse> for ResultSet {
    fn from(raw: SearchUsersResponse) -> Self {
        Self {
            total_count: raw.total_count,
            incomplete: raw.incomplete_results,
            items: raw.items,
        }
    }
}
