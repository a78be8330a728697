// User search intent.
// A filters object is immutable per decision cycle: every UI change replaces
// it wholesale rather than mutating fields in place.

use serde::{Deserialize, Serialize};

/// Field the result set is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Followers,
    Repositories,
    Joined,
}

impl SortField {
    /// Value for the provider's `sort` transport parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Followers => "followers",
            SortField::Repositories => "repositories",
            SortField::Joined => "joined",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Experience tier derived from account age and repository count.
/// Has no equivalent in the provider's search grammar; resolved only by the
/// client filter engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

/// Complete user search intent for one decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free-text search term.
    pub query: String,
    /// Primary programming language.
    pub language: Option<String>,
    /// Profile location.
    pub location: Option<String>,
    /// Minimum public repository count.
    pub min_repos: Option<u32>,
    /// Minimum follower count.
    pub min_followers: Option<u32>,
    pub sort_by: SortField,
    pub order: SortOrder,
    /// Client-only filter; never sent to the provider.
    pub experience_level: Option<ExperienceLevel>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            language: None,
            location: None,
            min_repos: None,
            min_followers: None,
            sort_by: SortField::default(),
            order: SortOrder::default(),
            experience_level: None,
        }
    }
}

impl SearchFilters {
    /// Whether any filter beyond the free-text term is set.
    pub fn has_active_filters(&self) -> bool {
        self.language.is_some()
            || self.location.is_some()
            || self.min_repos.is_some()
            || self.min_followers.is_some()
            || self.experience_level.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_active_filters() {
        assert!(!SearchFilters::default().has_active_filters());
    }

    #[test]
    fn test_each_filter_counts_as_active() {
        let base = SearchFilters::default();

        let mut f = base.clone();
        f.language = Some("Rust".into());
        assert!(f.has_active_filters());

        let mut f = base.clone();
        f.location = Some("Berlin".into());
        assert!(f.has_active_filters());

        let mut f = base.clone();
        f.min_repos = Some(10);
        assert!(f.has_active_filters());

        let mut f = base.clone();
        f.min_followers = Some(100);
        assert!(f.has_active_filters());

        let mut f = base.clone();
        f.experience_level = Some(ExperienceLevel::Senior);
        assert!(f.has_active_filters());
    }

    #[test]
    fn test_query_text_alone_is_not_a_filter() {
        let f = SearchFilters {
            query: "torvalds".into(),
            ..Default::default()
        };
        assert!(!f.has_active_filters());
    }
}
