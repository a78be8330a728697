// Query string construction.
// Translates a filters object into the provider's user-search query dialect.

use crate::filters::SearchFilters;

/// Build the `q` term for a user search.
///
/// Clauses are appended in a fixed order so that identical filters always
/// yield byte-identical strings: free text, `language:`, `location:`,
/// `repos:>=`, `followers:>=`, then a `type:user` suffix to exclude
/// organizations. Sort, order, and pagination are transport parameters and
/// never part of the term; `experience_level` has no provider equivalent and
/// is left to the client filter engine.
pub fn build(filters: &SearchFilters) -> String {
    let mut parts: Vec<String> = Vec::new();

    let term = filters.query.trim();
    if !term.is_empty() {
        parts.push(term.to_string());
    }

    if let Some(language) = &filters.language {
        parts.push(format!("language:{}", language));
    }

    if let Some(location) = &filters.location {
        if location.contains(char::is_whitespace) {
            parts.push(format!("location:\"{}\"", location));
        } else {
            parts.push(format!("location:{}", location));
        }
    }

    if let Some(min_repos) = filters.min_repos {
        parts.push(format!("repos:>={}", min_repos));
    }

    if let Some(min_followers) = filters.min_followers {
        parts.push(format!("followers:>={}", min_followers));
    }

    parts.push("type:user".to_string());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ExperienceLevel;

    #[test]
    fn test_bare_query() {
        let filters = SearchFilters {
            query: "linus".into(),
            ..Default::default()
        };
        assert_eq!(build(&filters), "linus type:user");
    }

    #[test]
    fn test_empty_query_still_excludes_orgs() {
        assert_eq!(build(&SearchFilters::default()), "type:user");
    }

    #[test]
    fn test_language_clause() {
        let filters = SearchFilters {
            query: "dev".into(),
            language: Some("Python".into()),
            ..Default::default()
        };
        assert_eq!(build(&filters), "dev language:Python type:user");
    }

    #[test]
    fn test_location_quoted_only_when_multi_word() {
        let mut filters = SearchFilters {
            location: Some("Berlin".into()),
            ..Default::default()
        };
        assert_eq!(build(&filters), "location:Berlin type:user");

        filters.location = Some("San Francisco".into());
        assert_eq!(build(&filters), "location:\"San Francisco\" type:user");
    }

    #[test]
    fn test_numeric_thresholds() {
        let filters = SearchFilters {
            min_repos: Some(20),
            min_followers: Some(500),
            ..Default::default()
        };
        assert_eq!(build(&filters), "repos:>=20 followers:>=500 type:user");
    }

    #[test]
    fn test_all_clauses_in_order() {
        let filters = SearchFilters {
            query: "rustacean".into(),
            language: Some("Rust".into()),
            location: Some("New York".into()),
            min_repos: Some(5),
            min_followers: Some(50),
            ..Default::default()
        };
        assert_eq!(
            build(&filters),
            "rustacean language:Rust location:\"New York\" repos:>=5 followers:>=50 type:user"
        );
    }

    #[test]
    fn test_experience_level_never_appears() {
        let filters = SearchFilters {
            query: "dev".into(),
            experience_level: Some(ExperienceLevel::Senior),
            ..Default::default()
        };
        assert_eq!(build(&filters), "dev type:user");
    }

    #[test]
    fn test_build_is_deterministic() {
        let filters = SearchFilters {
            query: "dev".into(),
            language: Some("Go".into()),
            min_followers: Some(10),
            ..Default::default()
        };
        assert_eq!(build(&filters), build(&filters.clone()));
    }
}
