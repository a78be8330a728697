// Client-side filtering and sorting.
// Pure, synchronous re-derivation of a result set from an already-fetched
// batch, for filters the remote query does not express well.

use chrono::{DateTime, Utc};

use crate::filters::{ExperienceLevel, SearchFilters, SortField, SortOrder};
use crate::github::types::{ResultSet, UserRecord};

const DAYS_PER_YEAR: f64 = 365.25;

/// Derive an experience tier from account age and repository count.
///
/// The junior clause is evaluated first: a profile that qualifies as junior
/// by age is junior even when its repo count alone would qualify as senior.
pub fn experience_level(record: &UserRecord, now: DateTime<Utc>) -> ExperienceLevel {
    let age_years = record
        .created_at
        .map(|created| (now - created).num_days() as f64 / DAYS_PER_YEAR)
        .unwrap_or(0.0);

    if age_years <= 2.5 || record.public_repos <= 15 {
        ExperienceLevel::Junior
    } else if age_years >= 5.0 || record.public_repos >= 60 {
        ExperienceLevel::Senior
    } else {
        ExperienceLevel::Mid
    }
}

/// Re-filter and re-sort an already-fetched batch against the current intent.
///
/// Rules apply independently and conjunctively. Language matching here is a
/// deliberately weak substring heuristic over bio and login; remote-search
/// language filtering is preferred whenever a fresh fetch is warranted.
/// Ties sort stably in original fetch order.
pub fn apply(records: &[UserRecord], filters: &SearchFilters, now: DateTime<Utc>) -> ResultSet {
    let mut items: Vec<UserRecord> = records
        .iter()
        .filter(|r| matches(r, filters, now))
        .cloned()
        .collect();

    sort(&mut items, filters.sort_by, filters.order);

    ResultSet {
        total_count: items.len() as u64,
        incomplete: false,
        items,
    }
}

/// Refine a freshly fetched page against the filters the remote query
/// cannot express. The search endpoint already honored the language,
/// location, and numeric thresholds; only the experience tier needs
/// resolving here.
pub fn refine(
    records: &[UserRecord],
    filters: &SearchFilters,
    now: DateTime<Utc>,
) -> Vec<UserRecord> {
    match filters.experience_level {
        Some(level) => records
            .iter()
            .filter(|r| experience_level(r, now) == level)
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

fn matches(record: &UserRecord, filters: &SearchFilters, now: DateTime<Utc>) -> bool {
    if let Some(language) = &filters.language {
        let needle = language.to_lowercase();
        let in_bio = record
            .bio
            .as_deref()
            .is_some_and(|bio| bio.to_lowercase().contains(&needle));
        let in_login = record.login.to_lowercase().contains(&needle);
        if !in_bio && !in_login {
            return false;
        }
    }

    if let Some(location) = &filters.location {
        let needle = location.to_lowercase();
        let found = record
            .location
            .as_deref()
            .is_some_and(|loc| loc.to_lowercase().contains(&needle));
        if !found {
            return false;
        }
    }

    if let Some(min_repos) = filters.min_repos {
        if record.public_repos < min_repos {
            return false;
        }
    }

    if let Some(min_followers) = filters.min_followers {
        if record.followers < min_followers {
            return false;
        }
    }

    if let Some(level) = filters.experience_level {
        if experience_level(record, now) != level {
            return false;
        }
    }

    true
}

fn sort(items: &mut [UserRecord], field: SortField, order: SortOrder) {
    // Reversing the ordering rather than the slice keeps ties in fetch order.
    items.sort_by(|a, b| {
        let ord = match field {
            SortField::Followers => a.followers.cmp(&b.followers),
            SortField::Repositories => a.public_repos.cmp(&b.public_repos),
            SortField::Joined => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
