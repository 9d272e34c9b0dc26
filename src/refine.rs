// src/refine.rs
//! Client-side refinement of a fetched result set.
//!
//! The backend evaluates every filter it understands; what remains is the
//! skill-level bucket, which is inferred from the free-text experience
//! field and therefore cannot be expressed in the server query. Refinement
//! is a pure function over the fetched listings: no side effects, no
//! network, and applying it twice with the same query yields the same list.

use crate::query::{QueryState, SkillLevel};
use crate::types::job::JobListing;
use crate::utils::parse_experience_years;

/// Infer the skill-level bucket for a listing, if its experience field
/// carries a usable figure. Listings without one have no bucket: they stay
/// visible in unfiltered views and drop out when a skill-level filter is
/// active, instead of masquerading as entry-level.
pub fn skill_bucket(listing: &JobListing) -> Option<SkillLevel> {
    parse_experience_years(&listing.experience).map(SkillLevel::from_years)
}

/// Apply the client-side predicates to a fetched result set.
pub fn refine(listings: &[JobListing], query: &QueryState) -> Vec<JobListing> {
    match query.skill_level() {
        None => listings.to_vec(),
        Some(level) => listings
            .iter()
            .filter(|listing| skill_bucket(listing) == Some(level))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterKey, FilterValue};
    use crate::types::job::CompanyRef;
    use chrono::Utc;

    fn listing(id: &str, experience: &str) -> JobListing {
        JobListing {
            id: id.to_string(),
            title: format!("Job {id}"),
            company: CompanyRef {
                name: "Acme".to_string(),
                logo_url: None,
            },
            location: "Remote".to_string(),
            salary: String::new(),
            job_type: vec!["Full-time".to_string()],
            experience: experience.to_string(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn with_skill_level(label: &str) -> QueryState {
        let mut query = QueryState::new();
        query.set_filter(FilterKey::SkillLevel, FilterValue::Choice(label.to_string()));
        query
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let listings = vec![listing("a", "1"), listing("b", "unspecified")];
        let refined = refine(&listings, &QueryState::new());
        assert_eq!(refined.len(), 2);
    }

    #[test]
    fn test_buckets_by_parsed_years() {
        let listings = vec![
            listing("junior", "1 year"),
            listing("mid", "4 years"),
            listing("senior", "8+ years"),
        ];

        let beginners = refine(&listings, &with_skill_level("Beginner"));
        assert_eq!(beginners.len(), 1);
        assert_eq!(beginners[0].id, "junior");

        let intermediate = refine(&listings, &with_skill_level("Intermediate"));
        assert_eq!(intermediate.len(), 1);
        assert_eq!(intermediate[0].id, "mid");

        let advanced = refine(&listings, &with_skill_level("Advanced"));
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced[0].id, "senior");
    }

    #[test]
    fn test_non_numeric_experience_never_buckets_as_beginner() {
        let listings = vec![listing("vague", "extensive industry exposure")];
        let refined = refine(&listings, &with_skill_level("Beginner"));
        assert!(refined.is_empty());
        // Without an active skill-level filter the listing stays visible.
        assert_eq!(refine(&listings, &QueryState::new()).len(), 1);
    }

    #[test]
    fn test_refine_is_idempotent() {
        let listings = vec![
            listing("a", "2"),
            listing("b", "4"),
            listing("c", "plenty"),
        ];
        let query = with_skill_level("Beginner");
        let once = refine(&listings, &query);
        let twice = refine(&once, &query);
        assert_eq!(
            once.iter().map(|l| &l.id).collect::<Vec<_>>(),
            twice.iter().map(|l| &l.id).collect::<Vec<_>>()
        );
    }
}
