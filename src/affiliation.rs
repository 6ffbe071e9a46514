//! Person-to-company affiliations
//!
//! Matched board members become affiliations only when both identifiers are
//! present and the match confidence clears the threshold. Everything else is
//! dropped here, before edge building.

use crate::model::{non_empty, Affiliation, CompanyId, MatchedBoardMember, PersonId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Default minimum match confidence (exclusive)
pub const DEFAULT_MIN_SCORE: f64 = 0.2;

/// Per-person company sets, keyed and ordered by person ID
pub type AffiliationMap = BTreeMap<PersonId, BTreeSet<CompanyId>>;

/// Confidence threshold for affiliation records
#[derive(Debug, Clone, Copy)]
pub struct AffiliationFilter {
    /// Records with a score at or below this value are discarded
    pub min_score: f64,
}

impl Default for AffiliationFilter {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl AffiliationFilter {
    pub fn new(min_score: f64) -> Self {
        Self { min_score }
    }

    /// Missing scores never pass.
    pub fn accepts(&self, score: Option<f64>) -> bool {
        matches!(score, Some(s) if s > self.min_score)
    }
}

/// Counters from affiliation collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AffiliationStats {
    /// Records kept (before per-person deduplication)
    pub accepted: usize,
    /// Records dropped for low or missing confidence
    pub low_confidence: usize,
    /// Records rejected for a missing person or company ID
    pub malformed: usize,
    /// Distinct persons with at least one accepted affiliation
    pub persons: usize,
}

/// Accepted affiliations grouped by person
#[derive(Debug, Clone, Default)]
pub struct AffiliationSet {
    pub by_person: AffiliationMap,
    pub stats: AffiliationStats,
}

/// Convert a matched board member row into an affiliation.
///
/// Returns `None` when either identifier is missing or blank.
pub fn to_affiliation(row: &MatchedBoardMember) -> Option<Affiliation> {
    let person = non_empty(&row.perm_id)?;
    let company = non_empty(&row.org_perm_id)?;
    Some(Affiliation {
        person: PersonId::new(person),
        company: CompanyId::new(company),
        score: row.score,
    })
}

/// Filter and group affiliations.
pub fn collect_affiliations<I>(affiliations: I, filter: &AffiliationFilter) -> AffiliationSet
where
    I: IntoIterator<Item = Affiliation>,
{
    let mut set = AffiliationSet::default();

    for aff in affiliations {
        if aff.person.as_str().trim().is_empty() || aff.company.as_str().trim().is_empty() {
            set.stats.malformed += 1;
            warn!("Rejecting affiliation with empty identifier: {:?}", aff);
            continue;
        }
        if !filter.accepts(aff.score) {
            set.stats.low_confidence += 1;
            debug!(
                "Dropping low-confidence affiliation {} -> {} (score {:?})",
                aff.person, aff.company, aff.score
            );
            continue;
        }
        set.stats.accepted += 1;
        set.by_person.entry(aff.person).or_default().insert(aff.company);
    }

    set.stats.persons = set.by_person.len();
    set
}

/// Collect affiliations straight from match API rows.
pub fn collect_from_matches(rows: &[MatchedBoardMember], filter: &AffiliationFilter) -> AffiliationSet {
    let mut malformed = 0;
    let affiliations: Vec<Affiliation> = rows
        .iter()
        .filter_map(|row| {
            let aff = to_affiliation(row);
            if aff.is_none() {
                malformed += 1;
                debug!("Skipping board member row without identifiers: {:?}", row);
            }
            aff
        })
        .collect();

    let mut set = collect_affiliations(affiliations, filter);
    set.stats.malformed += malformed;

    if malformed > 0 {
        warn!("{} board member rows lacked a person or company identifier", malformed);
    }
    info!(
        "Affiliations: {} accepted, {} below confidence {}, {} malformed, {} persons",
        set.stats.accepted, set.stats.low_confidence, filter.min_score, set.stats.malformed, set.stats.persons
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aff(person: &str, company: &str, score: Option<f64>) -> Affiliation {
        Affiliation {
            person: PersonId::from(person),
            company: CompanyId::from(company),
            score,
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let filter = AffiliationFilter::default();
        assert!(!filter.accepts(Some(0.2)));
        assert!(filter.accepts(Some(0.2001)));
        assert!(!filter.accepts(None));
    }

    #[test]
    fn test_collect_groups_and_dedups() {
        let set = collect_affiliations(
            vec![
                aff("p1", "X", Some(0.9)),
                aff("p1", "Y", Some(0.9)),
                aff("p1", "X", Some(0.8)),
                aff("p2", "X", Some(0.1)),
                aff("p3", "", Some(0.9)),
            ],
            &AffiliationFilter::default(),
        );

        assert_eq!(set.by_person.len(), 1);
        let p1: Vec<_> = set.by_person[&PersonId::from("p1")].iter().map(|c| c.as_str()).collect();
        assert_eq!(p1, vec!["X", "Y"]);
        assert_eq!(
            set.stats,
            AffiliationStats {
                accepted: 3,
                low_confidence: 1,
                malformed: 1,
                persons: 1,
            }
        );
    }

    #[test]
    fn test_collect_from_matches_rejects_missing_ids() {
        let rows = vec![
            MatchedBoardMember {
                perm_id: Some("p1".into()),
                first_name: Some("Ann".into()),
                last_name: None,
                score: Some(0.95),
                org_perm_id: Some("X".into()),
            },
            MatchedBoardMember {
                perm_id: None,
                first_name: None,
                last_name: None,
                score: Some(0.95),
                org_perm_id: Some("Y".into()),
            },
        ];

        let set = collect_from_matches(&rows, &AffiliationFilter::default());
        assert_eq!(set.stats.accepted, 1);
        assert_eq!(set.stats.malformed, 1);
    }
}
