//! Edge list construction
//!
//! Every person sitting on `k >= 2` boards links each pair of those
//! companies once. Pairs are aggregated over all persons; the weight of an
//! edge is the number of people shared by the two boards.

use crate::affiliation::AffiliationMap;
use crate::model::{CompanyId, EdgeRow};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Counters from one edge list build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeListSummary {
    /// Persons in the input mapping
    pub persons: usize,
    /// Persons affiliated with at least two companies
    pub contributing_persons: usize,
    /// Emitted (person, pair) contributions before aggregation
    pub contributions: usize,
    /// Distinct edges after aggregation
    pub edges: usize,
}

/// All unordered pairs of distinct companies, each as `(min, max)`.
///
/// The input set is already ordered, so `i < j` gives the canonical orientation.
pub fn person_pairs(companies: &BTreeSet<CompanyId>) -> Vec<(&CompanyId, &CompanyId)> {
    let ids: Vec<&CompanyId> = companies.iter().collect();
    let k = ids.len();
    if k < 2 {
        return Vec::new();
    }

    let mut pairs = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            pairs.push((ids[i], ids[j]));
        }
    }
    pairs
}

/// Build the deduplicated weighted edge list, sorted by `(V1, V2)`.
pub fn build_edge_list(affiliations: &AffiliationMap) -> Vec<EdgeRow> {
    build_edge_list_with_summary(affiliations).0
}

/// [`build_edge_list`] plus build counters.
pub fn build_edge_list_with_summary(affiliations: &AffiliationMap) -> (Vec<EdgeRow>, EdgeListSummary) {
    let mut weights: BTreeMap<(&CompanyId, &CompanyId), u32> = BTreeMap::new();
    let mut summary = EdgeListSummary {
        persons: affiliations.len(),
        ..Default::default()
    };

    for companies in affiliations.values() {
        let pairs = person_pairs(companies);
        if pairs.is_empty() {
            continue;
        }
        summary.contributing_persons += 1;
        summary.contributions += pairs.len();
        for pair in pairs {
            *weights.entry(pair).or_insert(0) += 1;
        }
    }

    let edges: Vec<EdgeRow> = weights
        .into_iter()
        .map(|((v1, v2), weight)| EdgeRow {
            v1: v1.clone(),
            v2: v2.clone(),
            weight,
        })
        .collect();
    summary.edges = edges.len();

    info!(
        "Edge list: {} persons ({} on multiple boards), {} contributions, {} edges",
        summary.persons, summary.contributing_persons, summary.contributions, summary.edges
    );

    (edges, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersonId;

    fn mapping(entries: &[(&str, &[&str])]) -> AffiliationMap {
        entries
            .iter()
            .map(|(p, cs)| (PersonId::from(*p), cs.iter().map(|c| CompanyId::from(*c)).collect()))
            .collect()
    }

    #[test]
    fn test_shared_members() {
        // A on {X, Y, Z}, B on {X, Y}
        let m = mapping(&[("A", &["X", "Y", "Z"]), ("B", &["X", "Y"])]);
        let (edges, summary) = build_edge_list_with_summary(&m);

        assert_eq!(
            edges,
            vec![
                EdgeRow::new("X", "Y", 2),
                EdgeRow::new("X", "Z", 1),
                EdgeRow::new("Y", "Z", 1),
            ]
        );
        assert_eq!(summary.contributions, 4);
        assert_eq!(summary.contributing_persons, 2);
    }

    #[test]
    fn test_pair_count() {
        let set: BTreeSet<CompanyId> = ["a", "b", "c", "d", "e"].iter().map(|c| CompanyId::from(*c)).collect();
        assert_eq!(person_pairs(&set).len(), 10);

        let single: BTreeSet<CompanyId> = [CompanyId::from("a")].into_iter().collect();
        assert!(person_pairs(&single).is_empty());
        assert!(person_pairs(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_canonical_orientation() {
        // Insertion order is irrelevant; V1 < V2 always
        let m = mapping(&[("A", &["Z", "B"])]);
        let edges = build_edge_list(&m);
        assert_eq!(edges, vec![EdgeRow::new("B", "Z", 1)]);
    }

    #[test]
    fn test_no_edges_from_singletons() {
        let m = mapping(&[("A", &["X"]), ("B", &[]), ("C", &["Y"])]);
        let (edges, summary) = build_edge_list_with_summary(&m);
        assert!(edges.is_empty());
        assert_eq!(summary.persons, 3);
        assert_eq!(summary.contributing_persons, 0);
    }
}
