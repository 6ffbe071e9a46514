//! Node list construction from matched companies

use crate::model::{non_empty, Company, CompanyDetail, CompanyId, MatchedCompany};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Node list plus the rows that did not make it in
#[derive(Debug, Clone, Default)]
pub struct NodeListOutcome {
    /// One company per distinct match ID, sorted by ID
    pub nodes: Vec<Company>,
    /// Rows without a match ID
    pub unmatched: usize,
    /// Rows whose match ID was already taken by an earlier row
    pub duplicates: usize,
    /// Matched rows with no scraped detail row to join against
    pub missing_detail: usize,
}

/// Strip a `Ticker:` style prefix from a standard identifier.
fn symbol_from_identifier(identifier: &str) -> Option<String> {
    let value = match identifier.split_once(':') {
        Some((_, rest)) => rest,
        None => identifier,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build the node list.
///
/// Matched rows are joined with scraped details on `Input_LocalID = ID`.
/// The first row wins when several local companies resolve to the same ID.
pub fn build_node_list(matched: &[MatchedCompany], details: &[CompanyDetail]) -> NodeListOutcome {
    let details_by_id: HashMap<&str, &CompanyDetail> =
        details.iter().map(|d| (d.id.trim(), d)).collect();

    let mut outcome = NodeListOutcome::default();
    let mut nodes: BTreeMap<CompanyId, Company> = BTreeMap::new();

    for row in matched {
        let Some(perm_id) = non_empty(&row.perm_id) else {
            outcome.unmatched += 1;
            debug!("No match for local company {:?}", row.local_id);
            continue;
        };
        let id = CompanyId::new(perm_id);
        if nodes.contains_key(&id) {
            outcome.duplicates += 1;
            warn!("Company {} matched more than once; keeping first row", id);
            continue;
        }

        let detail = non_empty(&row.local_id).and_then(|local| details_by_id.get(local).copied());
        if detail.is_none() {
            outcome.missing_detail += 1;
        }

        let label = non_empty(&row.input_name)
            .or_else(|| non_empty(&row.org_name))
            .or_else(|| detail.map(|d| d.company.trim()))
            .unwrap_or(perm_id)
            .to_string();

        let symbol = detail
            .and_then(|d| non_empty(&d.symbol).map(str::to_string))
            .or_else(|| non_empty(&row.standard_identifier).and_then(symbol_from_identifier));

        let sector = detail.and_then(|d| non_empty(&d.sector).map(str::to_string));

        nodes.insert(
            id.clone(),
            Company {
                id,
                label,
                symbol,
                sector,
            },
        );
    }

    outcome.nodes = nodes.into_values().collect();
    info!(
        "Node list: {} companies ({} unmatched, {} duplicate matches, {} without detail)",
        outcome.nodes.len(),
        outcome.unmatched,
        outcome.duplicates,
        outcome.missing_detail
    );
    outcome
}
