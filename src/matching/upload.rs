//! Upload records for the match API

use crate::model::{
    non_empty, BoardMemberRow, CompanyDetail, ListedCompany, MatchedCompany, OrganizationUpload, PersonUpload,
};
use std::collections::HashMap;
use tracing::{debug, info};

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "sir", "dame", "lord", "lady", "baroness", "baron",
];

/// Organization records built from scraped company details.
///
/// The ticker symbol is sent as a `Ticker:` standard identifier.
pub fn organization_uploads(details: &[CompanyDetail], country: &str) -> Vec<OrganizationUpload> {
    details
        .iter()
        .map(|d| OrganizationUpload {
            local_id: d.id.trim().to_string(),
            standard_identifier: non_empty(&d.symbol)
                .map(|s| format!("Ticker:{}", s))
                .unwrap_or_default(),
            name: d.company.trim().to_string(),
            country: country.to_string(),
        })
        .collect()
}

/// Organization records built from the exchange listing.
pub fn listing_uploads(listed: &[ListedCompany], country: &str) -> Vec<OrganizationUpload> {
    listed
        .iter()
        .map(|c| OrganizationUpload {
            local_id: c.id.trim().to_string(),
            standard_identifier: non_empty(&c.symbol)
                .map(|s| format!("Ticker:{}", s))
                .unwrap_or_default(),
            name: c.name.trim().to_string(),
            country: country.to_string(),
        })
        .collect()
}

/// Split a display name into first and last name, dropping honorifics.
///
/// Returns `None` when nothing but honorifics (or nothing at all) remains.
pub fn split_name(name: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = name
        .split_whitespace()
        .filter(|t| {
            let bare = t.trim_end_matches('.').to_ascii_lowercase();
            !HONORIFICS.contains(&bare.as_str())
        })
        .collect();

    match tokens.as_slice() {
        [] => None,
        [only] => Some((String::new(), only.to_string())),
        [first, .., last] => Some((first.to_string(), last.to_string())),
    }
}

/// Person records plus the number of board rows that could not be linked
#[derive(Debug, Clone, Default)]
pub struct PersonUploads {
    pub records: Vec<PersonUpload>,
    /// Rows whose company page is unknown or has no match ID
    pub unlinked: usize,
    /// Rows with an unusable name
    pub unnamed: usize,
}

/// Person records built from scraped board rows.
///
/// A board row is linked to its company through the page `Url`, and the
/// company to its match ID through the matched companies table.
pub fn person_uploads(
    board: &[BoardMemberRow],
    details: &[CompanyDetail],
    matched: &[MatchedCompany],
) -> PersonUploads {
    let detail_by_url: HashMap<&str, &CompanyDetail> = details
        .iter()
        .filter_map(|d| non_empty(&d.url).map(|url| (url, d)))
        .collect();

    let perm_by_local: HashMap<&str, &str> = matched
        .iter()
        .filter_map(|m| Some((non_empty(&m.local_id)?, non_empty(&m.perm_id)?)))
        .collect();

    let mut out = PersonUploads::default();
    for (row_idx, row) in board.iter().enumerate() {
        let company = detail_by_url.get(row.url.trim()).copied();
        let perm = company.and_then(|d| perm_by_local.get(d.id.trim()).copied());
        let (Some(company), Some(perm)) = (company, perm) else {
            out.unlinked += 1;
            debug!("Board row {} ({}) has no matched company", row_idx, row.url);
            continue;
        };

        let Some((first_name, last_name)) = split_name(&row.name) else {
            out.unnamed += 1;
            debug!("Board row {} has no usable name: {:?}", row_idx, row.name);
            continue;
        };

        out.records.push(PersonUpload {
            local_id: (row_idx + 1).to_string(),
            first_name,
            last_name,
            org_perm_id: perm.to_string(),
            org_name: company.company.trim().to_string(),
        });
    }

    info!(
        "Person uploads: {} records, {} unlinked, {} without a usable name",
        out.records.len(),
        out.unlinked,
        out.unnamed
    );
    out
}
