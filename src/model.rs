//! Core record types
//!
//! Column names follow the CSV headers exchanged between pipeline stages.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Persistent external identifier of a company (graph node)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Self {
        CompanyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        CompanyId(id.to_string())
    }
}

/// Persistent external identifier of a person (board member)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        PersonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        PersonId(id.to_string())
    }
}

/// A company node (node list row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "ID")]
    pub id: CompanyId,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
}

impl Company {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Company {
            id: CompanyId::new(id),
            label: label.into(),
            symbol: None,
            sector: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// A weighted undirected edge (edge list row); `v1 < v2`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRow {
    #[serde(rename = "V1")]
    pub v1: CompanyId,
    #[serde(rename = "V2")]
    pub v2: CompanyId,
    #[serde(rename = "Weight")]
    pub weight: u32,
}

impl EdgeRow {
    pub fn new(v1: impl Into<String>, v2: impl Into<String>, weight: u32) -> Self {
        EdgeRow {
            v1: CompanyId::new(v1),
            v2: CompanyId::new(v2),
            weight,
        }
    }
}

/// A person-to-company link with the match confidence it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Affiliation {
    pub person: PersonId,
    pub company: CompanyId,
    pub score: Option<f64>,
}

/// Row of the exchange listing (company list)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedCompany {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "ISIN", default)]
    pub isin: Option<String>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
    #[serde(rename = "ICB Code", default)]
    pub icb_code: Option<String>,
}

/// Row of the scraped company detail table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "Exchange", default)]
    pub exchange: Option<String>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
}

/// Row returned by the match API for an organization upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedCompany {
    #[serde(rename = "Input_LocalID", default)]
    pub local_id: Option<String>,
    #[serde(rename = "Input_Name", default)]
    pub input_name: Option<String>,
    #[serde(rename = "Input_Standard Identifier", default)]
    pub standard_identifier: Option<String>,
    #[serde(rename = "Match OpenPermID", default)]
    pub perm_id: Option<String>,
    #[serde(rename = "Match OrgName", default)]
    pub org_name: Option<String>,
    #[serde(rename = "Match Score", default, deserialize_with = "deserialize_score")]
    pub score: Option<f64>,
}

/// Row of the scraped board member table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMemberRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Age", default)]
    pub age: Option<String>,
    #[serde(rename = "Since", default)]
    pub since: Option<String>,
    #[serde(rename = "Current Position", default)]
    pub position: Option<String>,
    #[serde(rename = "Url")]
    pub url: String,
}

/// Row returned by the match API for a person upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedBoardMember {
    #[serde(rename = "Match OpenPermID", default)]
    pub perm_id: Option<String>,
    #[serde(rename = "Match First Name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Match Last Name", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Match Score", default, deserialize_with = "deserialize_score")]
    pub score: Option<f64>,
    #[serde(rename = "Input_OrgOpenPermID", default)]
    pub org_perm_id: Option<String>,
}

/// Organization record in the match API upload template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationUpload {
    #[serde(rename = "LocalID")]
    pub local_id: String,
    #[serde(rename = "Standard Identifier")]
    pub standard_identifier: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Country")]
    pub country: String,
}

/// Person record in the match API upload template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonUpload {
    #[serde(rename = "LocalID")]
    pub local_id: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "OrgOpenPermID")]
    pub org_perm_id: String,
    #[serde(rename = "OrgName")]
    pub org_name: String,
}

/// Parse a match confidence: `0.87`, `87%` or empty.
pub fn parse_score(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let (number, scale) = match raw.strip_suffix('%') {
        Some(pct) => (pct.trim(), 100.0),
        None => (raw, 1.0),
    };
    number
        .parse::<f64>()
        .map(|v| Some(v / scale))
        .map_err(|_| format!("invalid match score '{}'", raw))
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) => parse_score(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Trimmed, non-empty value of an optional field
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("0.87").unwrap(), Some(0.87));
        assert_eq!(parse_score(" 45% ").unwrap(), Some(0.45));
        assert_eq!(parse_score("").unwrap(), None);
        assert!(parse_score("high").is_err());
    }

    #[test]
    fn test_company_id_ordering() {
        let mut ids = vec![CompanyId::from("5000"), CompanyId::from("40"), CompanyId::from("4")];
        ids.sort();
        assert_eq!(ids, vec![CompanyId::from("4"), CompanyId::from("40"), CompanyId::from("5000")]);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("  x ".to_string())), Some("x"));
        assert_eq!(non_empty(&Some("   ".to_string())), None);
        assert_eq!(non_empty(&None), None);
    }
}
