use async_trait::async_trait;
use boardnet::config::MatchSettings;
use boardnet::matching::{match_in_batches, MatchResponse, RecordMatcher, RecordType};
use boardnet::model::{MatchedBoardMember, MatchedCompany, OrganizationUpload};
use boardnet::pipeline::{build_nodes_stage, match_companies_stage, match_people_stage};
use boardnet::table::read_records;
use boardnet::{BoardnetError, BoardnetResult, PipelineConfig};
use indexmap::IndexMap;
use serde_json::json;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

/// Answers every record with a match derived from its LocalID
struct EchoMatcher {
    calls: Mutex<Vec<(RecordType, usize)>>,
    fail_call: Option<usize>,
}

impl EchoMatcher {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_call: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_call: Some(call),
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

#[async_trait]
impl RecordMatcher for EchoMatcher {
    async fn match_batch(&self, record_type: RecordType, csv: String) -> BoardnetResult<MatchResponse> {
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let mut records: Vec<IndexMap<String, String>> = Vec::new();
        for row in rdr.deserialize() {
            records.push(row?);
        }

        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((record_type, records.len()));
            calls.len() - 1
        };
        if self.fail_call == Some(call) {
            return Err(BoardnetError::MatchApi {
                status: 429,
                body: "quota exceeded".to_string(),
            });
        }

        let output = records
            .into_iter()
            .map(|r| {
                let local = r.get("LocalID").cloned().unwrap_or_default();
                let mut out = IndexMap::new();
                out.insert("Input_LocalID".to_string(), json!(local));
                match record_type {
                    RecordType::Organization => {
                        out.insert("Input_Name".to_string(), json!(r.get("Name")));
                        out.insert("Match OpenPermID".to_string(), json!(format!("{}00", local)));
                    }
                    RecordType::Person => {
                        out.insert("Match OpenPermID".to_string(), json!(format!("p{}", local)));
                        out.insert("Match Last Name".to_string(), json!(r.get("LastName")));
                        out.insert("Input_OrgOpenPermID".to_string(), json!(r.get("OrgOpenPermID")));
                    }
                }
                out.insert("Match Score".to_string(), json!(0.9));
                out
            })
            .collect();
        Ok(MatchResponse { output })
    }
}

fn uploads(n: usize) -> Vec<OrganizationUpload> {
    (1..=n)
        .map(|i| OrganizationUpload {
            local_id: i.to_string(),
            standard_identifier: format!("Ticker:T{}", i),
            name: format!("Company {}", i),
            country: "GB".to_string(),
        })
        .collect()
}

fn settings(batch_size: usize) -> MatchSettings {
    MatchSettings {
        batch_size,
        request_delay_ms: 0,
        ..MatchSettings::default()
    }
}

#[tokio::test]
async fn test_batches_never_exceed_limit() {
    let matcher = EchoMatcher::new();
    let run = match_in_batches(&matcher, RecordType::Organization, &uploads(1203), &settings(5000))
        .await
        .unwrap();

    assert_eq!(matcher.batch_sizes(), vec![500, 500, 203]);
    assert_eq!(run.batches, 3);
    assert_eq!(run.rows.len(), 1203);
    assert!(run.is_complete());
    assert_eq!(run.rows[0]["Input_LocalID"], "1");
    assert_eq!(run.rows[1202]["Match OpenPermID"], "120300");
}

#[tokio::test]
async fn test_configured_batch_size() {
    let matcher = EchoMatcher::new();
    let run = match_in_batches(&matcher, RecordType::Organization, &uploads(250), &settings(100))
        .await
        .unwrap();

    assert_eq!(matcher.batch_sizes(), vec![100, 100, 50]);
    assert_eq!(run.rows.len(), 250);
}

#[tokio::test]
async fn test_failed_batch_is_skipped() {
    let matcher = EchoMatcher::failing_on(1);
    let run = match_in_batches(&matcher, RecordType::Organization, &uploads(1203), &settings(500))
        .await
        .unwrap();

    // Remaining batches still run
    assert_eq!(matcher.batch_sizes().len(), 3);
    assert_eq!(run.batches, 3);
    assert_eq!(run.rows.len(), 703);
    assert!(!run.is_complete());

    let failure = &run.failures[0];
    assert_eq!(failure.batch, 1);
    assert_eq!(failure.records, 500);
    assert_eq!(failure.status, Some(429));
    assert!(failure.message.contains("quota exceeded"));
}

#[tokio::test]
async fn test_empty_input_sends_nothing() {
    let matcher = EchoMatcher::new();
    let records: Vec<OrganizationUpload> = Vec::new();
    let run = match_in_batches(&matcher, RecordType::Person, &records, &settings(500))
        .await
        .unwrap();

    assert!(matcher.batch_sizes().is_empty());
    assert_eq!(run.batches, 0);
    assert!(run.rows.is_empty());
}

const COMPANY_DETAILS: &str = "\
ID,Company,Symbol,Exchange,Sector,Url
1,Alpha plc,ALP,XLON,Banks,https://example.com/alpha
2,Beta Group,BET,XLON,Banks,https://example.com/beta
3,Gamma Energy,GAM,XLON,Energy,https://example.com/gamma
";

const BOARD_MEMBERS: &str = "\
Name,Age,Since,Current Position,Url
Mr Ann Smith,61,2015,Chair,https://example.com/alpha
Ann Smith,61,2018,Director,https://example.com/beta
Mr,,,,https://example.com/gamma
Bob Jones,55,2020,Director,https://example.com/unknown
";

fn data_dir() -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("company_details.csv"), COMPANY_DETAILS).unwrap();
    fs::write(dir.path().join("board_members.csv"), BOARD_MEMBERS).unwrap();

    let mut config = PipelineConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.matching.request_delay_ms = 0;
    (dir, config)
}

#[tokio::test]
async fn test_company_stage_feeds_node_list() {
    let (dir, config) = data_dir();
    let matcher = EchoMatcher::new();

    let run = match_companies_stage(&config, &matcher).await.unwrap();
    assert_eq!(run.rows.len(), 3);

    let matched: Vec<MatchedCompany> = read_records(dir.path().join("matched_companies.csv")).unwrap();
    assert_eq!(matched[0].local_id.as_deref(), Some("1"));
    assert_eq!(matched[0].perm_id.as_deref(), Some("100"));
    assert_eq!(matched[0].score, Some(0.9));

    let outcome = build_nodes_stage(&config).unwrap();
    let ids: Vec<&str> = outcome.nodes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["100", "200", "300"]);
    assert_eq!(outcome.nodes[2].sector.as_deref(), Some("Energy"));
}

#[tokio::test]
async fn test_people_stage_links_members_to_companies() {
    let (dir, config) = data_dir();
    let matcher = EchoMatcher::new();

    match_companies_stage(&config, &matcher).await.unwrap();
    let run = match_people_stage(&config, &matcher).await.unwrap();

    // The honorific-only row and the unknown company page are not sent
    assert_eq!(run.rows.len(), 2);
    let calls = matcher.calls.lock().unwrap().clone();
    assert_eq!(calls.last(), Some(&(RecordType::Person, 2)));

    let members: Vec<MatchedBoardMember> =
        read_records(dir.path().join("matched_board_members.csv")).unwrap();
    let orgs: Vec<&str> = members.iter().filter_map(|m| m.org_perm_id.as_deref()).collect();
    assert_eq!(orgs, vec!["100", "200"]);
    assert_eq!(members[0].last_name.as_deref(), Some("Smith"));
}

#[tokio::test]
async fn test_failed_run_keeps_previous_table() {
    let (dir, config) = data_dir();
    let previous = "Input_LocalID,Match OpenPermID\n1,100\n";
    fs::write(dir.path().join("matched_companies.csv"), previous).unwrap();

    // All three companies fit in the single batch, which fails
    let matcher = EchoMatcher::failing_on(0);
    let run = match_companies_stage(&config, &matcher).await.unwrap();

    assert!(run.rows.is_empty());
    assert_eq!(run.failures.len(), 1);
    assert_eq!(fs::read_to_string(dir.path().join("matched_companies.csv")).unwrap(), previous);
}

#[tokio::test]
async fn test_partial_run_overwrites_table() {
    let (dir, mut config) = data_dir();
    config.matching.batch_size = 2;
    fs::write(dir.path().join("matched_companies.csv"), "Input_LocalID\nstale\n").unwrap();

    let matcher = EchoMatcher::failing_on(1);
    let run = match_companies_stage(&config, &matcher).await.unwrap();
    assert_eq!(run.rows.len(), 2);

    let matched: Vec<MatchedCompany> = read_records(dir.path().join("matched_companies.csv")).unwrap();
    let ids: Vec<Option<&str>> = matched.iter().map(|m| m.perm_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("100"), Some("200")]);
}
