//! Identity resolution adapter
//!
//! Sends locally collected company and person records to the external
//! record-matching service in bounded batches. Batches are sent one after
//! another with a fixed pause; a failed batch is logged and skipped, never
//! retried, and the remaining batches still run.

pub mod client;
pub mod remote;
pub mod upload;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::config::MatchSettings;
use crate::error::{BoardnetError, BoardnetResult};
use crate::table::to_csv_string;

pub use client::RecordMatcher;
pub use remote::PermIdMatcher;
pub use upload::{listing_uploads, organization_uploads, person_uploads, split_name, PersonUploads};

/// Kind of record being matched (sent as the data type header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    Organization,
    Person,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Organization => "Organization",
            RecordType::Person => "Person",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful match response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchResponse {
    /// Matched rows, column order as returned by the service
    #[serde(rename = "outputContentResponse", default)]
    pub output: Vec<IndexMap<String, serde_json::Value>>,
}

impl MatchResponse {
    /// Rows with every value rendered as a CSV cell
    pub fn into_rows(self) -> Vec<IndexMap<String, String>> {
        self.output
            .into_iter()
            .map(|row| row.into_iter().map(|(k, v)| (k, cell_text(v))).collect())
            .collect()
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// A batch that did not produce output
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Zero-based batch position
    pub batch: usize,
    /// Number of records in the batch
    pub records: usize,
    /// HTTP status when the service answered
    pub status: Option<u16>,
    pub message: String,
}

/// Outcome of a batched match run
#[derive(Debug, Clone, Default)]
pub struct MatchRun {
    /// Matched rows of all successful batches, in batch order
    pub rows: Vec<IndexMap<String, String>>,
    pub batches: usize,
    pub failures: Vec<BatchFailure>,
}

impl MatchRun {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Match `records` in chunks of at most `settings.batch_size` (capped at 500).
///
/// Only serialization errors abort the run; transport and API errors are
/// recorded per batch.
pub async fn match_in_batches<M, T>(
    matcher: &M,
    record_type: RecordType,
    records: &[T],
    settings: &MatchSettings,
) -> BoardnetResult<MatchRun>
where
    M: RecordMatcher + ?Sized,
    T: Serialize,
{
    let batch_size = settings.effective_batch_size();
    let delay = settings.request_delay();
    let mut run = MatchRun::default();

    for (batch, chunk) in records.chunks(batch_size).enumerate() {
        if batch > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        run.batches += 1;

        let csv = to_csv_string(chunk)?;
        match matcher.match_batch(record_type, csv).await {
            Ok(response) => {
                let rows = response.into_rows();
                info!(
                    "{} batch {}: {} records sent, {} rows returned",
                    record_type,
                    batch,
                    chunk.len(),
                    rows.len()
                );
                run.rows.extend(rows);
            }
            Err(e) => {
                let status = match &e {
                    BoardnetError::MatchApi { status, .. } => Some(*status),
                    _ => None,
                };
                warn!(
                    "{} batch {} ({} records) failed with status {:?}: {}",
                    record_type,
                    batch,
                    chunk.len(),
                    status,
                    e
                );
                run.failures.push(BatchFailure {
                    batch,
                    records: chunk.len(),
                    status,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(run)
}
