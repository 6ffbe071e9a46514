//! Pipeline configuration
//!
//! Every field has a default, so a YAML file only needs the values it changes:
//!
//! ```yaml
//! data_dir: ./data
//! min_match_score: 0.2
//! match:
//!   batch_size: 500
//!   request_delay_ms: 1000
//! metrics:
//!   top_n: 15
//! ```

use crate::affiliation::DEFAULT_MIN_SCORE;
use crate::error::{BoardnetError, BoardnetResult};
use crate::metrics::MetricsOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted when no access token is configured
pub const ACCESS_TOKEN_ENV: &str = "BOARDNET_ACCESS_TOKEN";

/// Upper bound on records per match API request
pub const MAX_BATCH_SIZE: usize = 500;

/// File names of every table, relative to `data_dir`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub company_list: String,
    pub company_details: String,
    pub matched_companies: String,
    pub board_members: String,
    pub matched_board_members: String,
    pub nodes: String,
    pub edges: String,
    pub node_metrics: String,
    pub edge_metrics: String,
    pub report: String,
    pub dot: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            company_list: "companies.csv".to_string(),
            company_details: "company_details.csv".to_string(),
            matched_companies: "matched_companies.csv".to_string(),
            board_members: "board_members.csv".to_string(),
            matched_board_members: "matched_board_members.csv".to_string(),
            nodes: "nodes.csv".to_string(),
            edges: "edges.csv".to_string(),
            node_metrics: "node_metrics.csv".to_string(),
            edge_metrics: "edge_metrics.csv".to_string(),
            report: "report.md".to_string(),
            dot: "graph.dot".to_string(),
        }
    }
}

/// Match API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// File upload endpoint
    pub endpoint: String,
    /// Records per request (at most 500)
    pub batch_size: usize,
    /// Pause between consecutive requests
    pub request_delay_ms: u64,
    pub matches_per_record: u32,
    /// Country sent with organization records
    pub country: String,
    /// Request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api-eit.refinitiv.com/permid/match/file".to_string(),
            batch_size: MAX_BATCH_SIZE,
            request_delay_ms: 1000,
            matches_per_record: 1,
            country: "GB".to_string(),
            timeout_secs: None,
            access_token: None,
        }
    }
}

impl MatchSettings {
    /// Configured batch size clamped into `1..=500`
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Analysis and report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    #[serde(flatten)]
    pub options: MetricsOptions,
    /// Companies listed in each ranking
    pub top_n: usize,
    /// Also write a Graphviz file
    pub export_dot: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            options: MetricsOptions::default(),
            top_n: 10,
            export_dot: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub files: FileNames,
    /// Affiliations at or below this confidence are discarded
    pub min_match_score: f64,
    #[serde(rename = "match")]
    pub matching: MatchSettings,
    pub metrics: ReportSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            files: FileNames::default(),
            min_match_score: DEFAULT_MIN_SCORE,
            matching: MatchSettings::default(),
            metrics: ReportSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document
    pub fn from_yaml(text: &str) -> BoardnetResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> BoardnetResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> BoardnetResult<()> {
        if !(0.0..=1.0).contains(&self.min_match_score) {
            return Err(BoardnetError::Config(format!(
                "min_match_score must be within [0, 1], got {}",
                self.min_match_score
            )));
        }
        if self.matching.batch_size == 0 {
            return Err(BoardnetError::Config("match.batch_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Fill the access token from the environment when not configured
    pub fn with_env(mut self) -> Self {
        if self.matching.access_token.is_none() {
            self.matching.access_token = std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        self
    }

    /// Path of a table inside `data_dir`
    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}
