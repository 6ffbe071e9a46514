//! Error types for boardnet

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline stages
#[derive(Error, Debug)]
pub enum BoardnetError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV file could not be read or written
    #[error("CSV error in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV error without an associated file (in-memory buffers)
    #[error("CSV error: {0}")]
    CsvBuffer(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Match API answered with a non-success status
    #[error("Match API returned status {status}: {body}")]
    MatchApi { status: u16, body: String },

    /// An edge refers to a company that is not in the node list
    #[error("Edge ({v1}, {v2}) references unknown node {missing}")]
    UnknownNode {
        v1: String,
        v2: String,
        missing: String,
    },

    /// The node list contains the same ID twice
    #[error("Duplicate node ID {0} in node list")]
    DuplicateNode(String),

    /// Edge row violates the edge list invariants
    #[error("Invalid edge ({v1}, {v2}): {reason}")]
    InvalidEdge {
        v1: String,
        v2: String,
        reason: String,
    },

    /// Record rejected at the input boundary
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<serde_yaml::Error> for BoardnetError {
    fn from(e: serde_yaml::Error) -> Self {
        BoardnetError::Config(e.to_string())
    }
}

pub type BoardnetResult<T> = Result<T, BoardnetError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_csv_error_names_path_once() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = BoardnetError::Csv {
            path: PathBuf::from("data/edges.csv"),
            source: csv::Error::from(io),
        };

        assert_eq!(err.to_string(), "CSV error in data/edges.csv");
        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(cause.contains("gone"));
        assert!(!err.to_string().contains("gone"));
    }
}
