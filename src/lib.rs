//! Boardnet
//!
//! Builds the network of listed companies connected through shared board
//! members and describes it.
//!
//! # Pipeline
//!
//! 1. **Identity resolution** ([`matching`]) – company and person records are
//!    sent to an external record-matching service in batches of at most 500.
//! 2. **Graph building** ([`nodes`], [`affiliation`], [`edges`]) – matched
//!    companies become nodes; every person on `k >= 2` boards links each pair
//!    of those companies, and an edge's weight is the number of people the
//!    two boards share.
//! 3. **Metrics & reporting** ([`graph`], [`metrics`], [`stats`], [`report`]) –
//!    degree, weighted degree, betweenness centrality, connected components
//!    and the diameter of the largest component.
//!
//! Stages exchange CSV tables ([`table`]) and are wired together in
//! [`pipeline`].
//!
//! ## Example Usage
//!
//! ```rust
//! use boardnet::affiliation::AffiliationMap;
//! use boardnet::edges::build_edge_list;
//! use boardnet::graph::BoardGraph;
//! use boardnet::metrics::{GraphMetrics, MetricsOptions};
//! use boardnet::model::{Company, CompanyId, PersonId};
//!
//! let mut boards = AffiliationMap::new();
//! boards.insert(PersonId::from("ann"), ["X", "Y", "Z"].iter().map(|c| CompanyId::from(*c)).collect());
//! boards.insert(PersonId::from("bob"), ["X", "Y"].iter().map(|c| CompanyId::from(*c)).collect());
//!
//! let edges = build_edge_list(&boards);
//! assert_eq!(edges[0].weight, 2);
//!
//! let nodes = vec![Company::new("X", "Xylo"), Company::new("Y", "Yarn"), Company::new("Z", "Zeta")];
//! let graph = BoardGraph::assemble(nodes, edges).unwrap();
//! let metrics = GraphMetrics::compute(&graph, &MetricsOptions::default());
//! assert_eq!(metrics.summary.components, 1);
//! assert_eq!(metrics.summary.diameter, Some(1));
//! ```

pub mod affiliation;
pub mod config;
pub mod edges;
pub mod error;
pub mod graph;
pub mod matching;
pub mod metrics;
pub mod model;
pub mod nodes;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;

pub use config::PipelineConfig;
pub use error::{BoardnetError, BoardnetResult};
pub use graph::{BoardGraph, GraphEdge};
pub use metrics::{GraphMetrics, GraphSummary, MetricsOptions, NodeMetrics};
pub use model::{Company, CompanyId, EdgeRow, PersonId};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
