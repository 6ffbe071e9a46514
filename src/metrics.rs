//! Graph metrics
//!
//! Per-node degree, weighted degree and betweenness centrality, plus
//! whole-graph component and diameter figures. Diameter is reported for the
//! largest connected component only; a disconnected graph has no finite
//! diameter of its own.

use crate::graph::BoardGraph;
use crate::model::CompanyId;
use boardnet_graph_algorithms::{betweenness_centrality, connected_components, diameter, BetweennessConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Which optional metrics to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsOptions {
    /// Compute betweenness centrality (otherwise every node reports 0)
    pub betweenness: bool,
    /// Scale betweenness into `[0, 1]`
    pub normalized: bool,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            betweenness: true,
            normalized: false,
        }
    }
}

/// Metrics of a single company (node metrics row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    #[serde(rename = "ID")]
    pub id: CompanyId,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Degree")]
    pub degree: usize,
    #[serde(rename = "Degree_weighted")]
    pub degree_weighted: u64,
    #[serde(rename = "Centrality")]
    pub centrality: f64,
    /// Position of the node's component (0 = largest)
    #[serde(rename = "Component")]
    pub component: usize,
}

/// Whole-graph figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub total_weight: u64,
    pub components: usize,
    pub largest_component_size: usize,
    pub isolated_nodes: usize,
    /// Diameter of the largest component; `None` for an empty graph
    pub diameter: Option<usize>,
    pub density: f64,
    pub same_sector_edges: usize,
}

/// All computed metrics of a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// In company ID order
    pub nodes: Vec<NodeMetrics>,
    pub summary: GraphSummary,
}

impl GraphMetrics {
    pub fn compute(graph: &BoardGraph, options: &MetricsOptions) -> Self {
        let view = graph.view();
        let n = graph.node_count();

        let components = connected_components(view);
        let largest = components.largest().unwrap_or(&[]);
        let diameter = diameter(view, largest);
        debug!(
            "{} components, largest has {} nodes, diameter {:?}",
            components.component_count(),
            largest.len(),
            diameter
        );

        let centrality = if options.betweenness {
            Some(betweenness_centrality(
                view,
                BetweennessConfig {
                    normalized: options.normalized,
                },
            ))
        } else {
            None
        };

        let nodes: Vec<NodeMetrics> = graph
            .companies()
            .iter()
            .enumerate()
            .map(|(idx, company)| {
                let node = view.index_to_node[idx];
                NodeMetrics {
                    id: company.id.clone(),
                    label: company.label.clone(),
                    symbol: company.symbol.clone(),
                    sector: company.sector.clone(),
                    degree: graph.degree_at(idx),
                    degree_weighted: graph.weighted_degree_at(idx),
                    centrality: centrality
                        .as_ref()
                        .and_then(|c| c.get(&node).copied())
                        .unwrap_or(0.0),
                    component: components.node_component.get(&node).copied().unwrap_or(0),
                }
            })
            .collect();

        let density = if n > 1 {
            2.0 * graph.edge_count() as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };

        let summary = GraphSummary {
            nodes: n,
            edges: graph.edge_count(),
            total_weight: graph.total_weight(),
            components: components.component_count(),
            largest_component_size: largest.len(),
            isolated_nodes: components.isolated_count(),
            diameter,
            density,
            same_sector_edges: graph.edges().iter().filter(|e| e.nodes_same_sector).count(),
        };

        info!(
            "Metrics: {} nodes, {} edges, {} components (largest {}), diameter {:?}",
            summary.nodes, summary.edges, summary.components, summary.largest_component_size, summary.diameter
        );

        GraphMetrics { nodes, summary }
    }

    pub fn node(&self, id: &CompanyId) -> Option<&NodeMetrics> {
        self.nodes
            .binary_search_by(|m| m.id.cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// Highest degree first; ties by weighted degree, then ID
    pub fn top_by_degree(&self, n: usize) -> Vec<&NodeMetrics> {
        let mut ranked: Vec<&NodeMetrics> = self.nodes.iter().collect();
        ranked.sort_by(|a, b| {
            b.degree
                .cmp(&a.degree)
                .then(b.degree_weighted.cmp(&a.degree_weighted))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(n);
        ranked
    }

    /// Highest centrality first; ties by ID
    pub fn top_by_centrality(&self, n: usize) -> Vec<&NodeMetrics> {
        let mut ranked: Vec<&NodeMetrics> = self.nodes.iter().collect();
        ranked.sort_by(|a, b| {
            b.centrality
                .partial_cmp(&a.centrality)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(n);
        ranked
    }
}
