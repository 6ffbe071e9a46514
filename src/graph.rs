//! Graph assembly
//!
//! Combines the node list and edge list into one undirected weighted graph.
//! Both inputs are canonicalised (nodes by ID, edges by `(V1, V2)`) so every
//! derived value is independent of input row order.

use crate::error::{BoardnetError, BoardnetResult};
use crate::model::{non_empty, Company, CompanyId, EdgeRow};
use boardnet_graph_algorithms::{GraphView, NodeId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Sector key used for companies without a sector
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// An edge of the assembled graph (edge metrics row)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    #[serde(rename = "V1")]
    pub v1: CompanyId,
    #[serde(rename = "V2")]
    pub v2: CompanyId,
    #[serde(rename = "Weight")]
    pub weight: u32,
    /// Both endpoints carry the same (known) sector
    pub nodes_same_sector: bool,
}

/// Undirected company graph
#[derive(Debug, Clone)]
pub struct BoardGraph {
    companies: Vec<Company>,
    index: HashMap<CompanyId, usize>,
    edges: Vec<GraphEdge>,
    weighted_degree: Vec<u64>,
    view: GraphView,
}

fn same_sector(a: &Company, b: &Company) -> bool {
    match (non_empty(&a.sector), non_empty(&b.sector)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl BoardGraph {
    /// Assemble a graph from node and edge rows.
    ///
    /// Fails on a duplicate node ID, on an edge endpoint that is not a node,
    /// and on self-loops, zero weights or repeated pairs.
    pub fn assemble(mut companies: Vec<Company>, edges: Vec<EdgeRow>) -> BoardnetResult<Self> {
        companies.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index = HashMap::with_capacity(companies.len());
        for (idx, company) in companies.iter().enumerate() {
            if index.insert(company.id.clone(), idx).is_some() {
                return Err(BoardnetError::DuplicateNode(company.id.to_string()));
            }
        }

        let mut canonical: Vec<(usize, usize, u32)> = Vec::with_capacity(edges.len());
        for edge in &edges {
            let invalid = |reason: &str| BoardnetError::InvalidEdge {
                v1: edge.v1.to_string(),
                v2: edge.v2.to_string(),
                reason: reason.to_string(),
            };
            let unknown = |missing: &CompanyId| BoardnetError::UnknownNode {
                v1: edge.v1.to_string(),
                v2: edge.v2.to_string(),
                missing: missing.to_string(),
            };

            if edge.v1 == edge.v2 {
                return Err(invalid("self-loop"));
            }
            if edge.weight == 0 {
                return Err(invalid("weight must be at least 1"));
            }
            let a = *index.get(&edge.v1).ok_or_else(|| unknown(&edge.v1))?;
            let b = *index.get(&edge.v2).ok_or_else(|| unknown(&edge.v2))?;
            canonical.push((a.min(b), a.max(b), edge.weight));
        }

        canonical.sort_unstable();
        if let Some(w) = canonical.windows(2).find(|w| w[0].0 == w[1].0 && w[0].1 == w[1].1) {
            return Err(BoardnetError::InvalidEdge {
                v1: companies[w[0].0].id.to_string(),
                v2: companies[w[0].1].id.to_string(),
                reason: "duplicate edge row".to_string(),
            });
        }

        let n = companies.len();
        let mut weighted_degree = vec![0u64; n];
        let mut graph_edges = Vec::with_capacity(canonical.len());
        let mut view_edges = Vec::with_capacity(canonical.len());

        for &(a, b, weight) in &canonical {
            weighted_degree[a] += u64::from(weight);
            weighted_degree[b] += u64::from(weight);
            graph_edges.push(GraphEdge {
                v1: companies[a].id.clone(),
                v2: companies[b].id.clone(),
                weight,
                nodes_same_sector: same_sector(&companies[a], &companies[b]),
            });
            view_edges.push((a, b));
        }

        let view = GraphView::from_undirected_edges((0..n as NodeId).collect(), &view_edges);

        Ok(BoardGraph {
            companies,
            index,
            edges: graph_edges,
            weighted_degree,
            view,
        })
    }

    pub fn node_count(&self) -> usize {
        self.companies.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Companies in ID order; position equals the algorithm node ID
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// Edges in `(V1, V2)` order
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn company(&self, id: &CompanyId) -> Option<&Company> {
        self.index.get(id).map(|&idx| &self.companies[idx])
    }

    pub fn index_of(&self, id: &CompanyId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Number of incident edges
    pub fn degree(&self, id: &CompanyId) -> Option<usize> {
        self.index_of(id).map(|idx| self.view.degree(idx))
    }

    /// Sum of incident edge weights
    pub fn weighted_degree(&self, id: &CompanyId) -> Option<u64> {
        self.index_of(id).map(|idx| self.weighted_degree[idx])
    }

    pub(crate) fn degree_at(&self, idx: usize) -> usize {
        self.view.degree(idx)
    }

    pub(crate) fn weighted_degree_at(&self, idx: usize) -> u64 {
        self.weighted_degree[idx]
    }

    /// Adjacent companies in ID order
    pub fn neighbors(&self, id: &CompanyId) -> Vec<&CompanyId> {
        match self.index_of(id) {
            Some(idx) => self
                .view
                .neighbors(idx)
                .iter()
                .map(|&n| &self.companies[n].id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Algorithm view; node IDs are positions in [`companies`](Self::companies)
    pub fn view(&self) -> &GraphView {
        &self.view
    }

    /// Companies grouped by sector (missing sectors under [`UNKNOWN_SECTOR`])
    pub fn companies_by_sector(&self) -> BTreeMap<&str, Vec<&Company>> {
        let mut groups: BTreeMap<&str, Vec<&Company>> = BTreeMap::new();
        for company in &self.companies {
            let sector = non_empty(&company.sector).unwrap_or(UNKNOWN_SECTOR);
            groups.entry(sector).or_default().push(company);
        }
        groups
    }

    /// Graphviz rendering: pen width follows weight, cross-sector edges dashed.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("graph boards {\n    node [shape=ellipse];\n");
        for company in &self.companies {
            let _ = writeln!(
                out,
                "    \"{}\" [label=\"{}\", sector=\"{}\"];",
                dot_escape(company.id.as_str()),
                dot_escape(&company.label),
                dot_escape(company.sector.as_deref().unwrap_or(UNKNOWN_SECTOR)),
            );
        }
        for edge in &self.edges {
            let style = if edge.nodes_same_sector { "solid" } else { "dashed" };
            let _ = writeln!(
                out,
                "    \"{}\" -- \"{}\" [weight={}, penwidth={}, style={}];",
                dot_escape(edge.v1.as_str()),
                dot_escape(edge.v2.as_str()),
                edge.weight,
                edge.weight,
                style
            );
        }
        out.push_str("}\n");
        out
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
