//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of an undirected graph for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of an undirected graph in Compressed Sparse Row (CSR) format.
///
/// Every undirected edge `{u, v}` is stored twice: once in the adjacency slice of `u`
/// and once in the adjacency slice of `v`.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices
    pub targets: Vec<usize>,
}

impl GraphView {
    /// Build a view from a list of undirected `(u, v)` edges over dense indices.
    ///
    /// Self-loops are ignored. Neighbor slices are sorted by index so traversal order
    /// does not depend on the order of `edges`.
    pub fn from_undirected_edges(index_to_node: Vec<NodeId>, edges: &[(usize, usize)]) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for &(u, v) in edges {
            if u == v {
                continue;
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::with_capacity(edges.len() * 2);

        offsets.push(0);
        for mut neighbors in adjacency {
            neighbors.sort_unstable();
            targets.extend(neighbors);
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            offsets,
            targets,
        }
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get neighbors of a node
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.targets[self.offsets[idx]..self.offsets[idx + 1]]
    }
}
