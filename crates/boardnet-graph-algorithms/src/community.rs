//! Connected components
//!
//! Union-find over the undirected view.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// Result of the connected components algorithm
#[derive(Debug, Clone)]
pub struct ComponentsResult {
    /// Components ordered by size (descending), ties broken by smallest member index.
    /// Members are listed in index order.
    pub components: Vec<Vec<NodeId>>,
    /// Map of NodeId -> position in `components`
    pub node_component: HashMap<NodeId, usize>,
}

impl ComponentsResult {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The largest component, if the graph has any nodes
    pub fn largest(&self) -> Option<&[NodeId]> {
        self.components.first().map(Vec::as_slice)
    }

    /// Number of single-node components
    pub fn isolated_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() == 1).count()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Connected Components
///
/// Finds all maximal sets of mutually reachable nodes.
pub fn connected_components(view: &GraphView) -> ComponentsResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.neighbors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    // Group by root; iterating indices in order keeps members sorted and
    // records each group's first (smallest) index for tie-breaking.
    let mut root_slot: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = uf.find(i);
        let slot = *root_slot.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    // Stable sort keeps first-index order among equally sized groups
    groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut components = Vec::with_capacity(groups.len());
    let mut node_component = HashMap::with_capacity(n);
    for (cid, members) in groups.into_iter().enumerate() {
        let ids: Vec<NodeId> = members.iter().map(|&i| view.index_to_node[i]).collect();
        for &id in &ids {
            node_component.insert(id, cid);
        }
        components.push(ids);
    }

    ComponentsResult {
        components,
        node_component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        // Nodes: 1, 2, 3, 4, 5, 6
        // Edges: 1-2, 3-4-5, 6 (isolated)
        let view = GraphView::from_undirected_edges(
            vec![1, 2, 3, 4, 5, 6],
            &[(0, 1), (2, 3), (3, 4)],
        );

        let result = connected_components(&view);

        assert_eq!(result.component_count(), 3);
        assert_eq!(result.largest(), Some(&[3, 4, 5][..]));
        assert_eq!(result.components[1], vec![1, 2]);
        assert_eq!(result.components[2], vec![6]);
        assert_eq!(result.isolated_count(), 1);

        let c1 = result.node_component[&1];
        let c2 = result.node_component[&2];
        assert_eq!(c1, c2);
        assert_ne!(c1, result.node_component[&3]);
    }

    #[test]
    fn test_equal_size_ties_by_first_index() {
        // 1-2 and 3-4: both size two, component holding index 0 comes first
        let view = GraphView::from_undirected_edges(vec![1, 2, 3, 4], &[(2, 3), (0, 1)]);
        let result = connected_components(&view);
        assert_eq!(result.components, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_empty_graph() {
        let view = GraphView::from_undirected_edges(vec![], &[]);
        let result = connected_components(&view);
        assert_eq!(result.component_count(), 0);
        assert!(result.largest().is_none());
    }
}
