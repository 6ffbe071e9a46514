//! Pathfinding algorithms
//!
//! Hop distances (BFS), eccentricity and diameter.

use super::common::{GraphView, NodeId};
use std::collections::VecDeque;

/// Hop distance from `source_idx` to every node; `None` when unreachable.
pub fn bfs_distances(view: &GraphView, source_idx: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; view.node_count];
    let mut queue = VecDeque::new();

    dist[source_idx] = Some(0);
    queue.push_back(source_idx);

    while let Some(u) = queue.pop_front() {
        let d = dist[u].unwrap_or(0);
        for &v in view.neighbors(u) {
            if dist[v].is_none() {
                dist[v] = Some(d + 1);
                queue.push_back(v);
            }
        }
    }

    dist
}

/// Largest finite hop distance from a node (by index)
pub fn eccentricity(view: &GraphView, idx: usize) -> usize {
    bfs_distances(view, idx)
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
}

/// Diameter of a connected node set.
///
/// `members` is expected to be one connected component (e.g. from
/// [`connected_components`](crate::connected_components)); unknown ids are skipped.
/// Returns `None` for an empty set and `Some(0)` for a single node.
pub fn diameter(view: &GraphView, members: &[NodeId]) -> Option<usize> {
    members
        .iter()
        .filter_map(|id| view.node_to_index.get(id))
        .map(|&idx| eccentricity(view, idx))
        .max()
}
