//! Betweenness centrality
//!
//! Brandes (2001) over unweighted shortest paths. Each source is an
//! independent BFS + dependency accumulation, so sources are processed in
//! parallel and summed afterwards in source order.

use super::common::{GraphView, NodeId};
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Betweenness configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweennessConfig {
    /// Scale by `2 / ((n-1)(n-2))` so scores fall in `[0, 1]`
    pub normalized: bool,
}

/// Calculate betweenness centrality for every node of the view.
///
/// Scores count each unordered pair `{s, t}` once; when several shortest
/// paths exist, credit is split evenly between them.
pub fn betweenness_centrality(
    view: &GraphView,
    config: BetweennessConfig,
) -> HashMap<NodeId, f64> {
    let n = view.node_count;

    if n == 0 {
        return HashMap::new();
    }

    let partials: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|s| single_source_dependency(view, s))
        .collect();

    let mut scores = vec![0.0; n];
    for delta in &partials {
        for (score, d) in scores.iter_mut().zip(delta) {
            *score += d;
        }
    }

    // Undirected graph: every pair was seen from both ends
    let mut scale = 0.5;
    if config.normalized && n > 2 {
        scale *= 2.0 / ((n - 1) * (n - 2)) as f64;
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (view.index_to_node[idx], score * scale))
        .collect()
}

/// Dependency of `s` on every other node (Brandes' delta).
fn single_source_dependency(view: &GraphView, s: usize) -> Vec<f64> {
    let n = view.node_count;

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<i64> = vec![-1; n];
    let mut queue = VecDeque::new();

    sigma[s] = 1.0;
    dist[s] = 0;
    queue.push_back(s);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for &w in view.neighbors(v) {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
        }
    }
    delta[s] = 0.0;
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_star() {
        // Center 0 with leaves 1..=4: every leaf pair routes through the center
        let view = GraphView::from_undirected_edges(
            vec![0, 1, 2, 3, 4],
            &[(0, 1), (0, 2), (0, 3), (0, 4)],
        );

        let bc = betweenness_centrality(&view, BetweennessConfig::default());
        assert_close(bc[&0], 6.0);
        for leaf in 1..=4 {
            assert_close(bc[&leaf], 0.0);
        }

        let normalized = betweenness_centrality(&view, BetweennessConfig { normalized: true });
        assert_close(normalized[&0], 1.0);
    }

    #[test]
    fn test_split_credit() {
        // Square 0-1-3, 0-2-3: two shortest paths between 0 and 3
        let view = GraphView::from_undirected_edges(
            vec![0, 1, 2, 3],
            &[(0, 1), (1, 3), (0, 2), (2, 3)],
        );

        let bc = betweenness_centrality(&view, BetweennessConfig::default());
        for id in 0..4 {
            assert_close(bc[&id], 0.5);
        }
    }

    #[test]
    fn test_isolated_and_path() {
        // 0 - 1 - 2, 3 isolated
        let view = GraphView::from_undirected_edges(vec![0, 1, 2, 3], &[(0, 1), (1, 2)]);
        let bc = betweenness_centrality(&view, BetweennessConfig::default());
        assert_close(bc[&1], 1.0);
        assert_close(bc[&0], 0.0);
        assert_close(bc[&3], 0.0);
    }

    #[test]
    fn test_empty() {
        let view = GraphView::from_undirected_edges(vec![], &[]);
        assert!(betweenness_centrality(&view, BetweennessConfig::default()).is_empty());
    }
}
