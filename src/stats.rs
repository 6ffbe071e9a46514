//! Descriptive statistics over metric columns

use crate::graph::{BoardGraph, UNKNOWN_SECTOR};
use crate::metrics::GraphMetrics;
use crate::model::non_empty;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Summary of a numeric sample: count, mean, sample standard deviation,
/// min, quartiles and max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Describe {
    /// `None` for an empty sample. NaN values are ignored.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Describe {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty sample.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Number of companies per degree value
pub fn degree_distribution(metrics: &GraphMetrics) -> BTreeMap<usize, usize> {
    let mut dist = BTreeMap::new();
    for node in &metrics.nodes {
        *dist.entry(node.degree).or_insert(0) += 1;
    }
    dist
}

/// Number of edges per weight value
pub fn weight_distribution(graph: &BoardGraph) -> BTreeMap<u32, usize> {
    let mut dist = BTreeMap::new();
    for edge in graph.edges() {
        *dist.entry(edge.weight).or_insert(0) += 1;
    }
    dist
}

/// Per-sector aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub companies: usize,
    /// Edges with both endpoints in this sector
    pub edges_within: usize,
    pub mean_degree: f64,
}

/// Sector breakdown, largest sectors first (ties by name).
pub fn sector_summaries(graph: &BoardGraph, metrics: &GraphMetrics) -> Vec<SectorSummary> {
    let mut within: HashMap<&str, usize> = HashMap::new();
    for edge in graph.edges().iter().filter(|e| e.nodes_same_sector) {
        if let Some(sector) = graph.company(&edge.v1).and_then(|c| non_empty(&c.sector)) {
            *within.entry(sector).or_insert(0) += 1;
        }
    }

    let mut degrees: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for node in &metrics.nodes {
        let sector = non_empty(&node.sector).unwrap_or(UNKNOWN_SECTOR);
        degrees.entry(sector).or_default().push(node.degree);
    }

    let mut out: Vec<SectorSummary> = degrees
        .into_iter()
        .map(|(sector, ds)| SectorSummary {
            sector: sector.to_string(),
            companies: ds.len(),
            edges_within: within.get(sector).copied().unwrap_or(0),
            mean_degree: ds.iter().sum::<usize>() as f64 / ds.len() as f64,
        })
        .collect();
    out.sort_by(|a, b| b.companies.cmp(&a.companies).then_with(|| a.sector.cmp(&b.sector)));
    out
}
