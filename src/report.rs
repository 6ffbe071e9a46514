//! Markdown report over the computed metrics

use crate::graph::BoardGraph;
use crate::metrics::{GraphMetrics, NodeMetrics};
use crate::stats::{degree_distribution, sector_summaries, weight_distribution, Describe, SectorSummary};
use chrono::{DateTime, Utc};
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Everything the report shows, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: crate::metrics::GraphSummary,
    /// Column name -> descriptive statistics
    pub describe: BTreeMap<String, Describe>,
    pub degree_distribution: BTreeMap<usize, usize>,
    pub weight_distribution: BTreeMap<u32, usize>,
    pub sectors: Vec<SectorSummary>,
    pub top_degree: Vec<NodeMetrics>,
    pub top_centrality: Vec<NodeMetrics>,
}

fn markdown_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(header.to_vec());
    table
}

impl Report {
    pub fn build(graph: &BoardGraph, metrics: &GraphMetrics, top_n: usize) -> Self {
        let mut describe = BTreeMap::new();
        let columns: [(&str, Vec<f64>); 3] = [
            ("Degree", metrics.nodes.iter().map(|m| m.degree as f64).collect()),
            (
                "Degree_weighted",
                metrics.nodes.iter().map(|m| m.degree_weighted as f64).collect(),
            ),
            ("Centrality", metrics.nodes.iter().map(|m| m.centrality).collect()),
        ];
        for (name, values) in columns {
            if let Some(d) = Describe::from_values(values) {
                describe.insert(name.to_string(), d);
            }
        }
        if let Some(d) = Describe::from_values(graph.edges().iter().map(|e| f64::from(e.weight))) {
            describe.insert("Weight".to_string(), d);
        }

        Report {
            generated_at: Utc::now(),
            summary: metrics.summary.clone(),
            describe,
            degree_distribution: degree_distribution(metrics),
            weight_distribution: weight_distribution(graph),
            sectors: sector_summaries(graph, metrics),
            top_degree: metrics.top_by_degree(top_n).into_iter().cloned().collect(),
            top_centrality: metrics.top_by_centrality(top_n).into_iter().cloned().collect(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        let _ = writeln!(out, "# Board interlock network\n");
        let _ = writeln!(out, "Generated {}\n", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));

        let _ = writeln!(out, "## Overview\n");
        let mut overview = markdown_table(&["Measure", "Value"]);
        let same_share = if s.edges > 0 {
            format!("{} ({:.1}%)", s.same_sector_edges, 100.0 * s.same_sector_edges as f64 / s.edges as f64)
        } else {
            "0".to_string()
        };
        overview.add_row(vec!["Companies".to_string(), s.nodes.to_string()]);
        overview.add_row(vec!["Edges".to_string(), s.edges.to_string()]);
        overview.add_row(vec!["Shared seats (total weight)".to_string(), s.total_weight.to_string()]);
        overview.add_row(vec!["Density".to_string(), format!("{:.4}", s.density)]);
        overview.add_row(vec!["Connected components".to_string(), s.components.to_string()]);
        overview.add_row(vec!["Largest component".to_string(), s.largest_component_size.to_string()]);
        overview.add_row(vec!["Isolated companies".to_string(), s.isolated_nodes.to_string()]);
        overview.add_row(vec![
            "Diameter (largest component)".to_string(),
            s.diameter.map(|d| d.to_string()).unwrap_or_else(|| "n/a".to_string()),
        ]);
        overview.add_row(vec!["Same-sector edges".to_string(), same_share]);
        let _ = writeln!(out, "{}\n", overview);

        if !self.describe.is_empty() {
            let _ = writeln!(out, "## Descriptive statistics\n");
            let mut table = markdown_table(&["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
            for (name, d) in &self.describe {
                table.add_row(vec![
                    name.clone(),
                    d.count.to_string(),
                    format!("{:.3}", d.mean),
                    format!("{:.3}", d.std),
                    format!("{:.3}", d.min),
                    format!("{:.3}", d.p25),
                    format!("{:.3}", d.median),
                    format!("{:.3}", d.p75),
                    format!("{:.3}", d.max),
                ]);
            }
            let _ = writeln!(out, "{}\n", table);
        }

        let _ = writeln!(out, "## Degree distribution\n");
        let mut table = markdown_table(&["Degree", "Companies"]);
        for (degree, count) in &self.degree_distribution {
            table.add_row(vec![degree.to_string(), count.to_string()]);
        }
        let _ = writeln!(out, "{}\n", table);

        if !self.weight_distribution.is_empty() {
            let _ = writeln!(out, "## Edge weight distribution\n");
            let mut table = markdown_table(&["Shared members", "Edges"]);
            for (weight, count) in &self.weight_distribution {
                table.add_row(vec![weight.to_string(), count.to_string()]);
            }
            let _ = writeln!(out, "{}\n", table);
        }

        let _ = writeln!(out, "## Sectors\n");
        let mut table = markdown_table(&["Sector", "Companies", "Edges within", "Mean degree"]);
        for sector in &self.sectors {
            table.add_row(vec![
                sector.sector.clone(),
                sector.companies.to_string(),
                sector.edges_within.to_string(),
                format!("{:.2}", sector.mean_degree),
            ]);
        }
        let _ = writeln!(out, "{}\n", table);

        let _ = writeln!(out, "## Most connected companies\n");
        let _ = writeln!(out, "{}\n", node_table(&self.top_degree));

        let _ = writeln!(out, "## Most central companies\n");
        let _ = writeln!(out, "{}", node_table(&self.top_centrality));

        out
    }
}

fn node_table(nodes: &[NodeMetrics]) -> Table {
    let mut table = markdown_table(&["Company", "Symbol", "Sector", "Degree", "Degree_weighted", "Centrality"]);
    for m in nodes {
        table.add_row(vec![
            m.label.clone(),
            m.symbol.clone().unwrap_or_default(),
            m.sector.clone().unwrap_or_default(),
            m.degree.to_string(),
            m.degree_weighted.to_string(),
            format!("{:.3}", m.centrality),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsOptions;
    use crate::model::{Company, EdgeRow};

    #[test]
    fn test_report_sections() {
        let graph = BoardGraph::assemble(
            vec![
                Company::new("X", "Xylo").with_sector("Banks"),
                Company::new("Y", "Yarn").with_sector("Banks"),
                Company::new("Z", "Zeta"),
            ],
            vec![EdgeRow::new("X", "Y", 2)],
        )
        .unwrap();
        let metrics = GraphMetrics::compute(&graph, &MetricsOptions::default());
        let report = Report::build(&graph, &metrics, 2);

        assert_eq!(report.top_degree.len(), 2);
        assert_eq!(report.degree_distribution[&1], 2);
        assert_eq!(report.degree_distribution[&0], 1);
        assert_eq!(report.sectors[0].sector, "Banks");
        assert_eq!(report.sectors[0].edges_within, 1);

        let md = report.to_markdown();
        assert!(md.contains("## Overview"));
        assert!(md.contains("## Sectors"));
        assert!(md.contains("Xylo"));
        assert!(md.contains("1 (100.0%)"));
    }
}
