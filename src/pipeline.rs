//! Pipeline stages
//!
//! Each stage reads complete input tables from `data_dir` and writes complete
//! output tables before returning:
//!
//! ```text
//! company details ──match──▶ matched companies ──▶ node list ─┐
//! board members ────match──▶ matched members ───▶ edge list ──┴─▶ metrics + report
//! ```

use crate::affiliation::{collect_from_matches, AffiliationFilter, AffiliationStats};
use crate::config::PipelineConfig;
use crate::edges::{build_edge_list_with_summary, EdgeListSummary};
use crate::error::BoardnetResult;
use crate::graph::BoardGraph;
use crate::matching::{
    listing_uploads, match_in_batches, organization_uploads, person_uploads, MatchRun, RecordMatcher,
    RecordType,
};
use crate::metrics::GraphMetrics;
use crate::model::{
    BoardMemberRow, Company, CompanyDetail, EdgeRow, ListedCompany, MatchedBoardMember, MatchedCompany,
};
use crate::nodes::{build_node_list, NodeListOutcome};
use crate::report::Report;
use crate::table::{read_records, write_dynamic, write_records};
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of the edge list stage
#[derive(Debug, Clone)]
pub struct EdgeStageOutput {
    pub edges: Vec<EdgeRow>,
    pub summary: EdgeListSummary,
    pub affiliations: AffiliationStats,
}

/// Result of the analysis stage
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub graph: BoardGraph,
    pub metrics: GraphMetrics,
    pub report: Report,
}

fn log_match_run(run: &MatchRun, record_type: RecordType) {
    if run.is_complete() {
        info!("{} matching finished: {} batches, {} rows", record_type, run.batches, run.rows.len());
    } else {
        warn!(
            "{} matching finished with {} of {} batches failed; re-run to fill the gaps",
            record_type,
            run.failures.len(),
            run.batches
        );
    }
}

/// Write matched rows unless every batch failed; a previous table is kept then.
fn write_match_output(path: PathBuf, run: &MatchRun) -> BoardnetResult<()> {
    if run.rows.is_empty() && !run.is_complete() {
        warn!("No batch succeeded; leaving {:?} untouched", path);
        return Ok(());
    }
    write_dynamic(path, &run.rows)
}

/// Match companies and write the matched companies table.
///
/// Uses the scraped company details when present, otherwise the listing.
pub async fn match_companies_stage<M>(config: &PipelineConfig, matcher: &M) -> BoardnetResult<MatchRun>
where
    M: RecordMatcher + ?Sized,
{
    let settings = &config.matching;
    let details_path = config.path(&config.files.company_details);

    let uploads = if details_path.exists() {
        let details: Vec<CompanyDetail> = read_records(&details_path)?;
        organization_uploads(&details, &settings.country)
    } else {
        let listed: Vec<ListedCompany> = read_records(config.path(&config.files.company_list))?;
        listing_uploads(&listed, &settings.country)
    };
    info!("Matching {} companies", uploads.len());

    let run = match_in_batches(matcher, RecordType::Organization, &uploads, settings).await?;
    write_match_output(config.path(&config.files.matched_companies), &run)?;
    log_match_run(&run, RecordType::Organization);
    Ok(run)
}

/// Match board members and write the matched board members table.
pub async fn match_people_stage<M>(config: &PipelineConfig, matcher: &M) -> BoardnetResult<MatchRun>
where
    M: RecordMatcher + ?Sized,
{
    let board: Vec<BoardMemberRow> = read_records(config.path(&config.files.board_members))?;
    let details: Vec<CompanyDetail> = read_records(config.path(&config.files.company_details))?;
    let matched: Vec<MatchedCompany> = read_records(config.path(&config.files.matched_companies))?;

    let uploads = person_uploads(&board, &details, &matched);
    info!("Matching {} board members", uploads.records.len());

    let run = match_in_batches(matcher, RecordType::Person, &uploads.records, &config.matching).await?;
    write_match_output(config.path(&config.files.matched_board_members), &run)?;
    log_match_run(&run, RecordType::Person);
    Ok(run)
}

/// Build and write the node list.
pub fn build_nodes_stage(config: &PipelineConfig) -> BoardnetResult<NodeListOutcome> {
    let matched: Vec<MatchedCompany> = read_records(config.path(&config.files.matched_companies))?;
    let details_path = config.path(&config.files.company_details);
    let details: Vec<CompanyDetail> = if details_path.exists() {
        read_records(&details_path)?
    } else {
        warn!("No company details at {:?}; symbols and sectors come from match output only", details_path);
        Vec::new()
    };

    let outcome = build_node_list(&matched, &details);
    write_records(config.path(&config.files.nodes), &outcome.nodes)?;
    Ok(outcome)
}

/// Build and write the edge list.
pub fn build_edges_stage(config: &PipelineConfig) -> BoardnetResult<EdgeStageOutput> {
    let rows: Vec<MatchedBoardMember> = read_records(config.path(&config.files.matched_board_members))?;
    let filter = AffiliationFilter::new(config.min_match_score);
    let affiliations = collect_from_matches(&rows, &filter);

    let (edges, summary) = build_edge_list_with_summary(&affiliations.by_person);
    write_records(config.path(&config.files.edges), &edges)?;

    Ok(EdgeStageOutput {
        edges,
        summary,
        affiliations: affiliations.stats,
    })
}

/// Assemble the graph, compute metrics and write metric tables and the report.
///
/// An edge that references a company missing from the node list aborts the stage.
pub fn analyze_stage(config: &PipelineConfig) -> BoardnetResult<AnalysisOutput> {
    let nodes: Vec<Company> = read_records(config.path(&config.files.nodes))?;
    let edges: Vec<EdgeRow> = read_records(config.path(&config.files.edges))?;
    info!("Assembling graph from {} nodes and {} edges", nodes.len(), edges.len());

    let graph = BoardGraph::assemble(nodes, edges)?;
    let metrics = GraphMetrics::compute(&graph, &config.metrics.options);
    let report = Report::build(&graph, &metrics, config.metrics.top_n);

    write_records(config.path(&config.files.node_metrics), &metrics.nodes)?;
    write_records(config.path(&config.files.edge_metrics), graph.edges())?;
    std::fs::write(config.path(&config.files.report), report.to_markdown())?;
    if config.metrics.export_dot {
        std::fs::write(config.path(&config.files.dot), graph.to_dot())?;
    }
    info!("Analysis written to {:?}", config.data_dir);

    Ok(AnalysisOutput { graph, metrics, report })
}

/// Offline stages in order: nodes, edges, analysis.
pub fn run_offline(config: &PipelineConfig) -> BoardnetResult<AnalysisOutput> {
    build_nodes_stage(config)?;
    build_edges_stage(config)?;
    analyze_stage(config)
}
