//! Boardnet CLI: runs the board interlock pipeline stage by stage

use anyhow::{bail, Context};
use boardnet::matching::{MatchRun, PermIdMatcher};
use boardnet::pipeline::{self, AnalysisOutput};
use boardnet::PipelineConfig;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boardnet", version, about = "Board interlock network analysis")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "BOARDNET_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the pipeline tables (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Minimum match score for board affiliations (exclusive)
    #[arg(long, global = true)]
    min_score: Option<f64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Match companies against the record-matching service
    MatchCompanies,
    /// Match board members against the record-matching service
    MatchPeople,
    /// Build the node list from matched companies
    Nodes,
    /// Build the weighted edge list from matched board members
    Edges,
    /// Assemble the graph, compute metrics and write the report
    Analyze {
        /// Output format for the summary
        #[arg(long, default_value = "table")]
        format: OutputFormat,

        /// Skip betweenness centrality
        #[arg(long)]
        no_betweenness: bool,

        /// Normalize betweenness into [0, 1]
        #[arg(long)]
        normalized: bool,

        /// Also write a Graphviz file
        #[arg(long)]
        dot: bool,

        /// Companies per ranking
        #[arg(long)]
        top: Option<usize>,
    },
    /// Run nodes, edges and analyze in sequence
    Run {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("boardnet={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(score) = cli.min_score {
        config.min_match_score = score;
    }
    config.validate()?;
    Ok(config.with_env())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::MatchCompanies => {
            let matcher = PermIdMatcher::new(&config.matching)?;
            let run = pipeline::match_companies_stage(&config, &matcher).await?;
            print_match_run("Organization", &run)
        }
        Commands::MatchPeople => {
            let matcher = PermIdMatcher::new(&config.matching)?;
            let run = pipeline::match_people_stage(&config, &matcher).await?;
            print_match_run("Person", &run)
        }
        Commands::Nodes => {
            let outcome = pipeline::build_nodes_stage(&config)?;
            println!("Nodes:           {}", outcome.nodes.len());
            println!("Unmatched rows:  {}", outcome.unmatched);
            println!("Duplicate rows:  {}", outcome.duplicates);
            println!("Without detail:  {}", outcome.missing_detail);
            Ok(())
        }
        Commands::Edges => {
            let out = pipeline::build_edges_stage(&config)?;
            println!("Affiliations:    {} accepted", out.affiliations.accepted);
            println!("Low confidence:  {}", out.affiliations.low_confidence);
            println!("Malformed:       {}", out.affiliations.malformed);
            println!("Persons:         {} ({} on multiple boards)", out.summary.persons, out.summary.contributing_persons);
            println!("Edges:           {}", out.edges.len());
            Ok(())
        }
        Commands::Analyze { format, no_betweenness, normalized, dot, top } => {
            apply_analyze_flags(&mut config, no_betweenness, normalized, dot, top);
            let output = pipeline::analyze_stage(&config)?;
            print_analysis(&output, &format)
        }
        Commands::Run { format } => {
            let output = pipeline::run_offline(&config)?;
            print_analysis(&output, &format)
        }
    }
}

/// Flags only switch settings on (or off, for `--no-betweenness`); absent
/// flags leave the configured values alone.
fn apply_analyze_flags(
    config: &mut PipelineConfig,
    no_betweenness: bool,
    normalized: bool,
    dot: bool,
    top: Option<usize>,
) {
    if no_betweenness {
        config.metrics.options.betweenness = false;
    }
    if normalized {
        config.metrics.options.normalized = true;
    }
    if dot {
        config.metrics.export_dot = true;
    }
    if let Some(n) = top {
        config.metrics.top_n = n;
    }
}

fn print_match_run(record_type: &str, run: &MatchRun) -> anyhow::Result<()> {
    println!("{} batches: {}", record_type, run.batches);
    println!("Rows returned: {}", run.rows.len());
    if run.is_complete() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Batch", "Records", "Status", "Error"]);
    for f in &run.failures {
        table.add_row(vec![
            f.batch.to_string(),
            f.records.to_string(),
            f.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            f.message.clone(),
        ]);
    }
    println!("{}", table);
    bail!("{} of {} batches failed", run.failures.len(), run.batches)
}

fn print_analysis(output: &AnalysisOutput, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output.report)?);
        }
        OutputFormat::Table => {
            let s = &output.metrics.summary;
            println!("Companies:          {}", s.nodes);
            println!("Edges:              {}", s.edges);
            println!("Components:         {}", s.components);
            println!("Largest component:  {}", s.largest_component_size);
            println!("Isolated:           {}", s.isolated_nodes);
            match s.diameter {
                Some(d) => println!("Diameter:           {}", d),
                None => println!("Diameter:           n/a"),
            }
            println!();

            if output.report.top_centrality.is_empty() {
                println!("(no companies)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Company", "Sector", "Degree", "Degree_weighted", "Centrality"]);
            for m in &output.report.top_centrality {
                table.add_row(vec![
                    m.label.clone(),
                    m.sector.clone().unwrap_or_default(),
                    m.degree.to_string(),
                    m.degree_weighted.to_string(),
                    format!("{:.3}", m.centrality),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
