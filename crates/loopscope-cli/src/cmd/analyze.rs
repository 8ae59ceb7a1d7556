//! `cld analyze`: find feedback loops, score concepts and export the results.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use loopscope_core::config::AnalysisConfig;
use loopscope_core::graph::GraphStats;
use loopscope_core::loops::LoopSummary;
use loopscope_core::{Analysis, AnalysisError, LoopOrder, RankedConcept};
use serde::Serialize;
use tracing::info;

use crate::cmd::load_graph;
use crate::export::{DEFAULT_PREFIX, write_exports};
use crate::input::InputFormat;
use crate::output::{
    CliError, OutputMode, format_score, pretty_kv, pretty_section, render_error, render_mode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Score larger loops first.
    LargestFirst,
    /// Score smaller loops first.
    SmallestFirst,
}

impl From<OrderArg> for LoopOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::LargestFirst => Self::LargestFirst,
            OrderArg::SmallestFirst => Self::SmallestFirst,
        }
    }
}

/// Arguments for `cld analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Diagram file (adjacency matrix or edge list CSV).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Prefix for the exported files.
    #[arg(short, long, value_name = "PREFIX", default_value = DEFAULT_PREFIX)]
    pub output: String,

    /// Number of concepts to show (overrides `[report] top`).
    #[arg(long)]
    pub top: Option<usize>,

    /// Loop order for scoring (overrides `[scoring] order`).
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Abort when the search finds more loops than this.
    #[arg(long, value_name = "N")]
    pub max_loops: Option<usize>,

    /// Print the summary without writing any files.
    #[arg(long)]
    pub no_export: bool,
}

impl AnalyzeArgs {
    fn apply(&self, config: &AnalysisConfig) -> AnalysisConfig {
        let mut config = config.clone();
        if let Some(top) = self.top {
            config.report.top = top;
        }
        if let Some(order) = self.order {
            config.scoring.order = order.into();
        }
        if self.max_loops.is_some() {
            config.search.max_loops = self.max_loops;
        }
        config
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    input: String,
    fingerprint: &'a str,
    order: &'static str,
    stats: &'a GraphStats,
    summary: &'a LoopSummary,
    top: &'a [RankedConcept],
    files: Vec<String>,
}

/// Execute `cld analyze`.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode, config: &AnalysisConfig) -> Result<()> {
    let config = args.apply(config);
    let graph = load_graph(&args.input, args.input_format)?;

    let analysis = match Analysis::run(&graph, &config) {
        Ok(analysis) => analysis,
        Err(err @ AnalysisError::LoopLimitExceeded { .. }) => {
            render_error(
                output,
                &CliError::with_details(
                    err.to_string(),
                    "raise --max-loops or remove the limit from loopscope.toml",
                    "loop_limit_exceeded",
                ),
            )?;
            return Err(err.into());
        }
        Err(err) => return Err(anyhow::Error::new(err).context("analysis failed")),
    };
    let report = analysis.report(&graph);

    let files = if args.no_export {
        Vec::new()
    } else {
        write_exports(&report, &args.output)?
            .into_iter()
            .map(|path| path.display().to_string())
            .collect()
    };
    info!(
        loops = report.summary.total,
        files = files.len(),
        "analysis complete"
    );

    let payload = AnalyzeOutput {
        input: args.input.display().to_string(),
        fingerprint: &report.fingerprint,
        order: config.scoring.order.as_str(),
        stats: &report.stats,
        summary: &report.summary,
        top: report.top(config.report.top),
        files,
    };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &AnalyzeOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "loops\t{}\treinforcing\t{}\tbalancing\t{}",
        payload.summary.total, payload.summary.reinforcing, payload.summary.balancing
    )?;
    for (rank, concept) in payload.top.iter().enumerate() {
        writeln!(
            w,
            "{}\t{}\t{}",
            rank + 1,
            concept.name,
            format_score(concept.score)
        )?;
    }
    for file in &payload.files {
        writeln!(w, "file\t{file}")?;
    }
    Ok(())
}

fn render_pretty(payload: &AnalyzeOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Loop analysis: {}", payload.input))?;
    pretty_kv(w, "Concepts", payload.stats.concept_count.to_string())?;
    pretty_kv(w, "Links", payload.stats.link_count.to_string())?;
    pretty_kv(
        w,
        "Core concepts",
        payload.stats.core_concept_count.to_string(),
    )?;
    pretty_kv(w, "Loops", payload.summary.total.to_string())?;
    pretty_kv(w, "Reinforcing", payload.summary.reinforcing.to_string())?;
    pretty_kv(w, "Balancing", payload.summary.balancing.to_string())?;
    pretty_kv(w, "Scoring order", payload.order)?;
    pretty_kv(w, "Fingerprint", payload.fingerprint)?;

    if payload.summary.total == 0 {
        writeln!(w)?;
        writeln!(w, "No feedback loops found.")?;
    } else {
        writeln!(w)?;
        writeln!(w, "Loops by size")?;
        for (size, count) in payload.summary.by_size.iter().rev() {
            pretty_kv(w, &format!("size {size}"), count.to_string())?;
        }

        writeln!(w)?;
        writeln!(w, "Top concepts")?;
        for (rank, concept) in payload.top.iter().enumerate() {
            writeln!(
                w,
                "  {:>3}. {:<30} {}",
                rank + 1,
                concept.name,
                format_score(concept.score)
            )?;
        }
    }

    if !payload.files.is_empty() {
        writeln!(w)?;
        writeln!(w, "Exported")?;
        for file in &payload.files {
            writeln!(w, "  {file}")?;
        }
    }
    Ok(())
}
