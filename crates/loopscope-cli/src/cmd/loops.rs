//! `cld loops`: list every feedback loop of a diagram.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use loopscope_core::analysis::LoopRow;
use loopscope_core::config::AnalysisConfig;
use loopscope_core::loops::LoopSummary;
use loopscope_core::{Analysis, LoopKind};
use serde::Serialize;

use crate::cmd::load_graph;
use crate::input::InputFormat;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    Reinforcing,
    Balancing,
}

impl KindFilter {
    const fn matches(self, kind: LoopKind) -> bool {
        matches!(
            (self, kind),
            (Self::Reinforcing, LoopKind::Reinforcing) | (Self::Balancing, LoopKind::Balancing)
        )
    }
}

/// Arguments for `cld loops`.
#[derive(Args, Debug)]
pub struct LoopsArgs {
    /// Diagram file (adjacency matrix or edge list CSV).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Only list loops of this type.
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    pub kind: Option<KindFilter>,
}

#[derive(Debug, Serialize)]
struct LoopsOutput<'a> {
    summary: &'a LoopSummary,
    loops: Vec<&'a LoopRow>,
}

/// Execute `cld loops`.
pub fn run_loops(args: &LoopsArgs, output: OutputMode, config: &AnalysisConfig) -> Result<()> {
    let graph = load_graph(&args.input, args.input_format)?;
    let report = Analysis::run(&graph, config)
        .context("analysis failed")?
        .report(&graph);

    let payload = LoopsOutput {
        summary: &report.summary,
        loops: report
            .loops
            .iter()
            .filter(|row| args.kind.is_none_or(|kind| kind.matches(row.kind)))
            .collect(),
    };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &LoopsOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &payload.loops {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            row.id,
            row.size,
            row.kind,
            row.members.join(";")
        )?;
    }
    Ok(())
}

fn render_pretty(payload: &LoopsOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Feedback loops")?;
    pretty_kv(w, "Total", payload.summary.total.to_string())?;
    pretty_kv(w, "Reinforcing", payload.summary.reinforcing.to_string())?;
    pretty_kv(w, "Balancing", payload.summary.balancing.to_string())?;

    if payload.loops.is_empty() {
        writeln!(w)?;
        writeln!(w, "No feedback loops found.")?;
        return Ok(());
    }

    writeln!(w)?;
    for row in &payload.loops {
        writeln!(
            w,
            "  {:<5} {:<12} size {:<3} {}",
            row.id.to_string(),
            row.kind.as_str(),
            row.size,
            row.description
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LoopsArgs,
    }

    #[test]
    fn type_filter_parses() {
        let parsed = Wrapper::parse_from(["test", "d.csv", "--type", "balancing"]);
        assert_eq!(parsed.args.kind, Some(KindFilter::Balancing));
    }

    #[test]
    fn filter_matches_kind() {
        assert!(KindFilter::Balancing.matches(LoopKind::Balancing));
        assert!(!KindFilter::Balancing.matches(LoopKind::Reinforcing));
        assert!(KindFilter::Reinforcing.matches(LoopKind::Reinforcing));
    }
}
