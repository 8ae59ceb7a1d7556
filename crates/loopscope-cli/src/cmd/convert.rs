//! `cld convert`: rewrite an adjacency matrix as an edge list.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::export::csv_field;
use crate::input::{Diagram, InputFormat, SkippedEntry, load_diagram};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `cld convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Adjacency matrix CSV.
    #[arg(value_name = "MATRIX")]
    pub matrix: PathBuf,

    /// Edge list to write (default: `<MATRIX stem>_edgelist.csv` next to the input).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ConvertOutput {
    input: String,
    output: String,
    positive: usize,
    negative: usize,
    concepts: usize,
    skipped: Vec<SkippedEntry>,
}

/// Default edge-list path for a matrix file.
pub fn default_output(matrix: &Path) -> PathBuf {
    let stem = matrix
        .file_stem()
        .map_or_else(|| "diagram".into(), |s| s.to_string_lossy());
    matrix.with_file_name(format!("{stem}_edgelist.csv"))
}

pub fn write_edge_list(diagram: &Diagram, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Source,Target,Polarity")?;
    for triple in &diagram.triples {
        let polarity = if triple.sign < 0 { "Negative" } else { "Positive" };
        writeln!(
            w,
            "{},{},{polarity}",
            csv_field(&triple.source),
            csv_field(&triple.target)
        )?;
    }
    Ok(())
}

/// Execute `cld convert`.
pub fn run_convert(args: &ConvertArgs, output: OutputMode) -> Result<()> {
    let diagram = load_diagram(&args.matrix, InputFormat::Matrix)?;
    if diagram.triples.is_empty() {
        render_error(
            output,
            &CliError::with_details(
                format!("no links found in {}", args.matrix.display()),
                "cells must be +1 or -1 to describe a link",
                "no_links",
            ),
        )?;
        bail!("no links found in {}", args.matrix.display());
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.matrix));
    let file =
        File::create(&target).with_context(|| format!("Failed to create {}", target.display()))?;
    let mut out = BufWriter::new(file);
    write_edge_list(&diagram, &mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write {}", target.display()))?;

    let payload = ConvertOutput {
        input: args.matrix.display().to_string(),
        output: target.display().to_string(),
        positive: diagram.positive_links(),
        negative: diagram.negative_links(),
        concepts: diagram.linked_concepts(),
        skipped: diagram.skipped.clone(),
    };
    info!(
        output = %payload.output,
        links = diagram.triples.len(),
        "wrote edge list"
    );

    render_mode(
        output,
        &payload,
        |p, w| {
            writeln!(w, "output\t{}", p.output)?;
            writeln!(w, "positive\t{}", p.positive)?;
            writeln!(w, "negative\t{}", p.negative)?;
            writeln!(w, "concepts\t{}", p.concepts)
        },
        |p, w| {
            pretty_section(w, &format!("Converted {}", p.input))?;
            pretty_kv(w, "Edge list", &p.output)?;
            pretty_kv(w, "Positive links", p.positive.to_string())?;
            pretty_kv(w, "Negative links", p.negative.to_string())?;
            pretty_kv(w, "Concepts", p.concepts.to_string())?;
            if !p.skipped.is_empty() {
                pretty_kv(w, "Skipped cells", p.skipped.len().to_string())?;
                for entry in &p.skipped {
                    writeln!(
                        w,
                        "    line {}: {} -> {} = {:?}",
                        entry.line, entry.source, entry.target, entry.value
                    )?;
                }
            }
            Ok(())
        },
    )
}
