//! CSV and text exports of an [`AnalysisReport`].
//!
//! `write_exports` writes four files next to a path prefix:
//! `<prefix>_concept_nodes.csv`, `<prefix>_concept_links.csv`,
//! `<prefix>_loop_nodes.csv` and `<prefix>_scores.txt`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use loopscope_core::AnalysisReport;
use tracing::debug;

pub const DEFAULT_PREFIX: &str = "output";

/// Quote a CSV field when it needs it.
pub fn csv_field(value: &str) -> String {
    let needs_quotes = value.contains([',', '"', '\n', '\r'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_concept_nodes(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id,numberOfLoops,relevanceScore")?;
    for row in &report.concepts {
        writeln!(
            w,
            "{},{},{}",
            csv_field(&row.name),
            row.number_of_loops,
            row.relevance_score.unwrap_or(0.0)
        )?;
    }
    Ok(())
}

/// Only links that at least one loop traverses are written.
pub fn write_concept_links(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "source,target,linkInfluence,loopsTraversing")?;
    for row in report.links.iter().filter(|row| row.loops_traversing > 0) {
        writeln!(
            w,
            "{},{},{},{}",
            csv_field(&row.source),
            csv_field(&row.target),
            row.influence,
            row.loops_traversing
        )?;
    }
    Ok(())
}

pub fn write_loop_nodes(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id,size,type,members")?;
    for row in &report.loops {
        writeln!(
            w,
            "{},{},{},{}",
            row.id,
            row.size,
            row.kind,
            csv_field(&row.members.join(";"))
        )?;
    }
    Ok(())
}

pub fn write_scores(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    for ranked in &report.ranking {
        writeln!(w, "{} = {}", ranked.name, ranked.score)?;
    }
    Ok(())
}

type Writer = fn(&AnalysisReport, &mut dyn Write) -> std::io::Result<()>;

const EXPORTS: [(&str, Writer); 4] = [
    ("concept_nodes.csv", write_concept_nodes),
    ("concept_links.csv", write_concept_links),
    ("loop_nodes.csv", write_loop_nodes),
    ("scores.txt", write_scores),
];

/// Write every export for `report` and return the paths written.
pub fn write_exports(report: &AnalysisReport, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(EXPORTS.len());
    for (suffix, write) in EXPORTS {
        let path = PathBuf::from(format!("{prefix}_{suffix}"));
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write(report, &mut out)
            .and_then(|()| out.flush())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "wrote export");
        written.push(path);
    }
    Ok(written)
}
