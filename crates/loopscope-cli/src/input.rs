//! Causal loop diagram loaders.
//!
//! Two CSV layouts are understood:
//!
//! - **Adjacency matrix**: the header row holds target names from the second
//!   column on, the first column holds source names, and each cell is a
//!   polarity (`+1`, `-1`, `1`, `0` or empty, embedded spaces allowed).
//! - **Edge list**: a `Source,Target,Polarity` header followed by one link
//!   per row.
//!
//! Cells that are neither a link nor "no link" are skipped with a warning and
//! reported in [`Diagram::skipped`].

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use loopscope_core::graph::IngestReport;
use loopscope_core::{SignedGraph, Triple};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Edge list when the header reads `Source,Target,Polarity`, matrix otherwise.
    #[default]
    Auto,
    Matrix,
    Edges,
}

/// An entry that could not be turned into a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// One-based line of the record in the input.
    pub line: usize,
    pub source: String,
    pub target: String,
    pub value: String,
}

/// A loaded diagram, ready to become a [`SignedGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagram {
    /// Every concept named by the input, in first-seen order.
    pub concepts: Vec<String>,
    pub triples: Vec<Triple>,
    pub skipped: Vec<SkippedEntry>,
}

impl Diagram {
    pub fn positive_links(&self) -> usize {
        self.triples.iter().filter(|t| t.sign > 0).count()
    }

    pub fn negative_links(&self) -> usize {
        self.triples.iter().filter(|t| t.sign < 0).count()
    }

    /// Concepts that take part in at least one link.
    pub fn linked_concepts(&self) -> usize {
        let mut names: Vec<&str> = self
            .triples
            .iter()
            .flat_map(|t| [t.source.as_str(), t.target.as_str()])
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Build the graph. Concepts without links are kept as isolated nodes.
    pub fn into_graph(self) -> (SignedGraph, IngestReport) {
        let mut graph = SignedGraph::new();
        for name in &self.concepts {
            graph.add_concept(name);
        }
        let report = graph.ingest(self.triples);
        (graph, report)
    }
}

/// Read and parse a diagram file.
pub fn load_diagram(path: &Path, format: InputFormat) -> Result<Diagram> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_diagram(&text, format).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_diagram(text: &str, format: InputFormat) -> Result<Diagram> {
    let records = parse_csv(text);
    if records.is_empty() {
        bail!("input is empty");
    }

    let format = match format {
        InputFormat::Auto => detect_format(&records[0].fields),
        explicit => explicit,
    };
    debug!(?format, records = records.len(), "parsing diagram");

    match format {
        InputFormat::Edges => parse_edge_list(&records),
        InputFormat::Matrix | InputFormat::Auto => parse_matrix(&records),
    }
}

fn detect_format(header: &[String]) -> InputFormat {
    let cell = |idx: usize| header.get(idx).map(|c| c.trim().to_lowercase()).unwrap_or_default();
    let third = cell(2);
    if cell(0) == "source"
        && cell(1) == "target"
        && matches!(third.as_str(), "polarity" | "sign" | "influence")
    {
        InputFormat::Edges
    } else {
        InputFormat::Matrix
    }
}

// ---------------------------------------------------------------------------
// Adjacency matrix
// ---------------------------------------------------------------------------

/// How a matrix cell reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    NoLink,
    Link(i32),
    Invalid,
}

/// Interpret one matrix cell. Whitespace anywhere in the cell is ignored.
pub fn parse_matrix_cell(raw: &str) -> Cell {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Cell::NoLink;
    }
    let unsigned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let value = match unsigned.parse::<i64>() {
        Ok(value) => value,
        Err(_) => match unsigned.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.abs() <= 1.0 => {
                if value > 0.0 {
                    1
                } else if value < 0.0 {
                    -1
                } else {
                    0
                }
            }
            _ => return Cell::Invalid,
        },
    };

    match value {
        0 => Cell::NoLink,
        1 => Cell::Link(1),
        -1 => Cell::Link(-1),
        _ => Cell::Invalid,
    }
}

fn parse_matrix(records: &[Record]) -> Result<Diagram> {
    let header = &records[0];
    let targets: Vec<String> = header
        .fields
        .iter()
        .skip(1)
        .enumerate()
        .map(|(idx, name)| concept_name(name, idx))
        .collect();
    if targets.is_empty() {
        bail!("matrix header has no target columns");
    }

    let mut diagram = Diagram::default();
    for target in &targets {
        push_concept(&mut diagram.concepts, target);
    }

    for (row_idx, record) in records[1..].iter().enumerate() {
        let Some(first) = record.fields.first() else {
            continue;
        };
        let source = concept_name(first, row_idx);
        push_concept(&mut diagram.concepts, &source);

        for (target, raw) in targets.iter().zip(record.fields.iter().skip(1)) {
            match parse_matrix_cell(raw) {
                Cell::NoLink => {}
                Cell::Link(sign) => diagram.triples.push(Triple::new(&source, target, sign)),
                Cell::Invalid => {
                    warn!(
                        line = record.line,
                        source = %source,
                        target = %target,
                        value = %raw,
                        "skipping invalid polarity"
                    );
                    diagram.skipped.push(SkippedEntry {
                        line: record.line,
                        source: source.clone(),
                        target: target.clone(),
                        value: raw.clone(),
                    });
                }
            }
        }
    }

    debug!(
        concepts = diagram.concepts.len(),
        links = diagram.triples.len(),
        skipped = diagram.skipped.len(),
        "loaded adjacency matrix"
    );
    Ok(diagram)
}

fn concept_name(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed_{idx}")
    } else {
        trimmed.to_string()
    }
}

fn push_concept(concepts: &mut Vec<String>, name: &str) {
    if !concepts.iter().any(|c| c == name) {
        concepts.push(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Edge list
// ---------------------------------------------------------------------------

/// Interpret an edge-list polarity.
pub fn parse_polarity(raw: &str) -> Option<i32> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match cleaned.as_str() {
        "positive" | "pos" | "+" | "+1" | "1" | "increases" | "increase" => Some(1),
        "negative" | "neg" | "-" | "-1" | "decreases" | "decrease" => Some(-1),
        _ => None,
    }
}

fn parse_edge_list(records: &[Record]) -> Result<Diagram> {
    if detect_format(&records[0].fields) != InputFormat::Edges {
        bail!("edge list header must be Source,Target,Polarity");
    }

    let mut diagram = Diagram::default();
    for record in &records[1..] {
        let field = |idx: usize| record.fields.get(idx).map_or("", |f| f.trim());
        let (source, target, polarity) = (field(0), field(1), field(2));

        let sign = if source.is_empty() || target.is_empty() {
            None
        } else {
            parse_polarity(polarity)
        };

        match sign {
            Some(sign) => {
                push_concept(&mut diagram.concepts, source);
                push_concept(&mut diagram.concepts, target);
                diagram.triples.push(Triple::new(source, target, sign));
            }
            None => {
                warn!(line = record.line, source, target, polarity, "skipping invalid edge");
                diagram.skipped.push(SkippedEntry {
                    line: record.line,
                    source: source.to_string(),
                    target: target.to_string(),
                    value: polarity.to_string(),
                });
            }
        }
    }

    debug!(
        concepts = diagram.concepts.len(),
        links = diagram.triples.len(),
        skipped = diagram.skipped.len(),
        "loaded edge list"
    );
    Ok(diagram)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// One CSV record and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split CSV text into records.
///
/// Quoted fields may contain commas, newlines and doubled quotes. Blank lines
/// are dropped. A leading byte-order mark is ignored.
pub fn parse_csv(text: &str) -> Vec<Record> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, record_line, fields);
    }
    records
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>) {
    if fields.iter().all(|f| f.trim().is_empty()) && fields.len() <= 1 {
        return;
    }
    records.push(Record { line, fields });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_handles_quotes_commas_and_crlf() {
        let records = parse_csv("a,\"b, c\",\"say \"\"hi\"\"\"\r\n\r\n1,2,3\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields, vec!["a", "b, c", "say \"hi\""]);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].fields, vec!["1", "2", "3"]);
    }

    #[test]
    fn csv_quoted_newline_stays_in_field() {
        let records = parse_csv("\"two\nlines\",x\nnext,y");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields[0], "two\nlines");
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn matrix_cells() {
        assert_eq!(parse_matrix_cell("1"), Cell::Link(1));
        assert_eq!(parse_matrix_cell("+1"), Cell::Link(1));
        assert_eq!(parse_matrix_cell("+ 1"), Cell::Link(1));
        assert_eq!(parse_matrix_cell(" -1 "), Cell::Link(-1));
        assert_eq!(parse_matrix_cell("- 1"), Cell::Link(-1));
        assert_eq!(parse_matrix_cell("1.0"), Cell::Link(1));
        assert_eq!(parse_matrix_cell("0"), Cell::NoLink);
        assert_eq!(parse_matrix_cell(""), Cell::NoLink);
        assert_eq!(parse_matrix_cell("  "), Cell::NoLink);
        assert_eq!(parse_matrix_cell("2"), Cell::Invalid);
        assert_eq!(parse_matrix_cell("yes"), Cell::Invalid);
        assert_eq!(parse_matrix_cell("0.5"), Cell::Invalid);
    }

    #[test]
    fn polarity_words() {
        assert_eq!(parse_polarity("Positive"), Some(1));
        assert_eq!(parse_polarity(" NEGATIVE "), Some(-1));
        assert_eq!(parse_polarity("+"), Some(1));
        assert_eq!(parse_polarity("- 1"), Some(-1));
        assert_eq!(parse_polarity("decreases"), Some(-1));
        assert_eq!(parse_polarity("maybe"), None);
        assert_eq!(parse_polarity(""), None);
    }

    #[test]
    fn matrix_loads_links_and_isolated_concepts() {
        let text = ",A,B,C\nA,0,+1,\nB,,0,-1\nC, + 1 ,0,0\nD,0,0,0\n";
        let diagram = parse_diagram(text, InputFormat::Auto).expect("parse");

        assert_eq!(diagram.concepts, vec!["A", "B", "C", "D"]);
        assert_eq!(
            diagram.triples,
            vec![
                Triple::new("A", "B", 1),
                Triple::new("B", "C", -1),
                Triple::new("C", "A", 1),
            ]
        );
        assert!(diagram.skipped.is_empty());
        assert_eq!(diagram.positive_links(), 2);
        assert_eq!(diagram.negative_links(), 1);
        assert_eq!(diagram.linked_concepts(), 3);
    }

    #[test]
    fn matrix_names_blank_headers_and_skips_bad_cells() {
        let text = "x, Alpha ,\nAlpha,0,3\n,1,0\n";
        let diagram = parse_diagram(text, InputFormat::Matrix).expect("parse");

        assert_eq!(diagram.concepts, vec!["Alpha", "Unnamed_1"]);
        assert_eq!(diagram.skipped.len(), 1);
        assert_eq!(diagram.skipped[0].line, 2);
        assert_eq!(diagram.skipped[0].value, "3");
        // Row 1 (zero-based) has a blank name.
        assert_eq!(diagram.triples, vec![Triple::new("Unnamed_1", "Alpha", 1)]);
    }

    #[test]
    fn edge_list_is_detected_and_parsed() {
        let text = "Source,Target,Polarity\nPrice,Demand,Negative\nDemand,Price,Positive\n\"Cost, unit\",Price,+\nBad,Row,sideways\n";
        let diagram = parse_diagram(text, InputFormat::Auto).expect("parse");

        assert_eq!(diagram.triples.len(), 3);
        assert_eq!(diagram.triples[0], Triple::new("Price", "Demand", -1));
        assert_eq!(diagram.triples[2].source, "Cost, unit");
        assert_eq!(diagram.skipped.len(), 1);
        assert_eq!(diagram.skipped[0].line, 5);
        assert!(!diagram.concepts.contains(&"Bad".to_string()));
    }

    #[test]
    fn edge_format_requires_header() {
        let err = parse_diagram("a,b,1\n", InputFormat::Edges).expect_err("no header");
        assert!(err.to_string().contains("Source,Target,Polarity"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_diagram("", InputFormat::Auto).is_err());
        assert!(parse_diagram("\n\n", InputFormat::Auto).is_err());
    }

    #[test]
    fn into_graph_keeps_isolated_concepts() {
        let diagram = parse_diagram(",A,B\nA,0,1\nB,1,0\nC,0,0\n", InputFormat::Matrix).expect("parse");
        let (graph, report) = diagram.into_graph();

        assert_eq!(report.inserted, 2);
        assert_eq!(graph.concept_count(), 3);
        assert!(graph.concept("C").is_some());
    }

    #[test]
    fn load_diagram_reports_path() {
        let err = load_diagram(Path::new("/definitely/missing.csv"), InputFormat::Auto)
            .expect_err("missing");
        assert!(format!("{err:#}").contains("missing.csv"));
    }
}
