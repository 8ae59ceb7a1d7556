pub mod analyze;
pub mod convert;
pub mod loops;

use std::path::Path;

use anyhow::Result;
use loopscope_core::SignedGraph;
use tracing::{info, warn};

use crate::input::{InputFormat, load_diagram};

/// Load a diagram file and build its graph.
pub fn load_graph(path: &Path, format: InputFormat) -> Result<SignedGraph> {
    let diagram = load_diagram(path, format)?;
    let skipped = diagram.skipped.len();
    let (graph, report) = diagram.into_graph();

    for rejected in &report.rejected {
        warn!(position = rejected.position, error = %rejected.error, "rejected link");
    }
    info!(
        input = %path.display(),
        concepts = graph.concept_count(),
        links = graph.link_count(),
        replaced = report.replaced,
        skipped,
        "loaded diagram"
    );
    Ok(graph)
}
