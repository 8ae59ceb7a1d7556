use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::score::LoopOrder;

/// File name looked up in the working directory when no config is given.
pub const DEFAULT_CONFIG_FILE: &str = "loopscope.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Cycle-search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Remove each root from the working graph once all of its cycles have
    /// been emitted.
    #[serde(default = "default_true")]
    pub retire_roots: bool,
    /// Abort when cycle search emits more than this many raw cycles.
    #[serde(default)]
    pub max_loops: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            retire_roots: default_true(),
            max_loops: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Order in which a concept's loops enter the greedy scoring pass.
    #[serde(default)]
    pub order: LoopOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of concepts shown in summaries.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

/// Load an analysis config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `loopscope.toml` from `dir`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_in(dir: &Path) -> Result<AnalysisConfig> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }
    load_config(&path)
}

const fn default_true() -> bool {
    true
}

const fn default_top() -> usize {
    10
}
