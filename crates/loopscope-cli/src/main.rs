#![forbid(unsafe_code)]

mod cmd;
mod export;
mod input;
mod output;

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use loopscope_core::config::{AnalysisConfig, load_config, load_config_in};
use output::OutputMode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cld: find and rank feedback loops in causal loop diagrams",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./loopscope.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Find loops, score concepts and export the results",
        after_help = "EXAMPLES:\n    # Analyze a matrix and write output_*.csv\n    cld analyze model.csv\n\n    # Edge list input, custom prefix, no files\n    cld analyze edges.csv --input-format edges --output run1 --no-export"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "List every feedback loop",
        after_help = "EXAMPLES:\n    # Only balancing loops\n    cld loops model.csv --type balancing"
    )]
    Loops(cmd::loops::LoopsArgs),

    #[command(
        about = "Convert an adjacency matrix into an edge list",
        after_help = "EXAMPLES:\n    # Writes model_edgelist.csv\n    cld convert model.csv"
    )]
    Convert(cmd::convert::ConvertArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LOOPSCOPE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "cld=debug,loopscope_core=debug,info"
        } else {
            "cld=info,loopscope_core=info,warn"
        })
    });

    let format = env::var("LOOPSCOPE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_analysis_config(path: Option<&PathBuf>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let cwd = env::current_dir().context("Failed to read the working directory")?;
            load_config_in(&cwd)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::resolve_output_mode(cli.format, cli.json);
    let config = load_analysis_config(cli.config.as_ref())?;
    debug!(?config, ?output, "starting");

    match cli.command {
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, output, &config),
        Commands::Loops(ref args) => cmd::loops::run_loops(args, output, &config),
        Commands::Convert(ref args) => cmd::convert::run_convert(args, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cld", "loops", "model.csv", "--json", "--verbose"]);
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Loops(_)));
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["cld", "--format", "text", "convert", "m.csv"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn config_flag_is_loaded() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[report]\ntop = 2\n").expect("write config");

        let config = load_analysis_config(Some(&path)).expect("config");
        assert_eq!(config.report.top, 2);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = PathBuf::from("/definitely/missing/loopscope.toml");
        assert!(load_analysis_config(Some(&path)).is_err());
    }
}
