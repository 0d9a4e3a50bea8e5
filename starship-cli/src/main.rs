//! Repository Starship CLI Entry Point
//!
//! Runs one analysis over a local tree and prints the result as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use starship_core::{
    analyze_complexity, analyze_dependencies, analyze_documentation, analyze_repository,
    analyze_structure, detect_yagni, AnalysisConfig,
};
use starship_utils::logging::{init_logging, LogLevel, LoggerConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "starship")]
#[command(about = "Repository Starship - structural health of a codebase")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Write the JSON result to this file instead of stdout
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    /// Abort the analysis after this many seconds
    #[arg(long, global = true, default_value_t = 300)]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warning, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Args)]
struct Target {
    /// Path to the codebase to analyze
    codebase_path: PathBuf,

    /// Keep test files in the inventory
    #[arg(long)]
    include_tests: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: metrics, modules, layout and details
    Analyze {
        #[command(flatten)]
        target: Target,

        /// Leave the raw analyzer payloads out of the result
        #[arg(long)]
        no_details: bool,

        /// Seed for the layout jitter; no jitter without it
        #[arg(long)]
        jitter_seed: Option<u64>,
    },
    /// Cyclomatic complexity and maintainability index
    Complexity {
        #[command(flatten)]
        target: Target,
    },
    /// Import classification, coupling and cycles
    Dependencies {
        #[command(flatten)]
        target: Target,
    },
    /// Docstring coverage and quality
    Documentation {
        #[command(flatten)]
        target: Target,
    },
    /// Dead code and over-engineering patterns
    Yagni {
        #[command(flatten)]
        target: Target,
    },
    /// Module partition of the tree
    Structure {
        #[command(flatten)]
        target: Target,
    },
}

impl Commands {
    fn target(&self) -> &Target {
        match self {
            Self::Analyze { target, .. }
            | Self::Complexity { target }
            | Self::Dependencies { target }
            | Self::Documentation { target }
            | Self::Yagni { target }
            | Self::Structure { target } => target,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Analyze { .. } => "analyze",
            Self::Complexity { .. } => "complexity",
            Self::Dependencies { .. } => "dependencies",
            Self::Documentation { .. } => "documentation",
            Self::Yagni { .. } => "yagni",
            Self::Structure { .. } => "structure",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggerConfig { level: cli.log_level, ..Default::default() })
        .context("failed to initialize logging")?;

    let config = build_config(&cli)?;
    let timeout = Duration::from_secs(cli.timeout_secs);
    info!(command = cli.command.name(), path = %cli.command.target().codebase_path.display(), "starting");

    let value = tokio::time::timeout(timeout, run(&cli.command, &config))
        .await
        .map_err(|_| anyhow!("analysis timed out after {}s", cli.timeout_secs))??;

    emit(&value, cli.output.as_deref(), cli.compact)
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if cli.command.target().include_tests {
        config.exclude_tests = false;
    }
    if let Commands::Analyze { no_details, jitter_seed, .. } = &cli.command {
        if *no_details {
            config.include_details = false;
        }
        if jitter_seed.is_some() {
            config.layout.jitter_seed = *jitter_seed;
        }
    }
    Ok(config)
}

async fn run(command: &Commands, config: &AnalysisConfig) -> Result<serde_json::Value> {
    let path = &command.target().codebase_path;
    match command {
        Commands::Analyze { .. } => to_json(analyze_repository(path, config).await?),
        Commands::Complexity { .. } => to_json(analyze_complexity(path, config).await?),
        Commands::Dependencies { .. } => to_json(analyze_dependencies(path, config).await?),
        Commands::Documentation { .. } => to_json(analyze_documentation(path, config).await?),
        Commands::Yagni { .. } => to_json(detect_yagni(path, config).await?),
        Commands::Structure { .. } => to_json(analyze_structure(path, config).await?),
    }
}

fn to_json<T: Serialize>(report: T) -> Result<serde_json::Value> {
    serde_json::to_value(report).context("failed to serialize the analysis result")
}

fn emit(value: &serde_json::Value, output: Option<&Path>, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, text + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "result written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
