//! bgstrip command-line tool
//!
//! `bgstrip <input_path> <output_path>` removes the background of one image.

use super::config::CliConfigBuilder;
use crate::{
    error::ErrorKind,
    probe::{self, DEFAULT_REGION, DEFAULT_STEP},
    processor::BackgroundRemovalProcessor,
    utils::ExecutionProviderManager,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Usage line printed when the positional arguments are missing
pub const USAGE: &str = "Usage: bgstrip <input_path> <output_path>";

/// Remove the background from an image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgstrip")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Image to process
    #[arg(value_name = "INPUT_PATH")]
    pub input: Option<PathBuf>,

    /// Where to write the result; the extension picks the format
    #[arg(value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Arguments past the output path are ignored
    #[arg(hide = true, value_name = "IGNORED")]
    pub extra: Vec<String>,

    /// How the background is found
    #[arg(long, value_enum, default_value_t = CliMethod::Model)]
    pub method: CliMethod,

    /// Execution provider in format backend:provider (e.g., onnx:auto, onnx:coreml, tract:cpu)
    #[arg(short, long, default_value = "onnx:auto")]
    pub execution_provider: String,

    /// Path to the segmentation model [default: ~/.u2net/<preset file>]
    #[arg(short, long, env = "BGSTRIP_MODEL", value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Preprocessing preset matching the model
    #[arg(long, value_enum, default_value_t = CliPreset::U2net)]
    pub preset: CliPreset,

    /// Number of inference threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Flood fill: how far below 255 a channel may be and still count as white
    #[arg(long, default_value_t = 2)]
    pub white_tolerance: u8,

    /// Flood fill: per-channel distance from checkerboard grey (241,243,244)
    #[arg(long, default_value_t = 5)]
    pub grey_tolerance: u8,

    /// Fail instead of flattening when the output format has no alpha channel
    #[arg(long)]
    pub require_alpha: bool,

    /// Print sampled pixels of the written image
    #[arg(long)]
    pub probe: bool,

    /// Exit with a non-zero code when processing fails
    #[arg(long)]
    pub strict: bool,

    /// Show execution provider diagnostics and exit
    #[arg(long)]
    pub show_providers: bool,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliMethod {
    /// Segmentation model
    Model,
    /// Corner flood fill over white and checkerboard grey
    FloodFill,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliPreset {
    U2net,
    Isnet,
}

/// Exit code for a processing failure
///
/// Without `strict` every handled failure exits 0.
#[must_use]
pub fn exit_code(kind: ErrorKind, strict: bool) -> i32 {
    if !strict {
        return 0;
    }
    match kind {
        ErrorKind::NotFound => 2,
        ErrorKind::DecodeError => 3,
        ErrorKind::ModelError => 4,
        ErrorKind::EncodeError => 5,
    }
}

/// Parse the process arguments and run, returning the exit code
///
/// # Errors
/// - Tracing setup failure
/// - Invalid option values (provider string, thread count)
pub fn main() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose).context("Failed to initialize tracing")?;
    run(&cli)
}

/// Run an already parsed command line, returning the exit code
///
/// # Errors
/// - Invalid option values (provider string, thread count)
pub fn run(cli: &Cli) -> Result<i32> {
    if cli.show_providers {
        show_provider_diagnostics();
        return Ok(0);
    }

    let (Some(input), Some(output)) = (cli.input.as_deref(), cli.output.as_deref()) else {
        println!("{USAGE}");
        return Ok(1);
    };
    if !cli.extra.is_empty() {
        tracing::warn!(ignored = ?cli.extra, "Ignoring extra arguments");
    }

    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    tracing::debug!(
        method = ?config.method,
        backend = %config.backend_type,
        provider = %config.execution_provider,
        "Configuration built"
    );

    let mut processor =
        BackgroundRemovalProcessor::new(config).context("Failed to create processor")?;
    let code = process_one(&mut processor, input, output, cli.strict);

    if code == 0 && cli.probe && output.exists() {
        print_probe(output);
    }
    Ok(code)
}

fn process_one(
    processor: &mut BackgroundRemovalProcessor,
    input: &Path,
    output: &Path,
    strict: bool,
) -> i32 {
    if let Err(e) = processor.check_input(input) {
        println!("Error: {e}");
        return exit_code(e.kind(), strict);
    }

    println!("Processing {}...", input.display());
    match processor.process(input, output) {
        Ok(outcome) => {
            tracing::info!(
                transparent_pixels = outcome.transparent_pixels,
                remover = %outcome.remover,
                "Done"
            );
            println!("Saved transparent image to {}", output.display());
            0
        },
        Err(e) => {
            tracing::debug!(error = ?e, "Processing failed");
            println!("Error processing image: {e}");
            exit_code(e.kind(), strict)
        },
    }
}

fn print_probe(path: &Path) {
    match probe::probe(path, DEFAULT_REGION, DEFAULT_STEP) {
        Ok(samples) => {
            for sample in samples {
                println!("{sample}");
            }
        },
        Err(e) => tracing::warn!(error = %e, "Could not probe output"),
    }
}

/// Initialize tracing with CLI-friendly configuration
fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::{TracingConfig, TracingFormat};
    use std::io::IsTerminal;

    let mut config = TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::for_stream(std::io::stderr().is_terminal()));
    if let Ok(directive) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(directive);
    }
    config.init()?;

    tracing::debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}

fn show_provider_diagnostics() {
    let cpu_count = std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1);
    println!("System: {cpu_count} CPU cores detected");

    println!("\nExecution providers:");
    for provider_info in ExecutionProviderManager::list_all_providers() {
        let status = if provider_info.available {
            "available"
        } else {
            "not available"
        };
        println!(
            "  {:<12} {:<14} {}",
            provider_info.name, status, provider_info.description
        );
    }

    println!("\nUsage examples:");
    println!("  --execution-provider onnx:auto    # Best available ONNX provider (default)");
    println!("  --execution-provider onnx:cpu     # Force ONNX CPU execution");
    println!("  --execution-provider tract:cpu    # Pure Rust Tract backend");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positionals_and_defaults() {
        let cli = Cli::try_parse_from(["bgstrip", "in.png", "out.png"]).unwrap();
        assert_eq!(cli.input.as_deref(), Some(Path::new("in.png")));
        assert_eq!(cli.output.as_deref(), Some(Path::new("out.png")));
        assert_eq!(cli.method, CliMethod::Model);
        assert_eq!(cli.execution_provider, "onnx:auto");
        assert_eq!(cli.white_tolerance, 2);
        assert_eq!(cli.grey_tolerance, 5);
        assert!(!cli.strict);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "bgstrip",
            "--method",
            "flood-fill",
            "-e",
            "tract:cpu",
            "--preset",
            "isnet",
            "-t",
            "2",
            "--strict",
            "-vv",
            "a.jpg",
            "b.webp",
        ])
        .unwrap();
        assert_eq!(cli.method, CliMethod::FloodFill);
        assert_eq!(cli.preset, CliPreset::Isnet);
        assert_eq!(cli.threads, 2);
        assert_eq!(cli.verbose, 2);
        assert!(cli.strict);
    }

    #[test]
    fn test_extra_positionals_are_collected() {
        let cli = Cli::try_parse_from(["bgstrip", "in.png", "out.png", "extra", "more"]).unwrap();
        assert_eq!(cli.output.as_deref(), Some(Path::new("out.png")));
        assert_eq!(cli.extra, ["extra", "more"]);
    }

    #[test]
    fn test_missing_positionals_print_usage() {
        let cli = Cli::try_parse_from(["bgstrip", "only-input.png"]).unwrap();
        assert_eq!(run(&cli).unwrap(), 1);

        let cli = Cli::try_parse_from(["bgstrip"]).unwrap();
        assert_eq!(run(&cli).unwrap(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ErrorKind::NotFound, false), 0);
        assert_eq!(exit_code(ErrorKind::EncodeError, false), 0);
        assert_eq!(exit_code(ErrorKind::NotFound, true), 2);
        assert_eq!(exit_code(ErrorKind::DecodeError, true), 3);
        assert_eq!(exit_code(ErrorKind::ModelError, true), 4);
        assert_eq!(exit_code(ErrorKind::EncodeError, true), 5);
    }
}
