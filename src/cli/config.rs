//! Conversion of command-line arguments into a `RemovalConfig`

use super::main_impl::{Cli, CliMethod, CliPreset};
use crate::{
    config::{RemovalConfig, RemovalMethod},
    models::{ModelPreset, ModelSpec},
    utils::ExecutionProviderManager,
};
use anyhow::{Context, Result};

pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a validated `RemovalConfig` from CLI arguments
    ///
    /// The model path comes from `--model`, then `BGSTRIP_MODEL` (both
    /// resolved by clap), then the preset's file in the default model directory.
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        let (backend_type, execution_provider) =
            ExecutionProviderManager::parse_provider_string(&cli.execution_provider)
                .with_context(|| format!("Invalid execution provider '{}'", cli.execution_provider))?;

        let preset = match cli.preset {
            CliPreset::U2net => ModelPreset::U2net,
            CliPreset::Isnet => ModelPreset::Isnet,
        };
        let model_spec = match &cli.model {
            Some(path) => ModelSpec::new(path.clone(), preset),
            None => ModelSpec::for_preset(preset),
        };

        let method = match cli.method {
            CliMethod::Model => RemovalMethod::Model,
            CliMethod::FloodFill => RemovalMethod::FloodFill,
        };

        let config = RemovalConfig::builder()
            .method(method)
            .backend_type(backend_type)
            .execution_provider(execution_provider)
            .model_spec(model_spec)
            .intra_threads(cli.threads)
            .white_tolerance(cli.white_tolerance)
            .grey_tolerance(cli.grey_tolerance)
            .require_alpha(cli.require_alpha)
            .build()?;

        Ok(config)
    }
}
