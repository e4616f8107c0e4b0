//! Background removal processor
//!
//! `BackgroundRemovalProcessor` owns the whole file-to-file flow: input check,
//! decode, background removal and encode. The CLI and library users both go
//! through it.

use crate::{
    config::{BackendType, RemovalConfig, RemovalMethod},
    error::{BgRemovalError, Result},
    inference::InferenceBackend,
    models::ModelManager,
    removal::{BackgroundRemover, FloodFillRemover, SegmentationRemover},
    services::{ImageIOService, OutputFormatHandler},
    types::{count_transparent, ProcessingOutcome},
};
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use std::time::Instant;

/// Factory trait for creating inference backends
pub trait BackendFactory {
    /// Create a backend of the given type around `model_manager`
    ///
    /// # Errors
    /// - Backend type not compiled into this build
    fn create_backend(
        &self,
        backend_type: BackendType,
        model_manager: ModelManager,
    ) -> Result<Box<dyn InferenceBackend>>;

    /// List backend types this factory can create
    fn available_backends(&self) -> Vec<BackendType>;
}

/// Creates the backends enabled by cargo features
#[derive(Debug, Default)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create_backend(
        &self,
        backend_type: BackendType,
        model_manager: ModelManager,
    ) -> Result<Box<dyn InferenceBackend>> {
        match backend_type {
            #[cfg(feature = "onnx")]
            BackendType::Onnx => Ok(Box::new(crate::backends::OnnxBackend::with_model_manager(
                model_manager,
            ))),
            #[cfg(feature = "tract")]
            BackendType::Tract => Ok(Box::new(crate::backends::TractBackend::with_model_manager(
                model_manager,
            ))),
            #[allow(unreachable_patterns)]
            other => {
                drop(model_manager);
                Err(BgRemovalError::invalid_config(format!(
                    "The {other} backend is not compiled into this build; enable the '{other}' feature"
                )))
            },
        }
    }

    fn available_backends(&self) -> Vec<BackendType> {
        let mut backends = Vec::new();
        #[cfg(feature = "onnx")]
        backends.push(BackendType::Onnx);
        #[cfg(feature = "tract")]
        backends.push(BackendType::Tract);
        backends
    }
}

/// Processor that turns one input file into one transparent output file
pub struct BackgroundRemovalProcessor {
    config: RemovalConfig,
    backend_factory: Box<dyn BackendFactory>,
    remover: Option<Box<dyn BackgroundRemover>>,
}

impl std::fmt::Debug for BackgroundRemovalProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRemovalProcessor")
            .field("config", &self.config)
            .field("remover", &self.remover.as_ref().map(|r| r.name()))
            .finish_non_exhaustive()
    }
}

impl BackgroundRemovalProcessor {
    /// Create a processor with the default backend factory
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn new(config: RemovalConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(DefaultBackendFactory))
    }

    /// Create a processor with a custom backend factory
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn with_factory(config: RemovalConfig, backend_factory: Box<dyn BackendFactory>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend_factory,
            remover: None,
        })
    }

    /// Create a processor around an existing remover
    ///
    /// `config.method` and the model settings are ignored; output handling
    /// (`require_alpha`) still applies.
    #[must_use]
    pub fn with_remover(config: RemovalConfig, remover: Box<dyn BackgroundRemover>) -> Self {
        Self {
            config,
            backend_factory: Box::new(DefaultBackendFactory),
            remover: Some(remover),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Whether a remover has been created yet
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.remover.is_some()
    }

    #[must_use]
    pub fn available_backends(&self) -> Vec<BackendType> {
        self.backend_factory.available_backends()
    }

    /// Build the remover for the configured method
    ///
    /// For the model method this resolves the model file and creates the
    /// backend; the model itself is loaded on first use.
    ///
    /// # Errors
    /// - Model file missing or its sidecar malformed
    /// - Requested backend not compiled in
    pub fn initialize(&mut self) -> Result<()> {
        if self.remover.is_some() {
            return Ok(());
        }

        let remover: Box<dyn BackgroundRemover> = match self.config.method {
            RemovalMethod::FloodFill => Box::new(FloodFillRemover::new(self.config.flood_fill)),
            RemovalMethod::Model => {
                tracing::debug!(
                    model = %self.config.model_spec.display_name(),
                    backend = %self.config.backend_type,
                    provider = %self.config.execution_provider,
                    "Creating segmentation remover"
                );
                let model_manager = ModelManager::from_spec(&self.config.model_spec)?;
                if let Ok(info) = model_manager.get_info() {
                    tracing::debug!(
                        model = %info.name,
                        size_bytes = info.size_bytes,
                        input_shape = ?info.input_shape,
                        "Model resolved"
                    );
                }
                let backend = self
                    .backend_factory
                    .create_backend(self.config.backend_type, model_manager)?;
                Box::new(SegmentationRemover::new(backend, self.config.clone()))
            },
        };

        tracing::info!(remover = %remover.name(), "Background remover ready");
        self.remover = Some(remover);
        Ok(())
    }

    /// Fail with `NotFound` unless `input_path` exists
    ///
    /// # Errors
    /// - `NotFound` naming the path
    pub fn check_input<P: AsRef<Path>>(&self, input_path: P) -> Result<()> {
        let input_path = input_path.as_ref();
        if input_path.exists() {
            Ok(())
        } else {
            Err(BgRemovalError::not_found(input_path))
        }
    }

    /// Remove the background from an already decoded image
    ///
    /// # Errors
    /// - Remover creation, model or inference failures
    /// - Remover returned an image of the wrong size
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        self.initialize()?;
        let remover = self
            .remover
            .as_mut()
            .ok_or_else(|| BgRemovalError::model("Background remover not initialized"))?;

        let start = Instant::now();
        let result = remover.remove(image)?;
        if result.dimensions() != (image.width(), image.height()) {
            return Err(BgRemovalError::inference(format!(
                "Remover '{}' returned {:?} for a {}x{} image",
                remover.name(),
                result.dimensions(),
                image.width(),
                image.height()
            )));
        }

        tracing::debug!(
            remover = %remover.name(),
            removal_ms = start.elapsed().as_millis() as u64,
            "Background removed"
        );
        Ok(result)
    }

    /// Remove the background of `input_path` and write the result to `output_path`
    ///
    /// Nothing is decoded when the input is missing, and nothing is written
    /// unless every earlier step succeeded. An existing output is replaced.
    ///
    /// # Errors
    /// - `NotFound` when the input does not exist
    /// - `Decode` when the input is not a readable image
    /// - `Model` / `Inference` when removal fails
    /// - `Encode` / `Io` when the output cannot be written
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input_path: P,
        output_path: Q,
    ) -> Result<ProcessingOutcome> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        let span = tracing::info_span!(
            "process",
            input = %input_path.display(),
            output = %output_path.display()
        );
        let _enter = span.enter();
        let start = Instant::now();

        self.check_input(input_path)?;

        let output_format = OutputFormatHandler::from_path(output_path)?;
        OutputFormatHandler::validate_for_background_removal(output_format, self.config.require_alpha)?;

        let image = ImageIOService::load_image(input_path)?;
        let dimensions = (image.width(), image.height());
        tracing::debug!(width = dimensions.0, height = dimensions.1, "Image decoded");

        let rgba = self.process_image(&image)?;
        let transparent_pixels = count_transparent(&rgba);
        let remover = self
            .remover
            .as_ref()
            .map(|r| r.name())
            .unwrap_or_default();

        let encoded = OutputFormatHandler::convert_format(rgba, output_format);
        ImageIOService::save_image(&encoded, output_path, output_format)?;

        let outcome = ProcessingOutcome {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            dimensions,
            output_format,
            transparent_pixels,
            alpha_preserved: OutputFormatHandler::supports_transparency(output_format),
            remover,
        };

        tracing::info!(
            transparent_ratio = outcome.transparent_ratio(),
            total_ms = start.elapsed().as_millis() as u64,
            "Processing complete"
        );
        Ok(outcome)
    }
}
