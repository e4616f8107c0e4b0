//! Configuration types for background removal operations

use crate::error::{BgRemovalError, Result};
use crate::models::ModelSpec;
use serde::{Deserialize, Serialize};

/// Execution provider options for ONNX Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    #[default]
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon acceleration
    CoreMl,
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

/// Inference engine used by the model-based remover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendType {
    /// ONNX Runtime backend (supports GPU acceleration)
    #[default]
    Onnx,
    /// Tract backend (pure Rust, no external dependencies)
    Tract,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onnx => write!(f, "onnx"),
            Self::Tract => write!(f, "tract"),
        }
    }
}

/// How the background is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemovalMethod {
    /// Segmentation model run through an inference backend
    #[default]
    Model,
    /// Corner-seeded flood fill over near-white and checkerboard-grey pixels
    FloodFill,
}

/// Output image formats, selected from the output path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// JPEG (no transparency, alpha is dropped)
    Jpeg,
    /// Lossless WebP with alpha channel transparency
    WebP,
    /// TIFF with alpha channel transparency
    Tiff,
    /// BMP (alpha is dropped)
    Bmp,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
            Self::WebP => write!(f, "WebP"),
            Self::Tiff => write!(f, "TIFF"),
            Self::Bmp => write!(f, "BMP"),
        }
    }
}

/// Tolerances for the flood-fill remover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodFillConfig {
    /// A channel counts as white when it is at least `255 - white_tolerance`
    pub white_tolerance: u8,
    /// Maximum exclusive distance per channel from the checkerboard grey (241, 243, 244)
    pub grey_tolerance: u8,
}

impl Default for FloodFillConfig {
    fn default() -> Self {
        Self {
            white_tolerance: 2,
            grey_tolerance: 5,
        }
    }
}

/// Configuration for background removal operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Removal method
    pub method: RemovalMethod,

    /// Inference engine for `RemovalMethod::Model`
    pub backend_type: BackendType,

    /// Execution provider for ONNX Runtime
    pub execution_provider: ExecutionProvider,

    /// Model file and preprocessing preset
    pub model_spec: ModelSpec,

    /// Number of intra-op threads for inference (0 = auto)
    pub intra_threads: usize,

    /// Flood-fill tolerances for `RemovalMethod::FloodFill`
    pub flood_fill: FloodFillConfig,

    /// Refuse to write formats that cannot store alpha instead of flattening them
    pub require_alpha: bool,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            method: RemovalMethod::default(),
            backend_type: BackendType::default(),
            execution_provider: ExecutionProvider::default(),
            model_spec: ModelSpec::default(),
            intra_threads: 0,
            flood_fill: FloodFillConfig::default(),
            require_alpha: false,
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use bgstrip::{RemovalConfig, RemovalMethod};
    ///
    /// let config = RemovalConfig::builder()
    ///     .method(RemovalMethod::FloodFill)
    ///     .white_tolerance(4)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.flood_fill.white_tolerance, 4);
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate that the configuration is logically consistent
    ///
    /// # Errors
    /// - Tract backend combined with a GPU execution provider
    /// - Thread count above 1024
    pub fn validate(&self) -> Result<()> {
        if self.method == RemovalMethod::Model
            && self.backend_type == BackendType::Tract
            && !matches!(
                self.execution_provider,
                ExecutionProvider::Cpu | ExecutionProvider::Auto
            )
        {
            return Err(BgRemovalError::invalid_config(format!(
                "Tract backend only supports the CPU provider, got '{}'",
                self.execution_provider
            )));
        }

        if self.intra_threads > 1024 {
            return Err(BgRemovalError::config_value_error(
                "thread count",
                self.intra_threads,
                "0-1024",
            ));
        }

        Ok(())
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    #[must_use]
    pub fn method(mut self, method: RemovalMethod) -> Self {
        self.config.method = method;
        self
    }

    #[must_use]
    pub fn backend_type(mut self, backend_type: BackendType) -> Self {
        self.config.backend_type = backend_type;
        self
    }

    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    #[must_use]
    pub fn model_spec(mut self, model_spec: ModelSpec) -> Self {
        self.config.model_spec = model_spec;
        self
    }

    #[must_use]
    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self
    }

    #[must_use]
    pub fn white_tolerance(mut self, tolerance: u8) -> Self {
        self.config.flood_fill.white_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn grey_tolerance(mut self, tolerance: u8) -> Self {
        self.config.flood_fill.grey_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn require_alpha(mut self, require: bool) -> Self {
        self.config.require_alpha = require;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any failure reported by [`RemovalConfig::validate`]
    pub fn build(self) -> Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
