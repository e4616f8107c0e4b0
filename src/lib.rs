#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # bgstrip
//!
//! Removes the background from an image and writes a transparent result.
//!
//! Two removal methods are available:
//!
//! - **Model** (default): a U²-Net or IS-Net style segmentation model run
//!   through ONNX Runtime or Tract. The model file is read from
//!   `~/.u2net/` unless a path is given.
//! - **Flood fill**: a model-free keyer that clears near-white and
//!   checkerboard-grey pixels connected to the image corners.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgstrip::{remove_background_file, RemovalConfig, RemovalMethod};
//!
//! # fn example() -> bgstrip::Result<()> {
//! let config = RemovalConfig::builder()
//!     .method(RemovalMethod::FloodFill)
//!     .build()?;
//! let outcome = remove_background_file("icon.jpg", "icon.png", &config)?;
//! println!("{} pixels cleared", outcome.transparent_pixels);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `onnx` (default): ONNX Runtime backend with CUDA and `CoreML` providers
//! - `tract` (default): pure Rust backend
//! - `cli` (default): the `bgstrip` binary and its tracing setup
//! - `webp-support` (default): WebP decoding and encoding

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod probe;
pub mod processor;
pub mod removal;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

pub use backends::*;
pub use config::{
    BackendType, ExecutionProvider, FloodFillConfig, OutputFormat, RemovalConfig,
    RemovalConfigBuilder, RemovalMethod,
};
pub use error::{BgRemovalError, ErrorKind, Result};
pub use inference::InferenceBackend;
pub use models::{ModelManager, ModelPreset, ModelSpec, PreprocessingConfig};
pub use probe::{probe, PixelSample};
pub use processor::{BackendFactory, BackgroundRemovalProcessor, DefaultBackendFactory};
pub use removal::{BackgroundRemover, FloodFillRemover, SegmentationRemover};
pub use services::{ImageIOService, OutputFormatHandler};
pub use types::{ProcessingOutcome, SegmentationMask};
pub use utils::{ExecutionProviderManager, ImagePreprocessor, ProviderInfo};

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};

/// Remove the background of the image at `input_path` and write it to `output_path`
///
/// The output format follows the extension of `output_path`.
///
/// # Errors
/// - `NotFound`, `Decode`, `Model`, `Inference` or `Encode` depending on the failing step
pub fn remove_background_file<P, Q>(
    input_path: P,
    output_path: Q,
    config: &RemovalConfig,
) -> Result<ProcessingOutcome>
where
    P: AsRef<std::path::Path>,
    Q: AsRef<std::path::Path>,
{
    let mut processor = BackgroundRemovalProcessor::new(config.clone())?;
    processor.process(input_path, output_path)
}

/// Remove the background from an in-memory image
///
/// # Errors
/// - Model or inference failures
pub fn remove_background_from_image(
    image: &image::DynamicImage,
    config: &RemovalConfig,
) -> Result<image::RgbaImage> {
    let mut processor = BackgroundRemovalProcessor::new(config.clone())?;
    processor.process_image(image)
}
