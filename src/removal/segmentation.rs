//! Segmentation-model remover
//!
//! Preprocesses the image for the model, runs the inference backend, maps the
//! predicted mask back to the original resolution and composites it as alpha.

use super::BackgroundRemover;
use crate::{
    config::RemovalConfig,
    error::Result,
    inference::InferenceBackend,
    types::SegmentationMask,
    utils::ImagePreprocessor,
};
use image::{DynamicImage, RgbaImage};
use std::time::Instant;

/// Remover that drives an `InferenceBackend`
pub struct SegmentationRemover {
    backend: Box<dyn InferenceBackend>,
    config: RemovalConfig,
}

impl std::fmt::Debug for SegmentationRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationRemover")
            .field("backend", &self.backend.name())
            .field("model", &self.config.model_spec.display_name())
            .finish()
    }
}

impl SegmentationRemover {
    /// Wrap a backend. The backend is initialized on the first `remove` call.
    #[must_use]
    pub fn new(backend: Box<dyn InferenceBackend>, config: RemovalConfig) -> Self {
        Self { backend, config }
    }

    /// Initialize the backend now instead of on first use
    ///
    /// # Errors
    /// - Model loading or execution provider setup failures
    pub fn initialize(&mut self) -> Result<()> {
        if self.backend.is_initialized() {
            return Ok(());
        }
        if let Some(load_time) = self.backend.initialize(&self.config)? {
            tracing::info!(
                backend = self.backend.name(),
                load_ms = load_time.as_millis() as u64,
                "Model loaded"
            );
        }
        Ok(())
    }

    /// Predict the foreground mask for `image` at its original resolution
    ///
    /// # Errors
    /// - Backend initialization or inference failures
    /// - Output tensor that is not 1×1×N×N
    pub fn segment(&mut self, image: &DynamicImage) -> Result<SegmentationMask> {
        self.initialize()?;

        let preprocessing_config = self.backend.preprocessing_config()?;
        let start = Instant::now();
        let input_tensor = ImagePreprocessor::preprocess_for_inference(image, &preprocessing_config)?;
        let preprocess_ms = start.elapsed().as_millis() as u64;

        let start = Instant::now();
        let output_tensor = self.backend.infer(&input_tensor)?;
        let inference_ms = start.elapsed().as_millis() as u64;

        let mask =
            ImagePreprocessor::tensor_to_mask(&output_tensor, (image.width(), image.height()))?;
        tracing::debug!(preprocess_ms, inference_ms, "Segmentation complete");
        Ok(mask)
    }
}

impl BackgroundRemover for SegmentationRemover {
    fn name(&self) -> String {
        format!("{}:{}", self.backend.name(), self.config.model_spec.preset)
    }

    fn remove(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        let mask = self.segment(image)?;
        let mut rgba = image.to_rgba8();
        mask.apply_to_image(&mut rgba)?;
        Ok(rgba)
    }
}
