//! Inference backend abstraction

use crate::{config::RemovalConfig, error::Result, models::PreprocessingConfig};
use ndarray::Array4;
use std::time::Duration;

/// Trait for inference backends
pub trait InferenceBackend {
    /// Initialize the backend with the given configuration
    ///
    /// Returns the model load time, or `None` if the backend was already initialized.
    ///
    /// # Errors
    /// - Model loading or validation errors
    /// - Execution provider setup failures
    fn initialize(&mut self, config: &RemovalConfig) -> Result<Option<Duration>>;

    /// Run inference on an NCHW input tensor, returning the NCHW output tensor
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Output tensor is not 4-dimensional
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Get preprocessing configuration for this backend
    ///
    /// # Errors
    /// - Model manager not available
    fn preprocessing_config(&self) -> Result<PreprocessingConfig>;

    /// Short human-readable backend name
    fn name(&self) -> &'static str;

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;
}
