//! ONNX Runtime backend for segmentation models
//!
//! Runs the model through ONNX Runtime with optional CUDA or `CoreML`
//! acceleration. Providers that are requested but unavailable fall back to CPU.

use crate::config::{ExecutionProvider, RemovalConfig};
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelManager, PreprocessingConfig};
use ndarray::Array4;
use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider,
};
use ort::session::{builder::GraphOptimizationLevel, builder::SessionBuilder, Session};
use ort::value::Value;
use std::time::{Duration, Instant};

/// ONNX Runtime backend for running background removal models
#[derive(Debug)]
pub struct OnnxBackend {
    session: Option<Session>,
    model_manager: ModelManager,
    initialized: bool,
}

impl OnnxBackend {
    /// List ONNX Runtime execution providers with availability status and descriptions
    #[must_use]
    pub fn list_providers() -> Vec<(String, bool, String)> {
        let cuda_available =
            OrtExecutionProvider::is_available(&CUDAExecutionProvider::default()).unwrap_or(false);
        let coreml_available =
            OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default())
                .unwrap_or(false);

        vec![
            (
                "CPU".to_string(),
                true,
                "Always available, uses CPU for inference".to_string(),
            ),
            (
                "CUDA".to_string(),
                cuda_available,
                "NVIDIA GPU acceleration (requires CUDA toolkit and compatible GPU)".to_string(),
            ),
            (
                "CoreML".to_string(),
                coreml_available,
                "Apple Silicon acceleration (macOS only)".to_string(),
            ),
        ]
    }

    #[must_use]
    pub fn with_model_manager(model_manager: ModelManager) -> Self {
        Self {
            session: None,
            model_manager,
            initialized: false,
        }
    }

    fn configure_providers(
        session_builder: SessionBuilder,
        provider: ExecutionProvider,
    ) -> Result<SessionBuilder> {
        let cuda_available =
            OrtExecutionProvider::is_available(&CUDAExecutionProvider::default()).unwrap_or(false);
        let coreml_available =
            OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default())
                .unwrap_or(false);

        let providers = match provider {
            ExecutionProvider::Cpu => Vec::new(),
            ExecutionProvider::Auto => {
                let mut providers = Vec::new();
                if cuda_available {
                    providers.push(CUDAExecutionProvider::default().build());
                }
                if coreml_available {
                    providers.push(CoreMLExecutionProvider::default().with_subgraphs(true).build());
                }
                providers
            },
            ExecutionProvider::Cuda if cuda_available => {
                vec![CUDAExecutionProvider::default().build()]
            },
            ExecutionProvider::CoreMl if coreml_available => {
                vec![CoreMLExecutionProvider::default().with_subgraphs(true).build()]
            },
            ExecutionProvider::Cuda | ExecutionProvider::CoreMl => {
                tracing::warn!(
                    provider = %provider,
                    "Requested execution provider is not available, falling back to CPU"
                );
                Vec::new()
            },
        };

        if providers.is_empty() {
            tracing::info!("Using CPU execution provider");
            return Ok(session_builder);
        }

        tracing::info!(count = providers.len(), "Hardware acceleration enabled");
        session_builder
            .with_execution_providers(providers)
            .map_err(|e| {
                BgRemovalError::inference(format!("Failed to set execution providers: {e}"))
            })
    }

    fn load_model(&mut self, config: &RemovalConfig) -> Result<Duration> {
        let model_load_start = Instant::now();
        let model_data = self.model_manager.load_model()?;

        let session_builder = Session::builder()
            .map_err(|e| BgRemovalError::inference(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| BgRemovalError::inference(format!("Failed to set optimization level: {e}")))?;

        let session_builder = Self::configure_providers(session_builder, config.execution_provider)?;

        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4)
        };

        let session = session_builder
            .with_intra_threads(intra_threads)
            .map_err(|e| BgRemovalError::inference(format!("Failed to set intra threads: {e}")))?
            .commit_from_memory(&model_data)
            .map_err(|e| {
                BgRemovalError::model_error_with_context(
                    "load",
                    &self.model_manager.spec().path,
                    &e.to_string(),
                    &["check that the file is a valid ONNX model"],
                )
            })?;

        self.session = Some(session);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        tracing::info!(
            model = %self.model_manager.spec().display_name(),
            provider = %config.execution_provider,
            intra_threads,
            load_ms = model_load_time.as_millis() as u64,
            "ONNX Runtime session ready"
        );

        Ok(model_load_time)
    }
}

impl InferenceBackend for OnnxBackend {
    fn initialize(&mut self, config: &RemovalConfig) -> Result<Option<Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_time = self.load_model(config)?;
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        if !self.initialized {
            return Err(BgRemovalError::inference("Backend not initialized"));
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BgRemovalError::inference("ONNX session not initialized"))?;

        let inference_start = Instant::now();
        let input_value = Value::from_array(input.clone())
            .map_err(|e| BgRemovalError::inference(format!("Failed to convert input tensor: {e}")))?;

        // Positional inputs and outputs avoid depending on tensor names
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| BgRemovalError::inference(format!("ONNX inference failed: {e}")))?;

        let output_tensor = {
            let keys: Vec<_> = outputs.keys().collect();
            let Some(first_key) = keys.first() else {
                return Err(BgRemovalError::inference("No output tensors found"));
            };
            outputs
                .get(first_key)
                .ok_or_else(|| BgRemovalError::inference("First output tensor not found"))?
                .try_extract_array::<f32>()
                .map_err(|e| {
                    BgRemovalError::inference(format!("Failed to extract output tensor: {e}"))
                })?
        };

        let output_shape = output_tensor.shape().to_vec();
        if output_shape.len() != 4 {
            return Err(BgRemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }

        let output_data = output_tensor.view().to_owned();
        let output_array = Array4::from_shape_vec(
            (
                output_shape.first().copied().unwrap_or(1),
                output_shape.get(1).copied().unwrap_or(1),
                output_shape.get(2).copied().unwrap_or(1),
                output_shape.get(3).copied().unwrap_or(1),
            ),
            output_data.into_raw_vec_and_offset().0,
        )
        .map_err(|e| BgRemovalError::inference(format!("Failed to reshape output tensor: {e}")))?;

        tracing::debug!(
            shape = ?output_array.shape(),
            inference_ms = inference_start.elapsed().as_millis() as u64,
            "ONNX inference complete"
        );

        Ok(output_array)
    }

    fn preprocessing_config(&self) -> Result<PreprocessingConfig> {
        Ok(self.model_manager.preprocessing_config().clone())
    }

    fn name(&self) -> &'static str {
        "onnx"
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelPreset, ModelSpec};
    use tempfile::TempDir;

    fn backend_with_bogus_model(dir: &TempDir) -> OnnxBackend {
        let path = dir.path().join("bogus.onnx");
        std::fs::write(&path, b"this is not an onnx graph").unwrap();
        let manager = ModelManager::from_spec(&ModelSpec::new(path, ModelPreset::U2net)).unwrap();
        OnnxBackend::with_model_manager(manager)
    }

    #[test]
    fn test_cpu_provider_always_listed() {
        let providers = OnnxBackend::list_providers();
        assert!(providers
            .iter()
            .any(|(name, available, _)| name == "CPU" && *available));
    }

    #[test]
    fn test_infer_before_initialize_fails() {
        let dir = TempDir::new().unwrap();
        let mut backend = backend_with_bogus_model(&dir);
        assert!(!backend.is_initialized());
        let input = Array4::<f32>::zeros((1, 3, 320, 320));
        assert!(backend.infer(&input).is_err());
    }

    #[test]
    fn test_preprocessing_comes_from_model_manager() {
        let dir = TempDir::new().unwrap();
        let backend = backend_with_bogus_model(&dir);
        assert_eq!(backend.preprocessing_config().unwrap().target_size, [320, 320]);
        assert_eq!(backend.name(), "onnx");
    }
}
