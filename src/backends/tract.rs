//! Tract backend for segmentation models
//!
//! Pure Rust inference with no native runtime. Only the CPU provider exists.

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use crate::models::{ModelManager, PreprocessingConfig};
use ndarray::Array4;
use std::time::{Duration, Instant};
use tract_onnx::prelude::*;

type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Tract backend for running background removal models
#[derive(Debug)]
pub struct TractBackend {
    model: Option<TractModel>,
    model_manager: ModelManager,
    initialized: bool,
}

impl TractBackend {
    #[must_use]
    pub fn list_providers() -> Vec<(String, bool, String)> {
        vec![(
            "CPU".to_string(),
            true,
            "Pure Rust CPU inference with no external dependencies".to_string(),
        )]
    }

    #[must_use]
    pub fn with_model_manager(model_manager: ModelManager) -> Self {
        Self {
            model: None,
            model_manager,
            initialized: false,
        }
    }

    fn load_model(&mut self) -> Result<Duration> {
        let model_load_start = Instant::now();
        let model_data = self.model_manager.load_model()?;
        let side = self.model_manager.preprocessing_config().target_size[0] as usize;
        let model_path = self.model_manager.spec().path.clone();
        let load_error = |stage: &str, e: &dyn std::fmt::Display| {
            BgRemovalError::model_error_with_context(stage, &model_path, &e.to_string(), &[])
        };

        // Pin the input fact so dynamic-shape models optimize to a concrete graph
        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| load_error("parse", &e))?
            .with_input_fact(0, f32::fact([1, 3, side, side]).into())
            .map_err(|e| load_error("set input shape for", &e))?
            .into_optimized()
            .map_err(|e| load_error("optimize", &e))?
            .into_runnable()
            .map_err(|e| load_error("prepare", &e))?;

        self.model = Some(model);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        tracing::info!(
            model = %self.model_manager.spec().display_name(),
            load_ms = model_load_time.as_millis() as u64,
            "Tract model ready"
        );
        Ok(model_load_time)
    }
}

impl InferenceBackend for TractBackend {
    fn initialize(&mut self, _config: &RemovalConfig) -> Result<Option<Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_time = self.load_model()?;
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| BgRemovalError::inference("Tract model not initialized"))?;

        let inference_start = Instant::now();
        let input_tensor = Tensor::from(input.clone());

        let outputs = model
            .run(tvec![input_tensor.into()])
            .map_err(|e| BgRemovalError::inference(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| BgRemovalError::inference("No output tensor found"))?
            .into_arc_tensor();

        let output_data = output_tensor.to_array_view::<f32>().map_err(|e| {
            BgRemovalError::inference(format!("Failed to convert output tensor: {e}"))
        })?;

        let output_shape = output_data.shape().to_vec();
        if output_shape.len() != 4 {
            return Err(BgRemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }

        let output_array = Array4::from_shape_vec(
            (
                output_shape.first().copied().unwrap_or(1),
                output_shape.get(1).copied().unwrap_or(1),
                output_shape.get(2).copied().unwrap_or(1),
                output_shape.get(3).copied().unwrap_or(1),
            ),
            output_data.iter().copied().collect(),
        )
        .map_err(|e| BgRemovalError::inference(format!("Failed to reshape output tensor: {e}")))?;

        tracing::debug!(
            shape = ?output_array.shape(),
            inference_ms = inference_start.elapsed().as_millis() as u64,
            "Tract inference complete"
        );

        Ok(output_array)
    }

    fn preprocessing_config(&self) -> Result<PreprocessingConfig> {
        Ok(self.model_manager.preprocessing_config().clone())
    }

    fn name(&self) -> &'static str {
        "tract"
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
