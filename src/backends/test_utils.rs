//! Mock inference backend for exercising the segmentation pipeline without a model

use crate::{
    config::RemovalConfig,
    error::{BgRemovalError, Result},
    inference::InferenceBackend,
    models::PreprocessingConfig,
};
use ndarray::Array4;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shape of the mask the mock produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockMask {
    /// Every output value set to this constant
    Constant(f32),
    /// 1.0 inside a centred square covering half the side, 0.0 elsewhere
    CentreSquare,
    /// A tensor with two channels, which the pipeline must reject
    WrongShape,
}

/// Mock backend that records calls and returns a synthetic mask
#[derive(Debug, Clone)]
pub struct MockBackend {
    initialized: bool,
    side: u32,
    mask: MockMask,
    call_history: Arc<Mutex<Vec<String>>>,
    should_fail_init: bool,
    should_fail_inference: bool,
}

impl MockBackend {
    #[must_use]
    pub fn new(side: u32, mask: MockMask) -> Self {
        Self {
            initialized: false,
            side,
            mask,
            call_history: Arc::new(Mutex::new(Vec::new())),
            should_fail_init: false,
            should_fail_inference: false,
        }
    }

    #[must_use]
    pub fn failing_init(mut self) -> Self {
        self.should_fail_init = true;
        self
    }

    #[must_use]
    pub fn failing_inference(mut self) -> Self {
        self.should_fail_inference = true;
        self
    }

    /// Shared handle to the call history, valid after the backend is boxed
    #[must_use]
    pub fn history(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.call_history)
    }

    fn record_call(&self, method: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(method.to_string());
        }
    }

    fn generate_output(&self) -> Array4<f32> {
        let side = self.side as usize;
        match self.mask {
            MockMask::Constant(value) => Array4::from_elem((1, 1, side, side), value),
            MockMask::WrongShape => Array4::zeros((1, 2, side, side)),
            MockMask::CentreSquare => {
                let lo = side / 4;
                let hi = side - side / 4;
                Array4::from_shape_fn((1, 1, side, side), |(_, _, y, x)| {
                    if (lo..hi).contains(&y) && (lo..hi).contains(&x) {
                        1.0
                    } else {
                        0.0
                    }
                })
            },
        }
    }
}

impl InferenceBackend for MockBackend {
    fn initialize(&mut self, _config: &RemovalConfig) -> Result<Option<Duration>> {
        self.record_call("initialize");
        if self.should_fail_init {
            return Err(BgRemovalError::model("Mock backend initialization failed"));
        }
        if self.initialized {
            return Ok(None);
        }
        self.initialized = true;
        Ok(Some(Duration::from_millis(1)))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        self.record_call("infer");
        if !self.initialized {
            return Err(BgRemovalError::inference("Backend not initialized"));
        }
        if self.should_fail_inference {
            return Err(BgRemovalError::inference("Mock inference failed"));
        }
        let expected = [1, 3, self.side as usize, self.side as usize];
        if input.shape() != expected.as_slice() {
            return Err(BgRemovalError::inference(format!(
                "Mock expected input {:?}, got {:?}",
                expected,
                input.shape()
            )));
        }
        Ok(self.generate_output())
    }

    fn preprocessing_config(&self) -> Result<PreprocessingConfig> {
        Ok(PreprocessingConfig {
            target_size: [self.side, self.side],
            normalization_mean: [0.485, 0.456, 0.406],
            normalization_std: [0.229, 0.224, 0.225],
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
