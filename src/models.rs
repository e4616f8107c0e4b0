//! Model file resolution and preprocessing metadata

use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the model path when none is given
pub const MODEL_PATH_ENV: &str = "BGSTRIP_MODEL";

/// Known model families and their input conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelPreset {
    /// U²-Net salient object detection, 320px input
    #[default]
    U2net,
    /// `ISNet` general segmentation, 1024px input
    Isnet,
}

impl ModelPreset {
    #[must_use]
    pub fn preprocessing_config(self) -> PreprocessingConfig {
        match self {
            Self::U2net => PreprocessingConfig {
                target_size: [320, 320],
                normalization_mean: [0.485, 0.456, 0.406],
                normalization_std: [0.229, 0.224, 0.225],
            },
            Self::Isnet => PreprocessingConfig {
                target_size: [1024, 1024],
                normalization_mean: [0.5, 0.5, 0.5],
                normalization_std: [1.0, 1.0, 1.0],
            },
        }
    }

    #[must_use]
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::U2net => "u2net.onnx",
            Self::Isnet => "isnet-general-use.onnx",
        }
    }
}

impl std::fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U2net => write!(f, "u2net"),
            Self::Isnet => write!(f, "isnet"),
        }
    }
}

/// Model input preprocessing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    pub target_size: [u32; 2],
    pub normalization_mean: [f32; 3],
    pub normalization_std: [f32; 3],
}

/// Model file location and preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub path: PathBuf,
    pub preset: ModelPreset,
}

impl ModelSpec {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P, preset: ModelPreset) -> Self {
        Self {
            path: path.into(),
            preset,
        }
    }

    /// Spec for the preset's file under the default model directory
    #[must_use]
    pub fn for_preset(preset: ModelPreset) -> Self {
        Self::new(default_model_dir().join(preset.default_file_name()), preset)
    }

    /// Short name for tracing and logging
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{}:{}",
            self.preset,
            self.path.file_name().unwrap_or_default().to_string_lossy()
        )
    }

    /// Path of the optional JSON sidecar (`model.onnx` -> `model.json`)
    #[must_use]
    pub fn sidecar_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::for_preset(ModelPreset::default())
    }
}

/// Directory searched for models when no explicit path is given (`~/.u2net`)
#[must_use]
pub fn default_model_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from("."), |home| home.join(".u2net"))
}

/// Model information and metadata
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub size_bytes: usize,
    pub input_shape: (usize, usize, usize, usize), // NCHW format
}

/// Loads a model file and resolves its preprocessing config
#[derive(Debug, Clone)]
pub struct ModelManager {
    spec: ModelSpec,
    preprocessing: PreprocessingConfig,
}

impl ModelManager {
    /// Resolve a model spec, reading the JSON sidecar if one exists
    ///
    /// # Errors
    /// - Model file missing
    /// - Sidecar present but unreadable or malformed
    pub fn from_spec(spec: &ModelSpec) -> Result<Self> {
        if !spec.path.is_file() {
            let env_hint = format!("set {MODEL_PATH_ENV}");
            let dir_hint = format!(
                "place {} in {}",
                spec.preset.default_file_name(),
                default_model_dir().display()
            );
            return Err(BgRemovalError::model_error_with_context(
                "locate",
                &spec.path,
                "file not found",
                &["pass --model <PATH>", env_hint.as_str(), dir_hint.as_str()],
            ));
        }

        let sidecar = spec.sidecar_path();
        let preprocessing = if sidecar.is_file() {
            Self::read_sidecar(&sidecar)?
        } else {
            spec.preset.preprocessing_config()
        };

        tracing::debug!(
            model = %spec.display_name(),
            target_size = preprocessing.target_size[0],
            "Resolved model preprocessing"
        );

        Ok(Self {
            spec: spec.clone(),
            preprocessing,
        })
    }

    fn read_sidecar(path: &Path) -> Result<PreprocessingConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            BgRemovalError::model_error_with_context("read sidecar for", path, &e.to_string(), &[])
        })?;
        let config: PreprocessingConfig = serde_json::from_str(&content).map_err(|e| {
            BgRemovalError::model_error_with_context("parse sidecar for", path, &e.to_string(), &[])
        })?;

        if config.target_size[0] == 0 || config.target_size[0] != config.target_size[1] {
            return Err(BgRemovalError::model(format!(
                "Sidecar {} must declare a square, non-zero target_size",
                path.display()
            )));
        }
        if config.normalization_std.iter().any(|s| *s == 0.0) {
            return Err(BgRemovalError::model(format!(
                "Sidecar {} has a zero normalization_std",
                path.display()
            )));
        }

        Ok(config)
    }

    /// Read the model bytes
    ///
    /// # Errors
    /// - File I/O errors when reading model data
    pub fn load_model(&self) -> Result<Vec<u8>> {
        fs::read(&self.spec.path).map_err(|e| {
            BgRemovalError::model_error_with_context("read", &self.spec.path, &e.to_string(), &[])
        })
    }

    /// # Errors
    /// - Model file metadata unavailable
    pub fn get_info(&self) -> Result<ModelInfo> {
        let size_bytes = fs::metadata(&self.spec.path)
            .map_err(|e| {
                BgRemovalError::model_error_with_context("stat", &self.spec.path, &e.to_string(), &[])
            })?
            .len() as usize;
        let side = self.preprocessing.target_size[0] as usize;
        Ok(ModelInfo {
            name: self.spec.display_name(),
            size_bytes,
            input_shape: (1, 3, side, side),
        })
    }

    #[must_use]
    pub fn preprocessing_config(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }

    #[must_use]
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }
}
