//! Shared utilities for preprocessing and execution provider handling

pub mod preprocessing;
pub mod providers;

pub use preprocessing::{ImagePreprocessor, LetterboxTransform};
pub use providers::{ExecutionProviderManager, ProviderInfo};
