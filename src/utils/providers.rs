//! Execution provider parsing and discovery

use crate::{
    config::{BackendType, ExecutionProvider},
    error::{BgRemovalError, Result},
};

/// An execution provider combination and whether it can be used on this machine
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub execution_provider: ExecutionProvider,
    pub available: bool,
    pub description: String,
}

/// Parsing and listing of `backend:provider` strings
pub struct ExecutionProviderManager;

impl ExecutionProviderManager {
    /// Parse an execution provider string in the form `backend:provider`
    ///
    /// A bare backend name selects that backend's default provider.
    ///
    /// ```rust
    /// use bgstrip::utils::ExecutionProviderManager;
    /// use bgstrip::{BackendType, ExecutionProvider};
    ///
    /// let (backend, provider) = ExecutionProviderManager::parse_provider_string("tract:cpu").unwrap();
    /// assert_eq!(backend, BackendType::Tract);
    /// assert_eq!(provider, ExecutionProvider::Cpu);
    /// ```
    ///
    /// # Errors
    /// - Unknown backend, unknown provider, or a provider the backend does not support
    pub fn parse_provider_string(provider_str: &str) -> Result<(BackendType, ExecutionProvider)> {
        let normalized = provider_str.trim().to_ascii_lowercase();
        let Some((backend, provider)) = normalized.split_once(':') else {
            return match normalized.as_str() {
                "onnx" => Ok((BackendType::Onnx, Self::default_provider_for_backend(BackendType::Onnx))),
                "tract" => Ok((BackendType::Tract, Self::default_provider_for_backend(BackendType::Tract))),
                _ => Err(BgRemovalError::invalid_config(format!(
                    "Invalid provider '{provider_str}'. Use backend:provider (e.g. onnx:auto, tract:cpu)"
                ))),
            };
        };

        match backend {
            "onnx" => {
                let execution_provider = match provider {
                    "auto" => ExecutionProvider::Auto,
                    "cpu" => ExecutionProvider::Cpu,
                    "cuda" => ExecutionProvider::Cuda,
                    "coreml" => ExecutionProvider::CoreMl,
                    _ => {
                        return Err(BgRemovalError::invalid_config(format!(
                            "Unknown ONNX provider: {provider}. Supported: auto, cpu, cuda, coreml"
                        )))
                    },
                };
                Ok((BackendType::Onnx, execution_provider))
            },
            "tract" if provider == "cpu" => Ok((BackendType::Tract, ExecutionProvider::Cpu)),
            "tract" => Err(BgRemovalError::invalid_config(format!(
                "Unknown Tract provider: {provider}. Tract only supports 'cpu'"
            ))),
            _ => Err(BgRemovalError::invalid_config(format!(
                "Unknown backend: {backend}. Supported backends: onnx, tract"
            ))),
        }
    }

    #[must_use]
    pub fn default_provider_for_backend(backend_type: BackendType) -> ExecutionProvider {
        match backend_type {
            BackendType::Onnx => ExecutionProvider::Auto,
            BackendType::Tract => ExecutionProvider::Cpu,
        }
    }

    /// Format a backend and provider back into `backend:provider`
    #[must_use]
    pub fn provider_to_string(backend_type: BackendType, provider: ExecutionProvider) -> String {
        format!("{backend_type}:{provider}")
    }

    /// List every provider combination with its availability on this machine
    ///
    /// Backends compiled out by feature flags are listed as unavailable.
    #[must_use]
    pub fn list_all_providers() -> Vec<ProviderInfo> {
        let mut providers = Vec::new();

        #[cfg(feature = "onnx")]
        {
            let onnx_providers = crate::backends::OnnxBackend::list_providers();
            let any_available = onnx_providers.iter().any(|(_, available, _)| *available);
            providers.push(ProviderInfo {
                name: "onnx:auto".to_string(),
                backend_type: BackendType::Onnx,
                execution_provider: ExecutionProvider::Auto,
                available: any_available,
                description: "ONNX Runtime with auto-selected provider".to_string(),
            });
            for (name, available, description) in onnx_providers {
                let lowered = name.to_lowercase();
                if let Ok((backend_type, execution_provider)) =
                    Self::parse_provider_string(&format!("onnx:{lowered}"))
                {
                    providers.push(ProviderInfo {
                        name: format!("onnx:{lowered}"),
                        backend_type,
                        execution_provider,
                        available,
                        description,
                    });
                }
            }
        }

        #[cfg(not(feature = "onnx"))]
        for provider in [
            ExecutionProvider::Auto,
            ExecutionProvider::Cpu,
            ExecutionProvider::Cuda,
            ExecutionProvider::CoreMl,
        ] {
            providers.push(ProviderInfo {
                name: Self::provider_to_string(BackendType::Onnx, provider),
                backend_type: BackendType::Onnx,
                execution_provider: provider,
                available: false,
                description: "ONNX Runtime (feature disabled)".to_string(),
            });
        }

        #[cfg(feature = "tract")]
        for (name, available, description) in crate::backends::TractBackend::list_providers() {
            providers.push(ProviderInfo {
                name: format!("tract:{}", name.to_lowercase()),
                backend_type: BackendType::Tract,
                execution_provider: ExecutionProvider::Cpu,
                available,
                description,
            });
        }

        #[cfg(not(feature = "tract"))]
        providers.push(ProviderInfo {
            name: "tract:cpu".to_string(),
            backend_type: BackendType::Tract,
            execution_provider: ExecutionProvider::Cpu,
            available: false,
            description: "Pure Rust CPU inference via Tract (feature disabled)".to_string(),
        });

        providers
    }
}
