//! Backend selection and file-based configuration.

use crate::channel::KeyDistributionOptions;
use crate::core::Result;
use crate::search::SearchOptions;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Provider settings key naming a custom backend.
pub const PROVIDER_NAME_KEY: &str = "ProviderName";

/// Kind of quantum backend an application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// In-process classical simulation.
    #[default]
    Simulator,
    /// A device reachable at a local endpoint.
    LocalDevice,
    /// A third-party backend identified by its provider settings.
    Custom,
}

/// Describes the backend a context is bound to.
///
/// Only the fields needed to decide whether the description is complete are
/// modelled; transport details belong to the backend implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Which backend to use
    pub kind: BackendKind,
    /// Hostname or address of a local device
    pub endpoint: Option<String>,
    /// Port of a local device
    pub port: Option<u16>,
    /// Region hint for hosted providers
    pub region: Option<String>,
    /// Free-form provider settings, `ProviderName` is required for custom backends
    pub provider_settings: HashMap<String, String>,
}

impl BackendConfig {
    /// Configuration for the built-in simulator.
    pub fn simulator() -> Self {
        Self::default()
    }

    /// Configuration for a local device at `endpoint`.
    pub fn local_device(endpoint: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            kind: BackendKind::LocalDevice,
            endpoint: Some(endpoint.into()),
            port,
            ..Self::default()
        }
    }

    /// Configuration for a custom provider.
    pub fn custom(provider_name: impl Into<String>) -> Self {
        let mut provider_settings = HashMap::new();
        provider_settings.insert(PROVIDER_NAME_KEY.to_string(), provider_name.into());
        Self {
            kind: BackendKind::Custom,
            provider_settings,
            ..Self::default()
        }
    }

    /// Name of the custom provider, if one is set and non-empty.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider_settings
            .get(PROVIDER_NAME_KEY)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Checks the configuration is complete for its backend kind.
    pub fn validate(&self) -> Result<()> {
        validation::validate_backend_config(self)
    }
}

/// Complete configuration file: backend plus default options for each operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QkitConfig {
    /// Backend description
    pub backend: BackendConfig,
    /// Defaults for search requests
    pub search: SearchOptions,
    /// Defaults for key distribution requests
    pub key_distribution: KeyDistributionOptions,
}

impl QkitConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        validation::validate_search_options(&self.search)?;
        validation::validate_key_options(&self.key_distribution)?;
        Ok(())
    }
}
