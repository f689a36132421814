// src/context/mod.rs

//! Caller-owned handle binding a validated configuration to a backend.
//!
//! A context replaces process-wide initialization: each one owns its backend
//! and several may coexist. Every operation of the library is reachable from
//! here, either with explicit options or with the defaults the context was
//! configured with.

use crate::backend::Backend;
use crate::channel::{self, ChannelReport, KeyDistributionOptions, KeyDistributionOutcome};
use crate::config::{BackendConfig, QkitConfig};
use crate::core::Result;
use crate::random;
use crate::search::{self, SearchMatch, SearchOptions, SearchPlan};
use crate::simulation::Simulator;

/// A backend together with the configuration it was validated against.
#[derive(Debug, Clone)]
pub struct QuantumContext<B: Backend> {
    config: QkitConfig,
    backend: B,
}

impl QuantumContext<Simulator> {
    /// Context over a default [`Simulator`].
    pub fn simulator() -> Self {
        Self { config: QkitConfig::default(), backend: Simulator::new() }
    }
}

impl<B: Backend> QuantumContext<B> {
    /// Binds `backend` to `config` after validating the configuration.
    ///
    /// # Errors
    /// * `QkitError::InvalidConfiguration` if `config` is incomplete for its kind.
    pub fn new(config: BackendConfig, backend: B) -> Result<Self> {
        Self::from_config(QkitConfig { backend: config, ..QkitConfig::default() }, backend)
    }

    /// Binds `backend` to a full configuration, including per-operation defaults.
    pub fn from_config(config: QkitConfig, backend: B) -> Result<Self> {
        config.validate()?;
        tracing::debug!(kind = ?config.backend.kind, "Quantum context created");
        Ok(Self { config, backend })
    }

    /// The backend this context drives.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The validated backend description.
    pub fn config(&self) -> &BackendConfig {
        &self.config.backend
    }

    /// Default search options from the configuration.
    pub fn search_options(&self) -> &SearchOptions {
        &self.config.search
    }

    /// Default key distribution options from the configuration.
    pub fn key_options(&self) -> &KeyDistributionOptions {
        &self.config.key_distribution
    }

    /// See [`search::plan`].
    pub fn plan_search<T, P>(&self, items: &[T], predicate: &P, options: &SearchOptions) -> Result<SearchPlan>
    where
        P: Fn(&T) -> bool,
    {
        search::plan(&self.backend, items, predicate, options)
    }

    /// See [`search::search`].
    pub fn search<'a, T, P>(
        &self,
        items: &'a [T],
        predicate: &P,
        options: &SearchOptions,
    ) -> Result<Vec<SearchMatch<'a, T>>>
    where
        P: Fn(&T) -> bool,
    {
        search::search(&self.backend, items, predicate, options)
    }

    /// See [`search::search_one`].
    pub fn search_one<'a, T, P>(&self, items: &'a [T], predicate: &P) -> Result<SearchMatch<'a, T>>
    where
        P: Fn(&T) -> bool,
    {
        search::search_one(&self.backend, items, predicate, &self.config.search)
    }

    /// See [`channel::generate_key`].
    pub fn generate_key(&self, options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome> {
        channel::generate_key(&self.backend, options)
    }

    /// See [`channel::generate_key_with_retries`].
    pub fn generate_key_with_retries(&self, options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome> {
        channel::generate_key_with_retries(&self.backend, options)
    }

    /// See [`channel::verify_channel_security`].
    pub fn verify_channel_security(&self, options: &KeyDistributionOptions) -> Result<ChannelReport> {
        channel::verify_channel_security(&self.backend, options)
    }

    /// See [`random::random_int`].
    pub fn random_int(&self, min: i64, max: i64) -> Result<i64> {
        random::random_int(&self.backend, min, max)
    }

    /// See [`random::random_bytes`].
    pub fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        random::random_bytes(&self.backend, length)
    }
}
