//! Configuration for the document store.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Tunable parameters for the document store and query engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Default number of results for queries that do not pass an explicit `k`.
    pub default_top_k: usize,
    /// Over-fetch multiplier for hybrid search: the semantic stage fetches
    /// `overfetch_factor * k` candidates before lexical re-ranking.
    pub overfetch_factor: usize,
    /// Default chunk size for batched ingestion.
    pub default_batch_size: usize,
    /// Default keyword weight for hybrid search, in [0, 1].
    pub default_keyword_weight: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            overfetch_factor: 2,
            default_batch_size: 100,
            default_keyword_weight: 0.3,
        }
    }
}

impl StoreConfig {
    /// Create a new builder for constructing a [`StoreConfig`].
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`StoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the default number of query results.
    pub fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Set the hybrid search over-fetch multiplier.
    pub fn overfetch_factor(mut self, factor: usize) -> Self {
        self.config.overfetch_factor = factor;
        self
    }

    /// Set the default ingestion chunk size.
    pub fn default_batch_size(mut self, size: usize) -> Self {
        self.config.default_batch_size = size;
        self
    }

    /// Set the default keyword weight for hybrid search.
    pub fn default_keyword_weight(mut self, weight: f32) -> Self {
        self.config.default_keyword_weight = weight;
        self
    }

    /// Build the [`StoreConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if:
    /// - `default_top_k == 0`
    /// - `overfetch_factor == 0`
    /// - `default_batch_size == 0`
    /// - `default_keyword_weight` is outside [0, 1]
    pub fn build(self) -> Result<StoreConfig> {
        if self.config.default_top_k == 0 {
            return Err(StoreError::Config("default_top_k must be greater than zero".to_string()));
        }
        if self.config.overfetch_factor == 0 {
            return Err(StoreError::Config(
                "overfetch_factor must be greater than zero".to_string(),
            ));
        }
        if self.config.default_batch_size == 0 {
            return Err(StoreError::Config(
                "default_batch_size must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.config.default_keyword_weight) {
            return Err(StoreError::Config(format!(
                "default_keyword_weight ({}) must be within [0, 1]",
                self.config.default_keyword_weight
            )));
        }
        Ok(self.config)
    }
}
