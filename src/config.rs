//! Runtime configuration and tunable defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunables for the clustering pipeline.
///
/// The threshold and round counts are inherited defaults, kept configurable
/// rather than tuned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Minimum cosine similarity to a center required for membership;
    /// anything below lands in the outlier set.
    pub similarity_threshold: f32,
    /// Refinement rounds for the final clustering pass.
    pub final_rounds: usize,
    /// Refinement rounds for the cheaper trial clusterings used while
    /// searching for the cluster count.
    pub trial_rounds: usize,
    /// Lower bound of the cluster-count search.
    pub min_k: usize,
    /// Upper bound of the cluster-count search (further clamped by data size).
    pub max_k: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            final_rounds: 5,
            trial_rounds: 3,
            min_k: 2,
            max_k: 8,
        }
    }
}

/// Tunables for panel orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Cap on concurrent outbound generation calls during the question
    /// fan-out. Bounds load on the provider, not correctness.
    pub max_concurrent_queries: usize,
    /// Total turns in one synthetic conversation.
    pub turn_budget: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: 32,
            turn_budget: 4,
        }
    }
}

/// Default data directory: `~/.agora`.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".agora")
}
