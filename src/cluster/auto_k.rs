//! Silhouette-driven selection of the cluster count.
//!
//! Trial clusterings are deliberately cheaper than the final pass (fewer
//! refinement rounds) — the search only needs a relative ranking across
//! candidate counts, not a converged partition.

use super::{engine, silhouette};
use crate::config::ClusterConfig;
use crate::cluster::Opinion;
use rand::Rng;
use tracing::debug;

/// Pick the cluster count in `[min_k, max_k]` with the best mean silhouette.
///
/// `max_k` is clamped to `min(max_k, n/3, 10)` and raised back to `min_k`
/// if the clamp pushed it below. With fewer opinions than `min_k` the search
/// is skipped entirely and `max(1, n/2)` is returned. The first count to
/// reach the best score wins ties.
pub fn select_k<R: Rng>(opinions: &[Opinion], config: &ClusterConfig, rng: &mut R) -> usize {
    let n = opinions.len();
    if n < config.min_k {
        return (n / 2).max(1);
    }

    let mut max_k = config.max_k.min(n / 3).min(10);
    if max_k < config.min_k {
        max_k = config.min_k;
    }

    let mut best_k = config.min_k;
    let mut best_score = -1.0f32;

    for k in config.min_k..=max_k {
        let trial = engine::partition(
            opinions,
            k,
            config.similarity_threshold,
            config.trial_rounds,
            rng,
        );
        let score = silhouette::mean_silhouette(opinions, &trial.assignments);
        debug!(k, score, "trial clustering scored");
        if score > best_score {
            best_score = score;
            best_k = k;
        }
    }

    debug!(best_k, best_score, "selected cluster count");
    best_k
}
