//! Center-based opinion partitioning.
//!
//! Unlike classic k-means, cluster centers are always real opinions, never
//! averaged vectors, so every cluster keeps a human-readable representative
//! answer. Each refinement round assigns every opinion to its most similar
//! center (or marks it an outlier below the similarity threshold), then
//! re-selects each center as the member closest to the member mean.

use super::similarity::cosine_similarity;
use super::Opinion;
use rand::Rng;

/// Result of one partitioning run over a slice of opinions.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Cluster index per opinion, `None` marks an outlier.
    pub assignments: Vec<Option<usize>>,
    /// Index into the opinion slice of each cluster's center.
    pub centers: Vec<usize>,
    /// Cluster count actually used after clamping.
    pub k: usize,
}

impl Partition {
    pub fn empty() -> Self {
        Self {
            assignments: Vec::new(),
            centers: Vec::new(),
            k: 0,
        }
    }
}

/// Partition opinions into at most `requested_k` clusters plus outliers.
///
/// A requested count at or above the number of opinions is reduced to
/// `max(1, n/2)` before running. The run is randomized only in its choice
/// of initial centers; a fixed RNG seed gives a fixed result.
pub fn partition<R: Rng>(
    opinions: &[Opinion],
    requested_k: usize,
    threshold: f32,
    rounds: usize,
    rng: &mut R,
) -> Partition {
    let n = opinions.len();
    if n == 0 {
        return Partition::empty();
    }

    let mut k = requested_k.max(1);
    if k >= n {
        k = (n / 2).max(1);
    }

    // Initial centers: k distinct opinions sampled uniformly without replacement.
    let mut centers: Vec<usize> = rand::seq::index::sample(rng, n, k).into_vec();
    let mut assignments: Vec<Option<usize>> = vec![None; n];

    for _ in 0..rounds {
        // Assignment: most similar center wins, outlier below threshold.
        for (i, opinion) in opinions.iter().enumerate() {
            let mut best_cluster = 0;
            let mut best_sim = -1.0f32;
            for (c, &center) in centers.iter().enumerate() {
                let sim = cosine_similarity(&opinion.embedding, &opinions[center].embedding);
                if sim > best_sim {
                    best_sim = sim;
                    best_cluster = c;
                }
            }
            assignments[i] = (best_sim >= threshold).then_some(best_cluster);
        }

        // Center update: the member closest to the member mean becomes the new
        // center. A cluster with no members keeps its previous center and may
        // pick up members in a later round.
        for c in 0..k {
            let members: Vec<usize> = (0..n).filter(|&i| assignments[i] == Some(c)).collect();
            if members.is_empty() {
                continue;
            }
            let mean = mean_embedding(opinions, &members);
            let mut best = members[0];
            let mut best_sim = -1.0f32;
            for &m in &members {
                let sim = cosine_similarity(&opinions[m].embedding, &mean);
                if sim > best_sim {
                    best_sim = sim;
                    best = m;
                }
            }
            centers[c] = best;
        }
    }

    Partition {
        assignments,
        centers,
        k,
    }
}

/// Coordinate-wise mean of the given members' embeddings.
fn mean_embedding(opinions: &[Opinion], members: &[usize]) -> Vec<f32> {
    let dim = opinions[members[0]].embedding.len();
    let mut mean = vec![0.0f32; dim];
    for &m in members {
        for (d, &v) in opinions[m].embedding.iter().enumerate().take(dim) {
            mean[d] += v;
        }
    }
    let count = members.len() as f32;
    for v in &mut mean {
        *v /= count;
    }
    mean
}
