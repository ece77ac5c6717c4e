//! Aggregation of a finished partition into cluster and outlier summaries.

use super::engine::Partition;
use super::Opinion;
use serde::{Deserialize, Serialize};

/// How many member answers to quote per cluster.
const SAMPLE_ANSWERS: usize = 3;

/// Read-only summary of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster index from the run that produced this summary.
    pub id: usize,
    /// The center opinion's short answer.
    pub representative_answer: String,
    pub member_ids: Vec<u32>,
    pub count: usize,
    pub avg_intensity: f32,
    /// The first few members' answers, in input order.
    pub sample_answers: Vec<String>,
}

/// Respondents whose best center similarity fell below the threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub member_ids: Vec<u32>,
    pub count: usize,
    pub answers: Vec<String>,
}

/// Full result of one clustering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    /// Clusters sorted descending by member count, ties by id ascending.
    pub clusters: Vec<ClusterSummary>,
    pub outliers: OutlierSummary,
    /// Cluster count the run actually used after clamping.
    pub k_used: usize,
}

impl ClusterOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Build summaries from a finished partition.
///
/// Pure and idempotent: the same partition always aggregates to the same
/// summaries. Clusters that ended the run with no members are omitted.
pub fn summarize(opinions: &[Opinion], partition: &Partition) -> ClusterOutcome {
    let mut clusters = Vec::new();

    for c in 0..partition.k {
        let members: Vec<usize> = (0..opinions.len())
            .filter(|&i| partition.assignments[i] == Some(c))
            .collect();
        if members.is_empty() {
            continue;
        }

        let total_intensity: f32 = members.iter().map(|&i| opinions[i].intensity).sum();
        clusters.push(ClusterSummary {
            id: c,
            representative_answer: opinions[partition.centers[c]].short_answer.clone(),
            member_ids: members.iter().map(|&i| opinions[i].respondent_id).collect(),
            count: members.len(),
            avg_intensity: total_intensity / members.len() as f32,
            sample_answers: members
                .iter()
                .take(SAMPLE_ANSWERS)
                .map(|&i| opinions[i].short_answer.clone())
                .collect(),
        });
    }

    // Largest consensus view first.
    clusters.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));

    let outlier_indices: Vec<usize> = (0..opinions.len())
        .filter(|&i| partition.assignments[i].is_none())
        .collect();
    let outliers = OutlierSummary {
        member_ids: outlier_indices
            .iter()
            .map(|&i| opinions[i].respondent_id)
            .collect(),
        count: outlier_indices.len(),
        answers: outlier_indices
            .iter()
            .map(|&i| opinions[i].short_answer.clone())
            .collect(),
    };

    ClusterOutcome {
        clusters,
        outliers,
        k_used: partition.k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::test_opinions;

    fn sample_partition() -> (Vec<Opinion>, Partition) {
        let opinions = test_opinions(&[
            (10, "alpha", 0.8, vec![1.0, 0.0]),
            (11, "beta", 0.6, vec![0.9, 0.1]),
            (12, "gamma", 0.4, vec![0.0, 1.0]),
            (13, "delta", 0.2, vec![-1.0, -1.0]),
        ]);
        let partition = Partition {
            assignments: vec![Some(0), Some(0), Some(1), None],
            centers: vec![0, 2],
            k: 2,
        };
        (opinions, partition)
    }

    #[test]
    fn test_summarize_builds_clusters_and_outliers() {
        let (opinions, partition) = sample_partition();
        let outcome = summarize(&opinions, &partition);

        assert_eq!(outcome.k_used, 2);
        assert_eq!(outcome.clusters.len(), 2);

        // Biggest cluster first.
        assert_eq!(outcome.clusters[0].id, 0);
        assert_eq!(outcome.clusters[0].member_ids, vec![10, 11]);
        assert_eq!(outcome.clusters[0].representative_answer, "alpha");
        assert!((outcome.clusters[0].avg_intensity - 0.7).abs() < 1e-6);
        assert_eq!(outcome.clusters[0].sample_answers, vec!["alpha", "beta"]);

        assert_eq!(outcome.outliers.member_ids, vec![13]);
        assert_eq!(outcome.outliers.count, 1);
        assert_eq!(outcome.outliers.answers, vec!["delta"]);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let (opinions, partition) = sample_partition();
        let first = summarize(&opinions, &partition);
        let second = summarize(&opinions, &partition);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_clusters_are_omitted() {
        let opinions = test_opinions(&[
            (1, "a", 0.5, vec![1.0, 0.0]),
            (2, "b", 0.5, vec![0.9, 0.1]),
        ]);
        let partition = Partition {
            assignments: vec![Some(1), Some(1)],
            centers: vec![0, 1],
            k: 2,
        };
        let outcome = summarize(&opinions, &partition);
        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.clusters[0].id, 1);
    }

    #[test]
    fn test_ties_break_by_cluster_id() {
        let opinions = test_opinions(&[
            (1, "a", 0.5, vec![1.0, 0.0]),
            (2, "b", 0.5, vec![0.0, 1.0]),
        ]);
        let partition = Partition {
            assignments: vec![Some(1), Some(0)],
            centers: vec![1, 0],
            k: 2,
        };
        let outcome = summarize(&opinions, &partition);
        assert_eq!(outcome.clusters[0].id, 0);
        assert_eq!(outcome.clusters[1].id, 1);
    }
}
