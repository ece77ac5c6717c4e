//! Question fan-out and the clustering pipeline.
//!
//! Asking the panel a question is embarrassingly parallel: every
//! respondent's query is an independent pair of generation calls, dispatched
//! concurrently under a semaphore that caps outbound load. One respondent's
//! failure never blocks the rest; the aggregate step proceeds with whatever
//! valid answers came back.

use crate::cluster::{cluster_opinions, ClusterOutcome, Opinion};
use crate::config::ClusterConfig;
use crate::dialogue::prompts;
use crate::panel::respondent::{clamp_intensity, Respondent};
use crate::panel::roster::{Profile, Roster};
use crate::panel::store::RespondentStore;
use crate::providers::{EmbeddingProvider, TextGenerator};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Token budget for the warm-up introduction call.
const THOUGHT_MAX_TOKENS: u32 = 150;

/// Result of asking the panel a question.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyOutcome {
    pub question: String,
    /// How many respondents were asked.
    pub total: usize,
    /// How many failed to produce a usable answer.
    pub failed: usize,
    pub average_intensity: f32,
    pub clustering: ClusterOutcome,
}

/// Runs surveys: fan out a question, then embed, cluster, and persist.
pub struct Surveyor {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn RespondentStore>,
    roster: Arc<Roster>,
    cluster_config: ClusterConfig,
    max_concurrent: usize,
}

impl Surveyor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn RespondentStore>,
        roster: Arc<Roster>,
        cluster_config: ClusterConfig,
        max_concurrent: usize,
    ) -> Self {
        Self {
            generator,
            embedder,
            store,
            roster,
            cluster_config,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn store(&self) -> Arc<dyn RespondentStore> {
        Arc::clone(&self.store)
    }

    pub fn roster(&self) -> Arc<Roster> {
        Arc::clone(&self.roster)
    }

    /// Ask the first `respondent_count` roster members a question, then
    /// cluster the answers.
    ///
    /// Individual query failures are logged and counted, never escalated.
    pub async fn ask_panel(
        &self,
        question: &str,
        respondent_count: usize,
        requested_k: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<SurveyOutcome> {
        self.store
            .set_question(question)
            .await
            .context("respondent store unavailable")?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::new();

        for id in 1..=respondent_count as u32 {
            let Some(profile) = self.roster.get(id) else {
                warn!(id, "no roster profile; skipping respondent");
                continue;
            };

            let generator = Arc::clone(&self.generator);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let profile = profile.clone();
            let question = question.to_string();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = query_respondent(generator, store, id, &profile, &question).await;
                (id, result)
            }));
        }

        let asked = tasks.len();
        let mut failed = respondent_count - asked;
        let mut total_intensity = 0.0f32;

        for task in futures::future::join_all(tasks).await {
            match task {
                Ok((id, Ok(intensity))) => {
                    debug!(id, intensity, "respondent answered");
                    total_intensity += intensity;
                }
                Ok((id, Err(err))) => {
                    warn!(id, %err, "respondent query failed");
                    failed += 1;
                }
                Err(err) => {
                    warn!(%err, "respondent task panicked");
                    failed += 1;
                }
            }
        }

        info!(
            asked,
            failed, "panel queried; clustering answers"
        );

        let clustering = self.recluster(requested_k, rng).await?;

        Ok(SurveyOutcome {
            question: question.to_string(),
            total: respondent_count,
            failed,
            average_intensity: if respondent_count > 0 {
                total_intensity / respondent_count as f32
            } else {
                0.0
            },
            clustering,
        })
    }

    /// Re-cluster every respondent currently holding an answer and persist
    /// the assignments and summaries.
    ///
    /// With no valid answers this returns an empty outcome, not an error.
    pub async fn recluster(
        &self,
        requested_k: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<ClusterOutcome> {
        let all = self
            .store
            .list_all()
            .await
            .context("respondent store unavailable")?;
        let valid: Vec<&Respondent> = all.iter().filter(|r| r.has_answer()).collect();

        if valid.is_empty() {
            let outcome = ClusterOutcome::empty();
            self.store.save_clusters(&outcome).await?;
            return Ok(outcome);
        }

        let answers: Vec<String> = valid.iter().map(|r| r.short_answer.clone()).collect();
        let embeddings = self
            .embedder
            .embed(&answers)
            .await
            .context("embedding provider failed")?;

        let opinions: Vec<Opinion> = valid
            .iter()
            .zip(embeddings)
            .map(|(r, embedding)| Opinion {
                respondent_id: r.id,
                short_answer: r.short_answer.clone(),
                intensity: r.intensity,
                embedding,
            })
            .collect();

        let outcome = cluster_opinions(&opinions, requested_k, &self.cluster_config, rng);
        info!(
            clusters = outcome.clusters.len(),
            outliers = outcome.outliers.count,
            k_used = outcome.k_used,
            "clustering complete"
        );

        // Write assignments back: members get their cluster id, everyone
        // else who was clustered becomes an explicit outlier.
        let mut assignment: HashMap<u32, Option<usize>> =
            valid.iter().map(|r| (r.id, None)).collect();
        for cluster in &outcome.clusters {
            for &id in &cluster.member_ids {
                assignment.insert(id, Some(cluster.id));
            }
        }
        for mut respondent in all {
            if let Some(&cluster) = assignment.get(&respondent.id) {
                respondent.cluster = cluster;
                self.store.put(respondent).await?;
            }
        }
        self.store.save_clusters(&outcome).await?;

        Ok(outcome)
    }
}

/// One respondent's full query: a warm-up introduction, then the structured
/// question. Updates the store on success.
async fn query_respondent(
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn RespondentStore>,
    id: u32,
    profile: &Profile,
    question: &str,
) -> Result<f32> {
    let thought = generator
        .generate(&prompts::introduction(&profile.persona), THOUGHT_MAX_TOKENS)
        .await?;
    let opinion = generator
        .generate_opinion(&prompts::question(&profile.persona, &thought, question))
        .await?;

    let mut respondent = store.get(id).await?.unwrap_or_else(|| Respondent::new(id));
    respondent.context = format!(
        "{}'s initial thoughts:\n{}\n\n",
        profile.name, opinion.response
    );
    respondent.short_answer = opinion.short_answer;
    respondent.intensity = clamp_intensity(opinion.intensity);
    respondent.cluster = None;

    let intensity = respondent.intensity;
    store.put(respondent).await?;
    Ok(intensity)
}
