//! Synthetic group conversations.
//!
//! Turns are strictly sequential: each turn's prompt depends on the
//! transcript accumulated so far, so only the speaker choice is randomized.
//! After the final turn every participant reflects on the discussion and the
//! whole panel is re-clustered — opinions may have shifted.

use super::{prompts, scheduler};
use crate::cluster::ClusterOutcome;
use crate::panel::respondent::{clamp_intensity, Respondent};
use crate::survey::Surveyor;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Token budget for one conversation turn.
const TURN_MAX_TOKENS: u32 = 200;

/// Token budget for a direct one-on-one reply.
const DIRECT_MAX_TOKENS: u32 = 300;

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub speaker_id: u32,
    pub speaker_name: String,
    pub text: String,
}

/// Result of a full conversation run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationOutcome {
    pub conversation_id: u64,
    pub question: String,
    pub turns: Vec<ConversationTurn>,
    /// The turns rendered as one readable transcript.
    pub transcript: String,
    /// Re-clustering of the whole panel after reflections.
    pub clustering: ClusterOutcome,
    /// Participants with their post-conversation answers.
    pub participants: Vec<Respondent>,
}

/// A direct user-to-respondent exchange.
#[derive(Debug, Clone, Serialize)]
pub struct DirectExchange {
    pub respondent_id: u32,
    pub respondent_name: String,
    pub reply: String,
}

/// Drives conversations over the survey runner's collaborators.
pub struct Moderator {
    surveyor: Arc<Surveyor>,
    turn_budget: usize,
}

impl Moderator {
    pub fn new(surveyor: Arc<Surveyor>, turn_budget: usize) -> Self {
        Self {
            surveyor,
            turn_budget,
        }
    }

    /// Run a conversation between the given respondents, collect their final
    /// reflections, and re-cluster the whole panel.
    pub async fn run_conversation(
        &self,
        participant_ids: &[u32],
        rng: &mut StdRng,
    ) -> Result<ConversationOutcome> {
        let store = self.surveyor.store();
        let roster = self.surveyor.roster();
        let generator = self.surveyor.generator();

        let mut participants = Vec::new();
        for &id in participant_ids {
            match store.get(id).await.context("respondent store unavailable")? {
                Some(r) if roster.contains(id) => participants.push(r),
                _ => warn!(id, "unknown respondent excluded from conversation"),
            }
        }
        if participants.is_empty() {
            bail!("no valid participants for conversation");
        }

        let question = store.question().await?;
        let mut turns: Vec<ConversationTurn> = Vec::new();
        let mut last_speaker: Option<u32> = None;

        while turns.len() < self.turn_budget {
            // Fan the latest turn into every participant's private context so
            // the next reply is grounded in what was just said.
            if let Some(latest) = turns.last() {
                for participant in &participants {
                    if let Some(mut r) = store.get(participant.id).await? {
                        r.context = format!(
                            "{}\nConversation:\n\n{} said:\n{}\n",
                            r.context, latest.speaker_name, latest.text
                        );
                        store.put(r).await?;
                    }
                }
            }

            let Some(speaker) = scheduler::pick_speaker(&participants, last_speaker, rng) else {
                break;
            };
            let speaker_id = speaker.id;
            let Some(profile) = roster.get(speaker_id) else {
                break;
            };
            let current = store
                .get(speaker_id)
                .await?
                .unwrap_or_else(|| Respondent::new(speaker_id));

            let prompt = if turns.is_empty() {
                prompts::opening_remarks(&profile.persona, &current.context, &question)
            } else {
                prompts::reply(&profile.persona, &current.context, &question)
            };

            let text = match generator.generate(&prompt, TURN_MAX_TOKENS).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(id = speaker_id, %err, "turn generation failed; ending conversation early");
                    break;
                }
            };

            turns.push(ConversationTurn {
                speaker_id,
                speaker_name: profile.name.clone(),
                text,
            });
            last_speaker = Some(speaker_id);
        }

        let transcript: String = turns
            .iter()
            .map(|t| format!("{} said:\n{}\n\n", t.speaker_name, t.text))
            .collect();
        info!(turns = turns.len(), "conversation finished; collecting reflections");

        // Final reflections: each participant re-answers the question in
        // light of the discussion. A failed reflection keeps the previous
        // answer rather than sinking the run.
        let mut updated = Vec::new();
        for participant in &participants {
            let id = participant.id;
            let Some(respondent) = store.get(id).await? else {
                continue;
            };
            let Some(profile) = roster.get(id) else {
                continue;
            };
            let initial = respondent.initial_thoughts().to_string();

            match generator
                .generate_opinion(&prompts::reflection(
                    &profile.persona,
                    &respondent.context,
                    &question,
                ))
                .await
            {
                Ok(opinion) => {
                    let mut r = respondent;
                    r.context = format!(
                        "{}\nConversation:\n\n{}{} thought:\n{}\n\n",
                        initial, transcript, profile.name, opinion.response
                    );
                    r.short_answer = opinion.short_answer;
                    r.intensity = clamp_intensity(opinion.intensity);
                    store.put(r.clone()).await?;
                    updated.push(r);
                }
                Err(err) => {
                    warn!(id, %err, "final reflection failed; keeping previous answer");
                    updated.push(respondent);
                }
            }
        }

        let clustering = self.surveyor.recluster(None, rng).await?;
        let conversation_id = store.save_conversation(participant_ids, &transcript).await?;

        Ok(ConversationOutcome {
            conversation_id,
            question,
            turns,
            transcript,
            clustering,
            participants: updated,
        })
    }

    /// Direct one-on-one exchange with a single respondent; the exchange is
    /// appended to their private context.
    pub async fn direct_chat(&self, id: u32, message: &str) -> Result<DirectExchange> {
        let store = self.surveyor.store();
        let roster = self.surveyor.roster();
        let generator = self.surveyor.generator();

        let respondent = store
            .get(id)
            .await
            .context("respondent store unavailable")?
            .with_context(|| format!("unknown respondent: {id}"))?;
        let profile = roster
            .get(id)
            .with_context(|| format!("no roster profile for respondent: {id}"))?;

        let reply = generator
            .generate(
                &prompts::direct(&profile.persona, &respondent.context, &profile.name, message),
                DIRECT_MAX_TOKENS,
            )
            .await?;

        let mut r = respondent;
        r.context = format!(
            "{}\nuser asked:\n{}\n\n{} replied:\n{}\n\n",
            r.context, message, profile.name, reply
        );
        store.put(r).await?;

        Ok(DirectExchange {
            respondent_id: id,
            respondent_name: profile.name.clone(),
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterConfig;
    use crate::panel::roster::{Profile, Roster};
    use crate::panel::store::{MemoryStore, RespondentStore};
    use crate::providers::testing::{StubEmbedder, StubGenerator};
    use rand::SeedableRng;

    async fn seeded_panel(store: &MemoryStore) {
        store.init_panel(1..=2).await;
        for (id, name, answer, intensity) in
            [(1, "Ada", "Go hiking", 0.9), (2, "Bo", "Read a book", 0.4)]
        {
            let mut r = store.get(id).await.unwrap().unwrap();
            r.context = format!("{name}'s initial thoughts:\nI have opinions.\n\n");
            r.short_answer = answer.to_string();
            r.intensity = intensity;
            store.put(r).await.unwrap();
        }
    }

    fn build_moderator(store: Arc<MemoryStore>) -> Moderator {
        let roster = Arc::new(Roster::from_profiles(vec![
            Profile {
                name: "Ada".into(),
                persona: "You are Ada.".into(),
            },
            Profile {
                name: "Bo".into(),
                persona: "You are Bo.".into(),
            },
        ]));
        let generator = StubGenerator::default()
            .with_opinion("Ada", "Go hiking", 0.9)
            .with_opinion("Bo", "Read a book", 0.4);
        let embedder = StubEmbedder::new(2)
            .with_vector("Go hiking", vec![1.0, 0.0])
            .with_vector("Read a book", vec![0.0, 1.0]);
        let surveyor = Arc::new(Surveyor::new(
            Arc::new(generator),
            Arc::new(embedder),
            store,
            roster,
            ClusterConfig {
                similarity_threshold: 0.5,
                ..ClusterConfig::default()
            },
            4,
        ));
        Moderator::new(surveyor, 4)
    }

    #[tokio::test]
    async fn test_conversation_never_repeats_speakers_back_to_back() {
        let store = Arc::new(MemoryStore::new());
        seeded_panel(&store).await;
        let moderator = build_moderator(Arc::clone(&store));

        let mut rng = StdRng::seed_from_u64(21);
        let outcome = moderator.run_conversation(&[1, 2], &mut rng).await.unwrap();

        assert_eq!(outcome.turns.len(), 4);
        for pair in outcome.turns.windows(2) {
            assert_ne!(pair[0].speaker_id, pair[1].speaker_id);
        }
    }

    #[tokio::test]
    async fn test_conversation_updates_state_and_reclusters() {
        let store = Arc::new(MemoryStore::new());
        seeded_panel(&store).await;
        let moderator = build_moderator(Arc::clone(&store));

        let mut rng = StdRng::seed_from_u64(8);
        let outcome = moderator.run_conversation(&[1, 2], &mut rng).await.unwrap();

        assert!(outcome.conversation_id >= 1);
        assert!(outcome.transcript.contains("said:"));
        assert_eq!(outcome.participants.len(), 2);

        // Reflections rewrote each participant's context around the shared
        // transcript.
        for id in [1, 2] {
            let r = store.get(id).await.unwrap().unwrap();
            assert!(r.context.contains("Conversation:"));
            assert!(r.context.contains("thought:"));
        }

        // The whole panel was re-partitioned.
        let clustered: usize = outcome.clustering.clusters.iter().map(|c| c.count).sum();
        assert_eq!(clustered + outcome.clustering.outliers.count, 2);

        // And the transcript was persisted.
        let record = store
            .conversation(outcome.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.participant_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_participants_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let moderator = build_moderator(Arc::clone(&store));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(moderator.run_conversation(&[42], &mut rng).await.is_err());
    }

    #[tokio::test]
    async fn test_direct_chat_appends_to_context() {
        let store = Arc::new(MemoryStore::new());
        seeded_panel(&store).await;
        let moderator = build_moderator(Arc::clone(&store));

        let exchange = moderator.direct_chat(1, "What drives you?").await.unwrap();
        assert_eq!(exchange.respondent_name, "Ada");

        let r = store.get(1).await.unwrap().unwrap();
        assert!(r.context.contains("user asked:\nWhat drives you?"));
        assert!(r.context.contains("Ada replied:"));
    }
}
