//! Respondent state store.
//!
//! The runtime reads a full snapshot before clustering and writes updated
//! fields back afterwards; everything else about persistence is the store's
//! business. Two implementations are bundled: an in-memory store for tests
//! and embedding, and a JSON-file store so CLI invocations share state.

use crate::cluster::ClusterOutcome;
use crate::panel::respondent::Respondent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// A completed conversation, persisted once the transcript is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: u64,
    pub participant_ids: Vec<u32>,
    pub transcript: String,
    pub recorded_at: DateTime<Utc>,
}

/// Storage collaborator for respondent and conversation state.
#[async_trait]
pub trait RespondentStore: Send + Sync {
    async fn get(&self, id: u32) -> Result<Option<Respondent>>;
    async fn put(&self, respondent: Respondent) -> Result<()>;
    /// All respondents, ordered by id.
    async fn list_all(&self) -> Result<Vec<Respondent>>;
    /// The question currently under discussion.
    async fn question(&self) -> Result<String>;
    async fn set_question(&self, question: &str) -> Result<()>;
    /// Persist a completed conversation, returning its assigned id.
    async fn save_conversation(&self, participant_ids: &[u32], transcript: &str) -> Result<u64>;
    async fn conversation(&self, id: u64) -> Result<Option<ConversationRecord>>;
    /// Replace the stored summaries from the latest clustering run.
    async fn save_clusters(&self, outcome: &ClusterOutcome) -> Result<()>;
    async fn latest_clusters(&self) -> Result<ClusterOutcome>;
}

/// Whole-panel state, shared by both bundled store implementations.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PanelState {
    respondents: BTreeMap<u32, Respondent>,
    question: String,
    conversations: BTreeMap<u64, ConversationRecord>,
    conversation_counter: u64,
    clusters: ClusterOutcome,
}

impl PanelState {
    fn record_conversation(&mut self, participant_ids: &[u32], transcript: &str) -> u64 {
        self.conversation_counter += 1;
        let id = self.conversation_counter;
        self.conversations.insert(
            id,
            ConversationRecord {
                id,
                participant_ids: participant_ids.to_vec(),
                transcript: transcript.to_string(),
                recorded_at: Utc::now(),
            },
        );
        id
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<PanelState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register blank respondents for the given ids.
    pub async fn init_panel(&self, ids: impl IntoIterator<Item = u32>) {
        let mut state = self.state.lock().await;
        for id in ids {
            state.respondents.entry(id).or_insert_with(|| Respondent::new(id));
        }
    }
}

#[async_trait]
impl RespondentStore for MemoryStore {
    async fn get(&self, id: u32) -> Result<Option<Respondent>> {
        Ok(self.state.lock().await.respondents.get(&id).cloned())
    }

    async fn put(&self, respondent: Respondent) -> Result<()> {
        self.state
            .lock()
            .await
            .respondents
            .insert(respondent.id, respondent);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Respondent>> {
        Ok(self.state.lock().await.respondents.values().cloned().collect())
    }

    async fn question(&self) -> Result<String> {
        Ok(self.state.lock().await.question.clone())
    }

    async fn set_question(&self, question: &str) -> Result<()> {
        self.state.lock().await.question = question.to_string();
        Ok(())
    }

    async fn save_conversation(&self, participant_ids: &[u32], transcript: &str) -> Result<u64> {
        Ok(self
            .state
            .lock()
            .await
            .record_conversation(participant_ids, transcript))
    }

    async fn conversation(&self, id: u64) -> Result<Option<ConversationRecord>> {
        Ok(self.state.lock().await.conversations.get(&id).cloned())
    }

    async fn save_clusters(&self, outcome: &ClusterOutcome) -> Result<()> {
        self.state.lock().await.clusters = outcome.clone();
        Ok(())
    }

    async fn latest_clusters(&self) -> Result<ClusterOutcome> {
        Ok(self.state.lock().await.clusters.clone())
    }
}

/// File-backed store: the whole panel state as one JSON document, written
/// through on every mutation.
pub struct JsonStore {
    path: PathBuf,
    state: Mutex<PanelState>,
}

impl JsonStore {
    /// Open the store at `path`, loading existing state if present.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
        }

        let state = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read panel state: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse panel state: {}", path.display()))?
        } else {
            PanelState::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &PanelState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write panel state: {}", self.path.display()))
    }
}

#[async_trait]
impl RespondentStore for JsonStore {
    async fn get(&self, id: u32) -> Result<Option<Respondent>> {
        Ok(self.state.lock().await.respondents.get(&id).cloned())
    }

    async fn put(&self, respondent: Respondent) -> Result<()> {
        let mut state = self.state.lock().await;
        state.respondents.insert(respondent.id, respondent);
        self.persist(&state)
    }

    async fn list_all(&self) -> Result<Vec<Respondent>> {
        Ok(self.state.lock().await.respondents.values().cloned().collect())
    }

    async fn question(&self) -> Result<String> {
        Ok(self.state.lock().await.question.clone())
    }

    async fn set_question(&self, question: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.question = question.to_string();
        self.persist(&state)
    }

    async fn save_conversation(&self, participant_ids: &[u32], transcript: &str) -> Result<u64> {
        let mut state = self.state.lock().await;
        let id = state.record_conversation(participant_ids, transcript);
        self.persist(&state)?;
        Ok(id)
    }

    async fn conversation(&self, id: u64) -> Result<Option<ConversationRecord>> {
        Ok(self.state.lock().await.conversations.get(&id).cloned())
    }

    async fn save_clusters(&self, outcome: &ClusterOutcome) -> Result<()> {
        let mut state = self.state.lock().await;
        state.clusters = outcome.clone();
        self.persist(&state)
    }

    async fn latest_clusters(&self) -> Result<ClusterOutcome> {
        Ok(self.state.lock().await.clusters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        store.init_panel(1..=3).await;

        let mut r = store.get(2).await.unwrap().unwrap();
        r.short_answer = "yes".to_string();
        r.intensity = 0.4;
        store.put(r).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(all[1].short_answer, "yes");
    }

    #[tokio::test]
    async fn test_memory_store_question() {
        let store = MemoryStore::new();
        assert_eq!(store.question().await.unwrap(), "");
        store.set_question("should we?").await.unwrap();
        assert_eq!(store.question().await.unwrap(), "should we?");
    }

    #[tokio::test]
    async fn test_conversation_ids_are_monotonic() {
        let store = MemoryStore::new();
        let first = store.save_conversation(&[1, 2], "a said:\nhi\n\n").await.unwrap();
        let second = store.save_conversation(&[2, 3], "b said:\nyo\n\n").await.unwrap();
        assert!(second > first);

        let record = store.conversation(first).await.unwrap().unwrap();
        assert_eq!(record.participant_ids, vec![1, 2]);
        assert!(record.transcript.contains("hi"));
        assert!(store.conversation(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.json");

        {
            let store = JsonStore::open(path.clone()).unwrap();
            let mut r = Respondent::new(5);
            r.short_answer = "go hiking".to_string();
            store.put(r).await.unwrap();
            store.set_question("weekend plans?").await.unwrap();
        }

        let reopened = JsonStore::open(path).unwrap();
        assert_eq!(reopened.question().await.unwrap(), "weekend plans?");
        let r = reopened.get(5).await.unwrap().unwrap();
        assert_eq!(r.short_answer, "go hiking");
    }
}
