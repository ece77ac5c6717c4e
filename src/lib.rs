//! Agora runtime — a synthetic opinion panel.
//!
//! Pose a question to a roster of AI respondents, embed and cluster their
//! short answers into consensus groups plus the outliers who fit none, and
//! run passion-weighted group conversations that can shift the panel's
//! opinions before the next clustering pass.
//!
//! Generation, embedding, and persistence are collaborators behind traits
//! ([`providers::TextGenerator`], [`providers::EmbeddingProvider`],
//! [`panel::RespondentStore`]); the two entry points are
//! [`survey::Surveyor::ask_panel`] and
//! [`dialogue::Moderator::run_conversation`].

pub mod cli;
pub mod cluster;
pub mod config;
pub mod dialogue;
pub mod panel;
pub mod providers;
pub mod survey;

pub use cluster::{cluster_opinions, ClusterOutcome, ClusterSummary, Opinion, OutlierSummary};
pub use config::{ClusterConfig, PanelConfig};
pub use dialogue::{ConversationOutcome, ConversationTurn, Moderator};
pub use panel::{JsonStore, MemoryStore, Profile, Respondent, RespondentStore, Roster};
pub use providers::{
    EmbeddingProvider, OpenAiClient, OpenAiConfig, OpinionResponse, ProviderError, TextGenerator,
};
pub use survey::{SurveyOutcome, Surveyor};
