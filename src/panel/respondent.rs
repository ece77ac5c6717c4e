//! Respondent records.

use serde::{Deserialize, Serialize};

/// One member of the panel.
///
/// `context` is the respondent's accumulated private transcript — initial
/// thoughts, overheard conversation, direct exchanges — used to ground every
/// later generation call. The cluster assignment is transient: it reflects
/// the latest clustering run and is overwritten by the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Respondent {
    pub id: u32,
    pub context: String,
    /// Current short answer to the active question; empty excludes the
    /// respondent from clustering.
    pub short_answer: String,
    /// How strongly the respondent holds their view, in [0, 1].
    pub intensity: f32,
    /// Cluster index from the latest run; `None` when outlier or unassigned.
    pub cluster: Option<usize>,
}

impl Respondent {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            context: String::new(),
            short_answer: String::new(),
            intensity: 0.0,
            cluster: None,
        }
    }

    /// Whether this respondent has an answer worth clustering.
    pub fn has_answer(&self) -> bool {
        !self.short_answer.trim().is_empty()
    }

    /// The part of the context recorded before any conversation was appended.
    pub fn initial_thoughts(&self) -> &str {
        self.context
            .split("\nConversation:")
            .next()
            .unwrap_or(&self.context)
    }
}

/// Clamp an intensity arriving from an external source into [0, 1].
pub fn clamp_intensity(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
