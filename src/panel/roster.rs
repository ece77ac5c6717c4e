//! Read-only persona roster.
//!
//! Profiles load once from JSON files and the finished roster is handed to
//! every component that needs it; nothing in the runtime holds global
//! mutable profile state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Key prefix for roster entries in the JSON files.
const KEY_PREFIX: &str = "respondent_";

/// A persona: who a respondent is, for prompt grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub persona: String,
}

/// Immutable id → profile lookup.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    profiles: BTreeMap<u32, Profile>,
}

impl Roster {
    /// Load profiles from up to three JSON files in priority order.
    ///
    /// The primary and secondary files are maps of `respondent_NNNN` keys to
    /// `{name, persona}` objects; entries are taken in key order and assigned
    /// sequential ids starting at 1. The fallback file carries explicit ids
    /// in its keys and only fills ids not already present (its entries may
    /// use `description` in place of `persona`). A missing or unreadable
    /// file is logged and skipped.
    pub fn load(primary: &Path, secondary: Option<&Path>, fallback: Option<&Path>) -> Self {
        let mut profiles = BTreeMap::new();
        let mut next_id: u32 = 1;

        for path in [Some(primary), secondary].into_iter().flatten() {
            match load_numbered(path) {
                Ok(loaded) => {
                    let count = loaded.len();
                    for profile in loaded {
                        profiles.insert(next_id, profile);
                        next_id += 1;
                    }
                    info!(path = %path.display(), count, "loaded roster file");
                }
                Err(err) => warn!(path = %path.display(), %err, "skipping roster file"),
            }
        }

        if let Some(path) = fallback {
            match load_keyed(path) {
                Ok(loaded) => {
                    let mut added = 0;
                    for (id, profile) in loaded {
                        if !profiles.contains_key(&id) {
                            profiles.insert(id, profile);
                            added += 1;
                        }
                    }
                    info!(path = %path.display(), added, "filled from fallback roster");
                }
                Err(err) => warn!(path = %path.display(), %err, "skipping fallback roster"),
            }
        }

        Self { profiles }
    }

    /// Build a roster directly from profiles, ids assigned from 1.
    pub fn from_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .enumerate()
                .map(|(i, p)| (i as u32 + 1, p))
                .collect(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&Profile> {
        self.profiles.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.profiles.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.profiles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    name: Option<String>,
    persona: Option<String>,
    description: Option<String>,
}

/// Load a primary/secondary roster file: entries in key order, both fields
/// required.
fn load_numbered(path: &Path) -> Result<Vec<Profile>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file: {}", path.display()))?;
    let map: BTreeMap<String, RawProfile> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse roster file: {}", path.display()))?;

    Ok(map
        .into_iter()
        .filter(|(key, _)| key.starts_with(KEY_PREFIX))
        .filter_map(|(_, raw)| match (raw.name, raw.persona) {
            (Some(name), Some(persona)) => Some(Profile { name, persona }),
            _ => None,
        })
        .collect())
}

/// Load a fallback roster file: ids come from the key suffix, `description`
/// substitutes for a missing persona.
fn load_keyed(path: &Path) -> Result<Vec<(u32, Profile)>> {
    #[derive(Deserialize)]
    struct Keyed {
        respondents: BTreeMap<String, RawProfile>,
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file: {}", path.display()))?;
    let keyed: Keyed = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse roster file: {}", path.display()))?;

    Ok(keyed
        .respondents
        .into_iter()
        .filter_map(|(key, raw)| {
            let id: u32 = key.strip_prefix(KEY_PREFIX)?.parse().ok()?;
            let persona = raw.persona.or(raw.description).unwrap_or_default();
            let name = raw.name.unwrap_or_else(|| format!("Respondent {id}"));
            Some((id, Profile { name, persona }))
        })
        .collect())
}
