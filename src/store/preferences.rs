use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PreferenceKind {
    Likes,
    Dislikes,
    Allergies,
}

impl PreferenceKind {
    pub const ALL: [PreferenceKind; 3] = [
        PreferenceKind::Likes,
        PreferenceKind::Dislikes,
        PreferenceKind::Allergies,
    ];

    /// Storage key the list is persisted under.
    pub fn key(self) -> &'static str {
        match self {
            PreferenceKind::Likes => "likes",
            PreferenceKind::Dislikes => "dislikes",
            PreferenceKind::Allergies => "allergies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreferenceKind::Likes => "好きな食材・味",
            PreferenceKind::Dislikes => "苦手なもの",
            PreferenceKind::Allergies => "アレルギー",
        }
    }
}

/// The user's three term lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub allergies: Vec<String>,
}

impl Preferences {
    pub fn list(&self, kind: PreferenceKind) -> &[String] {
        match kind {
            PreferenceKind::Likes => &self.likes,
            PreferenceKind::Dislikes => &self.dislikes,
            PreferenceKind::Allergies => &self.allergies,
        }
    }

    fn list_mut(&mut self, kind: PreferenceKind) -> &mut Vec<String> {
        match kind {
            PreferenceKind::Likes => &mut self.likes,
            PreferenceKind::Dislikes => &mut self.dislikes,
            PreferenceKind::Allergies => &mut self.allergies,
        }
    }
}

#[derive(Debug)]
pub struct PreferenceStore<S: KeyValueStore> {
    backend: S,
    preferences: Preferences,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Loads all three lists. A missing or malformed list is treated as empty.
    pub fn open(backend: S) -> Self {
        let mut preferences = Preferences::default();
        for kind in PreferenceKind::ALL {
            *preferences.list_mut(kind) = load_list(&backend, kind.key());
        }
        Self {
            backend,
            preferences,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Adds a trimmed term. Blank input and exact duplicates are ignored.
    pub fn add(&mut self, kind: PreferenceKind, value: &str) -> Result<bool> {
        let value = value.trim();
        if value.is_empty() || self.preferences.list(kind).iter().any(|v| v == value) {
            return Ok(false);
        }
        let mut next = self.preferences.list(kind).to_vec();
        next.push(value.to_string());
        self.commit(kind, next)?;
        Ok(true)
    }

    /// Removes every exact occurrence of `value`. Unknown terms are a no-op.
    pub fn remove(&mut self, kind: PreferenceKind, value: &str) -> Result<bool> {
        if !self.preferences.list(kind).iter().any(|v| v == value) {
            return Ok(false);
        }
        let next: Vec<String> = self
            .preferences
            .list(kind)
            .iter()
            .filter(|v| *v != value)
            .cloned()
            .collect();
        self.commit(kind, next)?;
        Ok(true)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn commit(&mut self, kind: PreferenceKind, next: Vec<String>) -> Result<()> {
        let serialized = serde_json::to_vec(&next)?;
        self.backend.set(kind.key(), &serialized)?;
        debug!("Saved {} term(s) under '{}'", next.len(), kind.key());
        *self.preferences.list_mut(kind) = next;
        Ok(())
    }
}

fn load_list<S: KeyValueStore>(backend: &S, key: &str) -> Vec<String> {
    let bytes = match backend.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read '{}', using an empty list: {}", key, e);
            return Vec::new();
        }
    };
    match serde_json::from_slice::<Vec<String>>(&bytes) {
        Ok(list) => list,
        Err(e) => {
            warn!("Stored '{}' is not a list of strings, using an empty list: {}", key, e);
            Vec::new()
        }
    }
}
