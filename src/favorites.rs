//! Favorites archive shared by every screen
//!
//! Loaded once at startup and written back wholesale after every mutation.
//! Entries are keyed by word identity (trimmed, case-insensitive) and kept in
//! the order they were saved.

use crate::models::{word_identity, VocabularyEntry};
use crate::storage::KeyValueStore;
use crate::Result;
use chrono::Utc;

/// Key the archive is stored under.
pub const FAVORITES_KEY: &str = "ielts_favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct FavoritesStore {
    store: Box<dyn KeyValueStore>,
    entries: Vec<VocabularyEntry>,
}

impl FavoritesStore {
    /// Read the archive from `store`. A corrupt archive is logged and
    /// replaced by an empty list on the next write.
    pub fn load(store: Box<dyn KeyValueStore>) -> Result<Self> {
        let entries = match store.get(FAVORITES_KEY)? {
            None => Vec::new(),
            Some(json) => match serde_json::from_str::<Vec<VocabularyEntry>>(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Stored favorites are unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
        };

        tracing::debug!("Loaded {} favorites", entries.len());
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.position(word).is_some()
    }

    /// The saved entry for `word`, if any.
    pub fn get(&self, word: &str) -> Option<&VocabularyEntry> {
        self.position(word).map(|index| &self.entries[index])
    }

    fn position(&self, word: &str) -> Option<usize> {
        let identity = word_identity(word);
        self.entries.iter().position(|e| e.identity() == identity)
    }

    /// Add `entry` if its word is absent, otherwise remove the saved one.
    /// This is the only way the archive changes.
    pub fn toggle(&mut self, entry: &VocabularyEntry) -> Result<ToggleOutcome> {
        if self.remove(&entry.word)? {
            Ok(ToggleOutcome::Removed)
        } else {
            self.add(entry)?;
            Ok(ToggleOutcome::Added)
        }
    }

    /// Save `entry` stamped with the current time. Returns `false` when the
    /// word was already saved.
    fn add(&mut self, entry: &VocabularyEntry) -> Result<bool> {
        if self.contains(&entry.word) {
            return Ok(false);
        }

        let mut saved = entry.clone();
        saved.timestamp = Some(Utc::now().timestamp_millis());

        let mut next = self.entries.clone();
        next.push(saved);
        self.commit(next)?;

        tracing::info!("Added '{}' to favorites", entry.word);
        Ok(true)
    }

    /// Remove the saved entry for `word`. Returns `false` when absent.
    fn remove(&mut self, word: &str) -> Result<bool> {
        let Some(index) = self.position(word) else {
            return Ok(false);
        };

        let mut next = self.entries.clone();
        next.remove(index);
        self.commit(next)?;

        tracing::info!("Removed '{}' from favorites", word);
        Ok(true)
    }

    // Memory only changes once the write has succeeded.
    fn commit(&mut self, next: Vec<VocabularyEntry>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.store.set(FAVORITES_KEY, &json)?;
        self.entries = next;
        Ok(())
    }
}
