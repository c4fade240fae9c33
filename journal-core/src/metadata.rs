//! Entry metadata and its offline synthesis.
//!
//! Metadata is transient: it is never persisted on its own, only
//! embedded in a story node snapshot.

use crate::entry::JournalEntry;
use serde::{Deserialize, Serialize};

/// Metadata describing one journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Sentiment score in [0.0, 1.0], 0.5 being neutral.
    pub sentiment: f64,
    pub themes: Vec<String>,
    pub entities: Vec<String>,
    pub key_phrases: Vec<String>,
}

impl EntryMetadata {
    /// Synthesize metadata deterministically when the extraction
    /// collaborator is unreachable.
    ///
    /// Themes come from the fixed subject table, sentiment from the
    /// fixed emotional-state table, and entities/key phrases from the
    /// assignment name when one is present.
    pub fn fallback_for(entry: &JournalEntry) -> Self {
        let themes = entry
            .subject
            .fallback_themes()
            .iter()
            .map(|t| t.to_string())
            .collect();

        let (entities, key_phrases) = match entry.assignment_name.as_deref() {
            Some(name) if !name.trim().is_empty() => {
                (vec![name.to_string()], vec![name.to_string()])
            }
            _ => (Vec::new(), Vec::new()),
        };

        Self {
            sentiment: entry.emotional_state.fallback_sentiment(),
            themes,
            entities,
            key_phrases,
        }
    }

    /// Coarse sentiment label used by store filters.
    pub fn sentiment_label(&self) -> &'static str {
        if self.sentiment >= 0.6 {
            "positive"
        } else if self.sentiment > 0.4 {
            "neutral"
        } else {
            "negative"
        }
    }
}

impl From<muse::ExtractedMetadata> for EntryMetadata {
    fn from(remote: muse::ExtractedMetadata) -> Self {
        Self {
            sentiment: remote.sentiment,
            themes: remote.themes,
            entities: remote.entities,
            key_phrases: remote.key_phrases,
        }
    }
}

impl From<&EntryMetadata> for muse::ExtractedMetadata {
    fn from(metadata: &EntryMetadata) -> Self {
        Self {
            sentiment: metadata.sentiment,
            themes: metadata.themes.clone(),
            entities: metadata.entities.clone(),
            key_phrases: metadata.key_phrases.clone(),
        }
    }
}
