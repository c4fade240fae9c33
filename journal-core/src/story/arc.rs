//! Continuity arcs: condensed records of generated chapters.

use super::chapter::{ChapterId, StoryChapter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum characters of chapter text carried into an arc summary.
const SUMMARY_CHARS: usize = 100;

/// Unique identifier for a story arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArcId(Uuid);

impl ArcId {
    /// Create a new unique arc ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArcId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A condensed record of a previously generated chapter, kept as
/// context for future generation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: ArcId,
    /// Truncated chapter text.
    pub summary: String,
    pub chapter_id: ChapterId,
    pub timestamp: DateTime<Utc>,
    pub themes: Vec<String>,
}

impl StoryArc {
    /// Derive an arc from a freshly generated chapter.
    pub fn from_chapter(chapter: &StoryChapter, themes: &[String]) -> Self {
        Self {
            id: ArcId::new(),
            summary: truncate_chars(&chapter.text, SUMMARY_CHARS),
            chapter_id: chapter.id.clone(),
            timestamp: Utc::now(),
            themes: themes.to_vec(),
        }
    }
}

/// Unicode-safe truncation by character count.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
