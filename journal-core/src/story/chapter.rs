//! Generated story chapters.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a story chapter.
///
/// String-backed: the generation service assigns its own chapter IDs,
/// and locally generated fallback chapters mint a fresh UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(String);

impl ChapterId {
    /// Mint a new local chapter ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an ID assigned by the generation service.
    pub fn from_remote(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Narrative genre for chapter generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StoryGenre {
    Fantasy,
    Mystery,
    Adventure,
    SciFi,
    #[default]
    General,
}

impl StoryGenre {
    /// Wire name used in requests to the generation service.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryGenre::Fantasy => "fantasy",
            StoryGenre::Mystery => "mystery",
            StoryGenre::Adventure => "adventure",
            StoryGenre::SciFi => "scifi",
            StoryGenre::General => "general",
        }
    }
}

impl fmt::Display for StoryGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated story chapter.
///
/// Immutable once produced, whether by the remote collaborator or by
/// the local fallback generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryChapter {
    pub id: ChapterId,
    pub title: String,
    pub text: String,
    pub cliffhanger: String,
}

impl StoryChapter {
    /// Build a chapter from a generation service response.
    pub fn from_response(response: muse::ChapterResponse, title: impl Into<String>) -> Self {
        Self {
            id: ChapterId::from_remote(response.chapter_id),
            title: title.into(),
            text: response.text,
            cliffhanger: response.cliffhanger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_from_response() {
        let response = muse::ChapterResponse {
            chapter_id: "remote-7".to_string(),
            text: "The quest continued.".to_string(),
            cliffhanger: "But what lurked beyond the hill?".to_string(),
            student_name: None,
            feedback: None,
        };

        let chapter = StoryChapter::from_response(response, "Chapter Seven");
        assert_eq!(chapter.id.as_str(), "remote-7");
        assert_eq!(chapter.title, "Chapter Seven");
    }

    #[test]
    fn test_genre_wire_names() {
        assert_eq!(StoryGenre::SciFi.as_str(), "scifi");
        assert_eq!(StoryGenre::General.as_str(), "general");
    }
}
