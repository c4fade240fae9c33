//! Journal entry data model.
//!
//! Entries are authored by the journaling UI and owned by its entry
//! store; this crate consumes them immutably. The enums here also carry
//! the fixed lookup tables used for offline metadata synthesis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pseudonymous identifier for a child profile.
///
/// This is the only identifier ever sent to remote collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildId(Uuid);

impl ChildId {
    /// Create a new unique child ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the child reported feeling when writing the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EmotionalState {
    Excited,
    Happy,
    Curious,
    Confident,
    Frustrated,
    Confused,
    Overwhelmed,
    #[default]
    Neutral,
}

impl EmotionalState {
    /// Get the display name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            EmotionalState::Excited => "excited",
            EmotionalState::Happy => "happy",
            EmotionalState::Curious => "curious",
            EmotionalState::Confident => "confident",
            EmotionalState::Frustrated => "frustrated",
            EmotionalState::Confused => "confused",
            EmotionalState::Overwhelmed => "overwhelmed",
            EmotionalState::Neutral => "neutral",
        }
    }

    /// Sentiment score used when the extraction service is unreachable.
    pub fn fallback_sentiment(&self) -> f64 {
        match self {
            EmotionalState::Excited => 0.9,
            EmotionalState::Happy => 0.85,
            EmotionalState::Confident => 0.75,
            EmotionalState::Curious => 0.65,
            EmotionalState::Neutral => 0.5,
            EmotionalState::Confused => 0.35,
            EmotionalState::Frustrated => 0.25,
            EmotionalState::Overwhelmed => 0.15,
        }
    }
}

/// School subject the entry reflects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum JournalSubject {
    Math,
    Science,
    Reading,
    Writing,
    History,
    Art,
    Music,
    #[default]
    Other,
}

impl JournalSubject {
    /// Get the display name for this subject.
    pub fn name(&self) -> &'static str {
        match self {
            JournalSubject::Math => "math",
            JournalSubject::Science => "science",
            JournalSubject::Reading => "reading",
            JournalSubject::Writing => "writing",
            JournalSubject::History => "history",
            JournalSubject::Art => "art",
            JournalSubject::Music => "music",
            JournalSubject::Other => "learning",
        }
    }

    /// Fixed theme triple used when the extraction service is unreachable.
    pub fn fallback_themes(&self) -> [&'static str; 3] {
        match self {
            JournalSubject::Math => ["puzzles", "patterns", "problem solving"],
            JournalSubject::Science => ["discovery", "experiments", "wonder"],
            JournalSubject::Reading => ["stories", "imagination", "new worlds"],
            JournalSubject::Writing => ["ideas", "expression", "creativity"],
            JournalSubject::History => ["the past", "people", "change"],
            JournalSubject::Art => ["color", "creativity", "making things"],
            JournalSubject::Music => ["rhythm", "practice", "harmony"],
            JournalSubject::Other => ["learning", "growth", "effort"],
        }
    }
}

/// Language register used for all feedback templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DevelopmentalMode {
    EarlyChildhood,
    MiddleChildhood,
    Adolescent,
}

impl DevelopmentalMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            DevelopmentalMode::EarlyChildhood => "early childhood",
            DevelopmentalMode::MiddleChildhood => "middle childhood",
            DevelopmentalMode::Adolescent => "adolescent",
        }
    }
}

/// A guided prompt and the child's response to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub response: String,
}

/// A single journal entry.
///
/// Immutable once the pipeline consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Free-text reflection.
    pub content: String,
    /// Self-reported emotional state.
    pub emotional_state: EmotionalState,
    /// Subject the reflection is about.
    pub subject: JournalSubject,
    /// Assignment the entry relates to, if any.
    pub assignment_name: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Guided prompt/response pairs captured alongside the free text.
    pub prompt_responses: Vec<PromptResponse>,
}

impl JournalEntry {
    /// Create a new entry with the current timestamp.
    pub fn new(
        content: impl Into<String>,
        emotional_state: EmotionalState,
        subject: JournalSubject,
    ) -> Self {
        Self {
            id: EntryId::new(),
            content: content.into(),
            emotional_state,
            subject,
            assignment_name: None,
            created_at: Utc::now(),
            prompt_responses: Vec::new(),
        }
    }

    /// Attach an assignment name.
    pub fn with_assignment_name(mut self, name: impl Into<String>) -> Self {
        self.assignment_name = Some(name.into());
        self
    }

    /// Append a guided prompt/response pair.
    pub fn with_prompt_response(
        mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.prompt_responses.push(PromptResponse {
            prompt: prompt.into(),
            response: response.into(),
        });
        self
    }
}
