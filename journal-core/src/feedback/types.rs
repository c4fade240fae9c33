//! Feedback categories and the composed feedback payload.

use crate::feedback::challenges::MetacognitiveChallenge;
use crate::feedback::support::LearningSupport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// The eight feedback categories the policy engine selects among.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackType {
    /// General positive reinforcement.
    Encouragement,
    /// Observations about the child's thinking process.
    MetacognitiveInsight,
    /// Naming and validating the expressed emotion.
    EmotionalAwareness,
    /// A gentle push toward a stretch area.
    GrowthOpportunity,
    /// Marking a sustained-engagement milestone.
    CelebrationOfProgress,
    /// An open question inviting deeper reflection.
    ReflectionPrompt,
    /// Concrete help when the entry signals struggle.
    SupportiveIntervention,
    /// Practice aimed at a specific reflective skill.
    SkillBuilding,
}

impl FeedbackType {
    /// Display name for UI surfaces.
    pub fn name(&self) -> &'static str {
        match self {
            FeedbackType::Encouragement => "Encouragement",
            FeedbackType::MetacognitiveInsight => "Metacognitive Insight",
            FeedbackType::EmotionalAwareness => "Emotional Awareness",
            FeedbackType::GrowthOpportunity => "Growth Opportunity",
            FeedbackType::CelebrationOfProgress => "Celebration of Progress",
            FeedbackType::ReflectionPrompt => "Reflection Prompt",
            FeedbackType::SupportiveIntervention => "Supportive Intervention",
            FeedbackType::SkillBuilding => "Skill Building",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Composed feedback
// ============================================================================

/// A fully composed piece of adaptive feedback for one journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveFeedback {
    pub id: FeedbackId,
    /// The child the feedback is addressed to.
    pub child_id: crate::entry::ChildId,
    /// The entry this feedback responds to.
    pub entry_id: crate::entry::EntryId,
    pub feedback_type: FeedbackType,
    /// Main body, rendered from a developmental-mode template.
    pub content: String,
    /// Additional context shown under the message, when the category
    /// warrants it.
    pub supporting_details: Option<String>,
    /// Open questions inviting a follow-up reflection.
    pub follow_up_prompts: Vec<String>,
    /// Concrete next steps, for intervention feedback.
    pub suggested_strategies: Vec<String>,
    /// What milestone is being celebrated, for celebration feedback.
    pub celebrated_progress: Option<String>,
    /// An optional challenge attached to the feedback.
    pub challenge: Option<MetacognitiveChallenge>,
    /// An optional learning support attached when struggle was detected.
    pub support: Option<LearningSupport>,
    /// The developmental mode the message was rendered for.
    pub developmental_mode: crate::entry::DevelopmentalMode,
    pub created_at: DateTime<Utc>,
}
