//! The adaptive feedback policy engine.
//!
//! Classifies a journal entry into a feedback category with a fixed
//! rule table, renders a developmental-mode template, and attaches
//! challenges and learning supports where the rules call for them.

use crate::entry::{ChildId, DevelopmentalMode, EmotionalState, JournalEntry};
use crate::feedback::challenges::{select_challenge_with_rng, MetacognitiveChallenge};
use crate::feedback::support::{matched_struggle_keyword, select_support_with_rng, LearningSupport};
use crate::feedback::templates::{
    encouragement_prefix_with_rng, follow_up_prompts, templates_for,
};
use crate::feedback::types::{AdaptiveFeedback, FeedbackId, FeedbackType};
use crate::kvstore::{KeyValueStore, KvError};
use crate::progress::{FeedbackProgress, ProgressTracker};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Errors from feedback generation.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// No template is registered for the selected category. The only
    /// hard, user-visible failure on this path; retryable at the caller
    /// boundary.
    #[error("no template registered for feedback category {0}")]
    NoTemplate(FeedbackType),

    #[error(transparent)]
    Kv(#[from] KvError),
}

/// The feedback policy engine.
pub struct FeedbackPolicyEngine {
    kv: Arc<dyn KeyValueStore>,
    progress: Arc<ProgressTracker>,
    /// Serializes per-child history read-modify-write.
    history_lock: Mutex<()>,
}

impl FeedbackPolicyEngine {
    pub fn new(kv: Arc<dyn KeyValueStore>, progress: Arc<ProgressTracker>) -> Self {
        Self {
            kv,
            progress,
            history_lock: Mutex::new(()),
        }
    }

    /// Generate adaptive feedback for an entry.
    ///
    /// Appends the result to the child's history and records the
    /// feedback-received transition before returning.
    pub async fn generate_feedback(
        &self,
        entry: &JournalEntry,
        child_id: ChildId,
        mode: DevelopmentalMode,
    ) -> Result<AdaptiveFeedback, FeedbackError> {
        let progress = self.progress.progress(child_id).await?;

        // All random draws happen synchronously; the RNG never crosses
        // an await point.
        let feedback = {
            let mut rng = rand::thread_rng();
            self.compose_with_rng(entry, child_id, mode, &progress, &mut rng)?
        };

        self.append_history(child_id, &feedback).await?;
        self.progress.record_feedback_received(child_id).await?;

        debug!(
            child = %child_id,
            category = %feedback.feedback_type,
            has_challenge = feedback.challenge.is_some(),
            has_support = feedback.support.is_some(),
            "feedback generated"
        );
        Ok(feedback)
    }

    /// Classify an entry into a category. First matching rule wins.
    pub fn select_category<R: Rng>(
        entry: &JournalEntry,
        progress: &FeedbackProgress,
        rng: &mut R,
    ) -> FeedbackType {
        let text = entry.content.to_lowercase();
        if entry.emotional_state != EmotionalState::Neutral {
            FeedbackType::EmotionalAwareness
        } else if text.contains("think") || text.contains("learn") {
            FeedbackType::MetacognitiveInsight
        } else if text.contains("hard") || text.contains("difficult") {
            FeedbackType::SupportiveIntervention
        } else if progress.feedback_received > 0 && progress.feedback_received % 5 == 0 {
            FeedbackType::CelebrationOfProgress
        } else if rng.gen_bool(0.5) {
            FeedbackType::Encouragement
        } else {
            FeedbackType::ReflectionPrompt
        }
    }

    /// Compose feedback from an entry, progress snapshot, and random
    /// source. Pure apart from the RNG, so tests can drive it with a
    /// fixed seed.
    pub fn compose_with_rng<R: Rng>(
        &self,
        entry: &JournalEntry,
        child_id: ChildId,
        mode: DevelopmentalMode,
        progress: &FeedbackProgress,
        rng: &mut R,
    ) -> Result<AdaptiveFeedback, FeedbackError> {
        let category = Self::select_category(entry, progress, rng);

        let templates = templates_for(category);
        let template = templates
            .choose(rng)
            .ok_or(FeedbackError::NoTemplate(category))?;

        let emotion = entry.emotional_state.name().to_lowercase();
        let topic = entry.subject.name();
        let prefix = encouragement_prefix_with_rng(mode, rng);
        let content = format!("{prefix}{}", template.render(mode, &emotion, topic));

        let prompts = follow_up_prompts(category);
        let follow_up_prompts = prompts[..2].iter().map(|p| p.to_string()).collect();

        let challenge = self.maybe_challenge(category, progress, rng);
        let support = self.maybe_support(entry, rng);

        let supporting_details = match category {
            FeedbackType::EmotionalAwareness => Some(format!(
                "Feeling {emotion} while working on {topic} is completely normal. \
                 Naming the feeling is the first step to working with it."
            )),
            _ => None,
        };

        let suggested_strategies = match category {
            FeedbackType::SupportiveIntervention => vec![
                "Break the task into the smallest piece you can do right now.".to_string(),
                "Explain the stuck point out loud, to a person or to your journal.".to_string(),
            ],
            _ => Vec::new(),
        };

        let celebrated_progress = match category {
            FeedbackType::CelebrationOfProgress => Some(format!(
                "You've received feedback {} times. That's a real reflection habit!",
                progress.feedback_received
            )),
            _ => None,
        };

        Ok(AdaptiveFeedback {
            id: FeedbackId::new(),
            child_id,
            entry_id: entry.id,
            feedback_type: category,
            content,
            supporting_details,
            follow_up_prompts,
            suggested_strategies,
            celebrated_progress,
            challenge,
            support,
            developmental_mode: mode,
            created_at: Utc::now(),
        })
    }

    /// Feedback history for a child, oldest first.
    pub async fn feedback_history(
        &self,
        child_id: ChildId,
    ) -> Result<Vec<AdaptiveFeedback>, KvError> {
        let _guard = self.history_lock.lock().await;
        self.load_history(child_id).await
    }

    fn maybe_challenge<R: Rng>(
        &self,
        category: FeedbackType,
        progress: &FeedbackProgress,
        rng: &mut R,
    ) -> Option<MetacognitiveChallenge> {
        let include = progress.feedback_received % 3 == 0
            || category == FeedbackType::GrowthOpportunity;
        if !include {
            return None;
        }
        select_challenge_with_rng(
            progress.feedback_received,
            &progress.challenges_completed,
            rng,
        )
    }

    fn maybe_support<R: Rng>(&self, entry: &JournalEntry, rng: &mut R) -> Option<LearningSupport> {
        let (_, support_type) = matched_struggle_keyword(&entry.content)?;
        select_support_with_rng(support_type, rng)
    }

    async fn append_history(
        &self,
        child_id: ChildId,
        feedback: &AdaptiveFeedback,
    ) -> Result<(), KvError> {
        let _guard = self.history_lock.lock().await;
        let mut history = self.load_history(child_id).await?;
        history.push(feedback.clone());
        let value = serde_json::to_value(&history)?;
        self.kv.set(&history_key(child_id), value).await
    }

    async fn load_history(&self, child_id: ChildId) -> Result<Vec<AdaptiveFeedback>, KvError> {
        match self.kv.get(&history_key(child_id)).await? {
            Some(Value::Array(items)) => {
                let mut history = Vec::with_capacity(items.len());
                for item in items {
                    // Skip records written by an older shape rather than
                    // losing the whole history.
                    if let Ok(feedback) = serde_json::from_value(item) {
                        history.push(feedback);
                    }
                }
                Ok(history)
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn history_key(child_id: ChildId) -> String {
    format!("feedback/{child_id}")
}
