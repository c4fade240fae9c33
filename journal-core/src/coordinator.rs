//! Top-level coordinator wiring the subsystems together.
//!
//! The composition root: everything is injected here, nothing reaches
//! for global state.

use crate::entry::{ChildId, DevelopmentalMode, JournalEntry};
use crate::feedback::{AdaptiveFeedback, FeedbackError, FeedbackPolicyEngine};
use crate::kvstore::{KeyValueStore, KvError};
use crate::narrative::{
    GenerationError, GenerationOutcome, NarrativePipeline, NarrativeService,
    DEFAULT_CONTINUITY_WINDOW,
};
use crate::progress::ProgressTracker;
use crate::story::{StoryGenre, StoryGraphStore};
use crate::streak::{RewardTier, StreakManager};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Errors surfaced from entry processing.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Feedback could not be generated. Retryable from the caller's
    /// point of view.
    #[error("feedback generation failed")]
    FeedbackUnavailable(#[source] FeedbackError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Kv(#[from] KvError),
}

/// Everything produced for one processed journal entry.
#[derive(Debug)]
pub struct EntryOutcome {
    pub feedback: AdaptiveFeedback,
    pub story: GenerationOutcome,
    pub reward: Option<RewardTier>,
}

/// Coordinates feedback, narrative generation, and streaks for each
/// incoming entry.
pub struct Coordinator {
    feedback: FeedbackPolicyEngine,
    pipeline: NarrativePipeline,
    streaks: StreakManager,
    progress: Arc<ProgressTracker>,
}

impl Coordinator {
    pub fn new(
        feedback: FeedbackPolicyEngine,
        pipeline: NarrativePipeline,
        streaks: StreakManager,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            feedback,
            pipeline,
            streaks,
            progress,
        }
    }

    /// Wire a coordinator from a narrative service, a key-value store,
    /// and a directory for the story documents.
    pub async fn assemble(
        service: Arc<dyn NarrativeService>,
        kv: Arc<dyn KeyValueStore>,
        story_dir: impl AsRef<Path>,
    ) -> Result<Self, KvError> {
        let progress = Arc::new(ProgressTracker::new(kv.clone()));
        let feedback = FeedbackPolicyEngine::new(kv.clone(), progress.clone());
        let store = Arc::new(StoryGraphStore::new(story_dir));
        store.load().await;
        let pipeline = NarrativePipeline::new(service, store);
        let streaks = StreakManager::load(kv).await?;
        streaks.check_streak_status().await?;
        Ok(Self::new(feedback, pipeline, streaks, progress))
    }

    /// Process one journal entry end to end: feedback, then a story
    /// chapter, then the streak transition.
    #[instrument(skip_all, fields(child = %child_id))]
    pub async fn process_entry(
        &self,
        entry: &JournalEntry,
        child_id: ChildId,
        mode: DevelopmentalMode,
        genre: StoryGenre,
        cancel: &CancellationToken,
    ) -> Result<EntryOutcome, CoordinatorError> {
        let feedback = self
            .feedback
            .generate_feedback(entry, child_id, mode)
            .await
            .map_err(CoordinatorError::FeedbackUnavailable)?;

        let story = self
            .pipeline
            .generate_chapter(entry, child_id, genre, DEFAULT_CONTINUITY_WINDOW, cancel)
            .await?;

        let reward = self
            .streaks
            .record_insight(&entry.content, entry.subject.name())
            .await?;

        Ok(EntryOutcome {
            feedback,
            story,
            reward,
        })
    }

    /// Mark feedback as acted upon.
    pub async fn mark_feedback_implemented(
        &self,
        child_id: ChildId,
        feedback_type: crate::feedback::FeedbackType,
    ) -> Result<(), CoordinatorError> {
        self.progress
            .record_feedback_implemented(child_id, feedback_type)
            .await?;
        Ok(())
    }

    pub fn feedback(&self) -> &FeedbackPolicyEngine {
        &self.feedback
    }

    pub fn pipeline(&self) -> &NarrativePipeline {
        &self.pipeline
    }

    pub fn streaks(&self) -> &StreakManager {
        &self.streaks
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }
}
