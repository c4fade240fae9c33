//! Per-child progress tracking.
//!
//! Progress is loaded lazily per child, mutated under a single lock,
//! and written back as one record per child so an update never rewrites
//! anyone else's state.

use crate::entry::ChildId;
use crate::feedback::challenges::TargetSkill;
use crate::feedback::types::FeedbackType;
use crate::kvstore::{KeyValueStore, KvError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Skill levels cap out here.
pub const MAX_SKILL_LEVEL: u8 = 5;

/// Accumulated feedback progress for one child.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackProgress {
    /// Lifetime count of feedback delivered.
    pub feedback_received: u32,
    /// Count of feedback the child acted on.
    pub feedback_implemented: u32,
    /// Ids of completed challenges.
    pub challenges_completed: HashSet<String>,
    /// Per-skill levels, 0 through [`MAX_SKILL_LEVEL`].
    pub skill_progress: HashMap<TargetSkill, u8>,
    /// How often each category has been delivered.
    pub favorite_types: HashMap<FeedbackType, u32>,
    /// Areas flagged for growth, deduplicated.
    pub growth_areas: Vec<String>,
    /// Areas flagged as strengths, deduplicated.
    pub strength_areas: Vec<String>,
    pub last_feedback_date: Option<DateTime<Utc>>,
}

impl FeedbackProgress {
    /// Implementation rate in [0, 1].
    pub fn implementation_rate(&self) -> f64 {
        if self.feedback_received == 0 {
            0.0
        } else {
            f64::from(self.feedback_implemented) / f64::from(self.feedback_received)
        }
    }

    fn push_unique(list: &mut Vec<String>, area: &str) {
        if !list.iter().any(|a| a == area) {
            list.push(area.to_string());
        }
    }
}

/// Tracks and persists per-child progress.
pub struct ProgressTracker {
    kv: Arc<dyn KeyValueStore>,
    state: Mutex<HashMap<ChildId, FeedbackProgress>>,
}

impl ProgressTracker {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Current progress for a child, loading from storage on first use.
    pub async fn progress(&self, child_id: ChildId) -> Result<FeedbackProgress, KvError> {
        let mut state = self.state.lock().await;
        self.load_into(&mut state, child_id).await?;
        Ok(state[&child_id].clone())
    }

    /// Record that a piece of feedback was delivered.
    pub async fn record_feedback_received(
        &self,
        child_id: ChildId,
    ) -> Result<FeedbackProgress, KvError> {
        self.mutate(child_id, |p| {
            p.feedback_received += 1;
            p.last_feedback_date = Some(Utc::now());
        })
        .await
    }

    /// Record that the child acted on feedback of a given category.
    pub async fn record_feedback_implemented(
        &self,
        child_id: ChildId,
        feedback_type: FeedbackType,
    ) -> Result<FeedbackProgress, KvError> {
        self.mutate(child_id, |p| {
            p.feedback_implemented += 1;
            *p.favorite_types.entry(feedback_type).or_insert(0) += 1;
        })
        .await
    }

    /// Mark a challenge complete and bump the targeted skill.
    ///
    /// Idempotent: returns `false` without changing anything when the
    /// challenge was already completed.
    pub async fn record_challenge_completed(
        &self,
        child_id: ChildId,
        challenge_id: &str,
        skill: TargetSkill,
    ) -> Result<bool, KvError> {
        let mut state = self.state.lock().await;
        self.load_into(&mut state, child_id).await?;
        let progress = state.entry(child_id).or_default();
        if !progress.challenges_completed.insert(challenge_id.to_string()) {
            return Ok(false);
        }
        let level = progress.skill_progress.entry(skill).or_insert(0);
        *level = (*level + 1).min(MAX_SKILL_LEVEL);
        self.persist(child_id, progress).await?;
        Ok(true)
    }

    /// Note an area the child should grow in.
    pub async fn record_growth_area(
        &self,
        child_id: ChildId,
        area: &str,
    ) -> Result<FeedbackProgress, KvError> {
        self.mutate(child_id, |p| {
            FeedbackProgress::push_unique(&mut p.growth_areas, area);
        })
        .await
    }

    /// Note an area the child is strong in.
    pub async fn record_strength_area(
        &self,
        child_id: ChildId,
        area: &str,
    ) -> Result<FeedbackProgress, KvError> {
        self.mutate(child_id, |p| {
            FeedbackProgress::push_unique(&mut p.strength_areas, area);
        })
        .await
    }

    async fn mutate(
        &self,
        child_id: ChildId,
        f: impl FnOnce(&mut FeedbackProgress),
    ) -> Result<FeedbackProgress, KvError> {
        let mut state = self.state.lock().await;
        self.load_into(&mut state, child_id).await?;
        let progress = state.entry(child_id).or_default();
        f(progress);
        self.persist(child_id, progress).await?;
        Ok(progress.clone())
    }

    /// Ensure a child's record is present in memory. Must be called with
    /// the state lock held.
    async fn load_into(
        &self,
        state: &mut HashMap<ChildId, FeedbackProgress>,
        child_id: ChildId,
    ) -> Result<(), KvError> {
        if state.contains_key(&child_id) {
            return Ok(());
        }
        let loaded = match self.kv.get(&progress_key(child_id)).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(progress) => progress,
                Err(e) => {
                    warn!(child = %child_id, error = %e, "unreadable progress record; starting fresh");
                    FeedbackProgress::default()
                }
            },
            None => FeedbackProgress::default(),
        };
        state.insert(child_id, loaded);
        Ok(())
    }

    async fn persist(
        &self,
        child_id: ChildId,
        progress: &FeedbackProgress,
    ) -> Result<(), KvError> {
        let value = serde_json::to_value(progress)?;
        self.kv.set(&progress_key(child_id), value).await
    }
}

fn progress_key(child_id: ChildId) -> String {
    format!("progress/{child_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvstore::MemoryKvStore;

    #[tokio::test]
    async fn test_feedback_received_increments_and_stamps() {
        let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
        let child = ChildId::new();

        let p = tracker.record_feedback_received(child).await.unwrap();
        assert_eq!(p.feedback_received, 1);
        assert!(p.last_feedback_date.is_some());
    }

    #[tokio::test]
    async fn test_feedback_implemented_tracks_favorites() {
        let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
        let child = ChildId::new();

        tracker
            .record_feedback_implemented(child, FeedbackType::Encouragement)
            .await
            .unwrap();
        let p = tracker
            .record_feedback_implemented(child, FeedbackType::Encouragement)
            .await
            .unwrap();
        assert_eq!(p.feedback_implemented, 2);
        assert_eq!(p.favorite_types[&FeedbackType::Encouragement], 2);
    }

    #[tokio::test]
    async fn test_challenge_completion_idempotent() {
        let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
        let child = ChildId::new();

        let first = tracker
            .record_challenge_completed(child, "starter-feeling-check", TargetSkill::SelfAwareness)
            .await
            .unwrap();
        let second = tracker
            .record_challenge_completed(child, "starter-feeling-check", TargetSkill::SelfAwareness)
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        let p = tracker.progress(child).await.unwrap();
        assert_eq!(p.challenges_completed.len(), 1);
        assert_eq!(p.skill_progress[&TargetSkill::SelfAwareness], 1);
    }

    #[tokio::test]
    async fn test_skill_level_clamps() {
        let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
        let child = ChildId::new();

        for i in 0..8 {
            tracker
                .record_challenge_completed(
                    child,
                    &format!("challenge-{i}"),
                    TargetSkill::Planning,
                )
                .await
                .unwrap();
        }
        let p = tracker.progress(child).await.unwrap();
        assert_eq!(p.skill_progress[&TargetSkill::Planning], MAX_SKILL_LEVEL);
    }

    #[tokio::test]
    async fn test_growth_areas_deduplicate() {
        let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
        let child = ChildId::new();

        tracker.record_growth_area(child, "fractions").await.unwrap();
        let p = tracker.record_growth_area(child, "fractions").await.unwrap();
        assert_eq!(p.growth_areas, vec!["fractions".to_string()]);
    }

    #[tokio::test]
    async fn test_progress_survives_reload() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let child = ChildId::new();

        {
            let tracker = ProgressTracker::new(kv.clone());
            tracker.record_feedback_received(child).await.unwrap();
            tracker
                .record_feedback_implemented(child, FeedbackType::ReflectionPrompt)
                .await
                .unwrap();
        }

        let tracker = ProgressTracker::new(kv);
        let p = tracker.progress(child).await.unwrap();
        assert_eq!(p.feedback_received, 1);
        assert_eq!(p.feedback_implemented, 1);
        assert!((p.implementation_rate() - 1.0).abs() < f64::EPSILON);
    }
}
