//! Progress tracker invariants under concurrency and reload.

use journal_core::entry::ChildId;
use journal_core::feedback::challenges::TargetSkill;
use journal_core::kvstore::{FileKvStore, KeyValueStore, MemoryKvStore};
use journal_core::progress::{ProgressTracker, MAX_SKILL_LEVEL};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn concurrent_same_challenge_counts_once() {
    let tracker = Arc::new(ProgressTracker::new(Arc::new(MemoryKvStore::new())));
    let child = ChildId::new();

    let a = {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            tracker
                .record_challenge_completed(child, "explorer-emotion-map", TargetSkill::EmotionalRegulation)
                .await
                .unwrap()
        })
    };
    let b = {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            tracker
                .record_challenge_completed(child, "explorer-emotion-map", TargetSkill::EmotionalRegulation)
                .await
                .unwrap()
        })
    };

    let (first, second) = tokio::join!(a, b);
    let outcomes = [first.unwrap(), second.unwrap()];
    assert_eq!(outcomes.iter().filter(|done| **done).count(), 1);

    let progress = tracker.progress(child).await.unwrap();
    assert_eq!(progress.challenges_completed.len(), 1);
    assert_eq!(
        progress.skill_progress[&TargetSkill::EmotionalRegulation],
        1
    );
}

#[tokio::test]
async fn skill_levels_stop_at_the_cap() {
    let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
    let child = ChildId::new();

    for i in 0..(MAX_SKILL_LEVEL as usize + 3) {
        tracker
            .record_challenge_completed(child, &format!("drill-{i}"), TargetSkill::Evaluation)
            .await
            .unwrap();
    }
    let progress = tracker.progress(child).await.unwrap();
    assert_eq!(progress.skill_progress[&TargetSkill::Evaluation], MAX_SKILL_LEVEL);
}

#[tokio::test]
async fn progress_is_isolated_per_child() {
    let tracker = ProgressTracker::new(Arc::new(MemoryKvStore::new()));
    let first = ChildId::new();
    let second = ChildId::new();

    tracker.record_feedback_received(first).await.unwrap();
    tracker.record_feedback_received(first).await.unwrap();
    tracker.record_feedback_received(second).await.unwrap();

    assert_eq!(tracker.progress(first).await.unwrap().feedback_received, 2);
    assert_eq!(tracker.progress(second).await.unwrap().feedback_received, 1);
}

#[tokio::test]
async fn file_backed_progress_survives_restart() {
    let dir = TempDir::new().unwrap();
    let child = ChildId::new();

    {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(dir.path()));
        let tracker = ProgressTracker::new(kv);
        tracker.record_feedback_received(child).await.unwrap();
        tracker.record_growth_area(child, "spelling").await.unwrap();
        tracker.record_strength_area(child, "storytelling").await.unwrap();
    }

    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(dir.path()));
    let tracker = ProgressTracker::new(kv);
    let progress = tracker.progress(child).await.unwrap();
    assert_eq!(progress.feedback_received, 1);
    assert_eq!(progress.growth_areas, vec!["spelling".to_string()]);
    assert_eq!(progress.strength_areas, vec!["storytelling".to_string()]);
}
