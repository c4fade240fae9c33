//! End-to-end entry processing through the coordinator.

use journal_core::coordinator::Coordinator;
use journal_core::entry::{ChildId, DevelopmentalMode, EmotionalState, JournalEntry, JournalSubject};
use journal_core::feedback::FeedbackType;
use journal_core::kvstore::{KeyValueStore, MemoryKvStore};
use journal_core::story::StoryGenre;
use journal_core::streak::RewardTier;
use journal_core::testing::MockMuse;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn process_entry_produces_feedback_story_and_reward() {
    let mock = Arc::new(MockMuse::new());
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let dir = TempDir::new().unwrap();

    let coordinator = Coordinator::assemble(mock.clone(), kv, dir.path())
        .await
        .unwrap();
    let child = ChildId::new();

    // No scripted remote responses, so the pipeline degrades to local
    // generation; the entry must still be fully processed.
    let entry = JournalEntry::new(
        "I figured out the experiment",
        EmotionalState::Excited,
        JournalSubject::Science,
    );
    let outcome = coordinator
        .process_entry(
            &entry,
            child,
            DevelopmentalMode::MiddleChildhood,
            StoryGenre::Adventure,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome.feedback.feedback_type,
        FeedbackType::EmotionalAwareness
    );
    assert!(outcome.story.used_fallback());
    assert_eq!(outcome.reward, Some(RewardTier::FirstInsight));

    let history = coordinator.feedback().feedback_history(child).await.unwrap();
    assert_eq!(history.len(), 1);

    let arcs = coordinator.pipeline().continuity().all_arcs().await;
    assert_eq!(arcs.len(), 1);
}

#[tokio::test]
async fn implemented_feedback_updates_favorites() {
    let mock = Arc::new(MockMuse::new());
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let dir = TempDir::new().unwrap();

    let coordinator = Coordinator::assemble(mock, kv, dir.path()).await.unwrap();
    let child = ChildId::new();

    coordinator
        .mark_feedback_implemented(child, FeedbackType::ReflectionPrompt)
        .await
        .unwrap();

    let progress = coordinator.progress().progress(child).await.unwrap();
    assert_eq!(progress.feedback_implemented, 1);
    assert_eq!(progress.favorite_types[&FeedbackType::ReflectionPrompt], 1);
}
