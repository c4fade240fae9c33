//! Pipeline behavior under remote failures, timeouts, and cancellation.

use journal_core::entry::{ChildId, EmotionalState, JournalEntry, JournalSubject};
use journal_core::metadata::EntryMetadata;
use journal_core::narrative::{fallback, DegradeReason, GenerationError, NarrativePipeline};
use journal_core::story::{StoryGenre, StoryGraphStore};
use journal_core::testing::MockMuse;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn entry(text: &str, state: EmotionalState) -> JournalEntry {
    JournalEntry::new(text, state, JournalSubject::Math)
}

fn remote_metadata() -> muse::ExtractedMetadata {
    muse::ExtractedMetadata {
        sentiment: 0.8,
        themes: vec!["perseverance".to_string()],
        entities: vec!["fractions".to_string()],
        key_phrases: vec!["kept trying".to_string()],
    }
}

fn remote_chapter(id: &str) -> muse::ChapterResponse {
    muse::ChapterResponse {
        chapter_id: id.to_string(),
        text: "The young hero crossed the bridge of numbers.".to_string(),
        cliffhanger: "But the bridge began to shake...".to_string(),
        student_name: None,
        feedback: None,
    }
}

async fn pipeline_with(service: Arc<MockMuse>, dir: &TempDir) -> NarrativePipeline {
    let store = Arc::new(StoryGraphStore::new(dir.path()));
    store.load().await;
    NarrativePipeline::new(service, store)
}

#[tokio::test]
async fn fully_remote_run_persists_node_and_arc() {
    let mock = Arc::new(MockMuse::new());
    mock.queue_metadata(remote_metadata()).await;
    mock.queue_chapter(remote_chapter("ch-1")).await;

    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_with(mock, &dir).await;
    let child = ChildId::new();

    let outcome = pipeline
        .generate_chapter(
            &entry("fractions went well", EmotionalState::Happy),
            child,
            StoryGenre::Fantasy,
            3,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!outcome.used_fallback());
    assert_eq!(outcome.chapter.id.as_str(), "ch-1");
    assert_eq!(outcome.node.parent_id, None);
    assert!((outcome.node.metadata_snapshot.sentiment - 0.8).abs() < f64::EPSILON);

    let arcs = pipeline.continuity().all_arcs().await;
    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0].chapter_id, outcome.chapter.id);
}

#[tokio::test]
async fn chapter_timeout_still_yields_node_with_fallback_sentiment() {
    let mock = Arc::new(MockMuse::new());
    // Metadata also fails, so the snapshot must carry the fallback
    // sentiment mapped from the emotional state.
    mock.queue_metadata_error(muse::Error::Network("down".to_string()))
        .await;
    mock.queue_chapter_hang().await;

    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_with(mock, &dir)
        .await
        .with_remote_timeout(Duration::from_millis(50));
    let child = ChildId::new();

    let e = entry("so frustrating today", EmotionalState::Frustrated);
    let outcome = pipeline
        .generate_chapter(&e, child, StoryGenre::Adventure, 3, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.degraded.contains(&DegradeReason::MetadataFallback));
    assert!(outcome.degraded.contains(&DegradeReason::ChapterFallback));
    let expected = EmotionalState::Frustrated.fallback_sentiment();
    assert!((outcome.node.metadata_snapshot.sentiment - expected).abs() < f64::EPSILON);
}

#[tokio::test]
async fn sequential_chapters_chain_parent_pointers() {
    let mock = Arc::new(MockMuse::new());
    for i in 0..3 {
        mock.queue_metadata(remote_metadata()).await;
        mock.queue_chapter(remote_chapter(&format!("ch-{i}"))).await;
    }

    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_with(mock, &dir).await;
    let child = ChildId::new();
    let cancel = CancellationToken::new();

    let mut previous = None;
    for i in 0..3 {
        let outcome = pipeline
            .generate_chapter(
                &entry(&format!("day {i}"), EmotionalState::Neutral),
                child,
                StoryGenre::Mystery,
                3,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(outcome.node.parent_id, previous);
        previous = Some(outcome.node.id);
    }
}

#[tokio::test]
async fn cancelled_token_leaves_store_untouched() {
    let mock = Arc::new(MockMuse::new());
    mock.queue_metadata(remote_metadata()).await;
    mock.queue_chapter(remote_chapter("ch-1")).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(StoryGraphStore::new(dir.path()));
    store.load().await;
    let pipeline = NarrativePipeline::new(mock, store.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = pipeline
        .generate_chapter(
            &entry("anything", EmotionalState::Neutral),
            ChildId::new(),
            StoryGenre::General,
            3,
            &cancel,
        )
        .await;

    assert!(matches!(result, Err(GenerationError::Cancelled)));
    assert_eq!(store.node_count().await, 0);
    assert_eq!(store.arcs().await.len(), 0);
}

#[tokio::test]
async fn fallback_chapter_is_deterministic() {
    let metadata = EntryMetadata {
        sentiment: 0.4,
        themes: vec!["patterns".to_string(), "puzzles".to_string()],
        entities: vec![],
        key_phrases: vec![],
    };
    let a = fallback::generate(StoryGenre::SciFi, &metadata);
    let b = fallback::generate(StoryGenre::SciFi, &metadata);
    assert_eq!(a.title, b.title);
    assert_eq!(a.cliffhanger, b.cliffhanger);
    assert_eq!(a.text, b.text);
}
