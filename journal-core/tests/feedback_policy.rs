//! End-to-end checks on feedback category selection and composition.

use journal_core::entry::{ChildId, DevelopmentalMode, EmotionalState, JournalEntry, JournalSubject};
use journal_core::feedback::challenges::{select_challenge_with_rng, ChallengeDifficulty};
use journal_core::feedback::{FeedbackPolicyEngine, FeedbackType};
use journal_core::kvstore::{KeyValueStore, MemoryKvStore};
use journal_core::progress::{FeedbackProgress, ProgressTracker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

fn engine_with_kv(kv: Arc<dyn KeyValueStore>) -> FeedbackPolicyEngine {
    let progress = Arc::new(ProgressTracker::new(kv.clone()));
    FeedbackPolicyEngine::new(kv, progress)
}

fn neutral_entry(text: &str) -> JournalEntry {
    JournalEntry::new(text, EmotionalState::Neutral, JournalSubject::Science)
}

#[test]
fn non_neutral_emotion_always_wins() {
    let states = [
        EmotionalState::Excited,
        EmotionalState::Happy,
        EmotionalState::Curious,
        EmotionalState::Confident,
        EmotionalState::Frustrated,
        EmotionalState::Confused,
        EmotionalState::Overwhelmed,
    ];
    let texts = [
        "I think I learned a lot",
        "this was hard and difficult",
        "just a normal day",
    ];
    let mut rng = StdRng::seed_from_u64(17);
    for state in states {
        for text in texts {
            let entry = JournalEntry::new(text, state, JournalSubject::Math);
            let category = FeedbackPolicyEngine::select_category(
                &entry,
                &FeedbackProgress::default(),
                &mut rng,
            );
            assert_eq!(category, FeedbackType::EmotionalAwareness, "{state:?} / {text}");
        }
    }
}

#[test]
fn milestone_count_selects_celebration() {
    // feedbackReceived = 15, neutral, no trigger keywords.
    let progress = FeedbackProgress {
        feedback_received: 15,
        ..Default::default()
    };
    let entry = neutral_entry("we went over chapter four in class");
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..30 {
        let category = FeedbackPolicyEngine::select_category(&entry, &progress, &mut rng);
        assert_eq!(category, FeedbackType::CelebrationOfProgress);
    }
}

#[test]
fn challenge_selection_stays_in_tier() {
    // feedbackReceived = 27 falls in the practitioner bucket.
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..50 {
        let challenge = select_challenge_with_rng(27, &HashSet::new(), &mut rng)
            .expect("catalog has practitioner challenges");
        assert_eq!(challenge.difficulty, ChallengeDifficulty::Practitioner);
        assert!(challenge.difficulty < ChallengeDifficulty::Expert);
    }
}

#[tokio::test]
async fn generated_feedback_lands_in_history() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let engine = engine_with_kv(kv);
    let child = ChildId::new();

    let first = engine
        .generate_feedback(
            &neutral_entry("today I learned about magnets"),
            child,
            DevelopmentalMode::MiddleChildhood,
        )
        .await
        .unwrap();
    let second = engine
        .generate_feedback(
            &JournalEntry::new(
                "magnets again",
                EmotionalState::Excited,
                JournalSubject::Science,
            ),
            child,
            DevelopmentalMode::MiddleChildhood,
        )
        .await
        .unwrap();

    assert_eq!(first.feedback_type, FeedbackType::MetacognitiveInsight);
    assert_eq!(second.feedback_type, FeedbackType::EmotionalAwareness);

    let history = engine.feedback_history(child).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first.id);
    assert_eq!(history[1].id, second.id);
}

#[tokio::test]
async fn hard_text_attaches_support_and_strategies() {
    // "hard" both selects the intervention category and matches the
    // struggle-keyword table, so a learning support rides along.
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let engine = engine_with_kv(kv);
    let progress = FeedbackProgress {
        feedback_received: 4,
        ..Default::default()
    };

    let entry = neutral_entry("long division is too hard");
    let mut rng = StdRng::seed_from_u64(41);
    let feedback = engine
        .compose_with_rng(
            &entry,
            ChildId::new(),
            DevelopmentalMode::Adolescent,
            &progress,
            &mut rng,
        )
        .unwrap();
    assert_eq!(feedback.feedback_type, FeedbackType::SupportiveIntervention);
    assert!(!feedback.suggested_strategies.is_empty());
    assert!(feedback.support.is_some());
}

#[tokio::test]
async fn every_third_feedback_includes_challenge() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let engine = engine_with_kv(kv);

    let progress = FeedbackProgress {
        feedback_received: 6,
        ..Default::default()
    };
    let entry = neutral_entry("nothing special happened");
    let mut rng = StdRng::seed_from_u64(43);
    let feedback = engine
        .compose_with_rng(
            &entry,
            ChildId::new(),
            DevelopmentalMode::MiddleChildhood,
            &progress,
            &mut rng,
        )
        .unwrap();
    assert!(feedback.challenge.is_some());
    assert_eq!(
        feedback.challenge.unwrap().difficulty,
        ChallengeDifficulty::Explorer
    );
}
