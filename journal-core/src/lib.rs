//! Core engine for a children's reflective-journaling companion.
//!
//! Each journal entry is augmented with developmentally tuned adaptive
//! feedback and a generated chapter of an ongoing personal story. The
//! crate covers the feedback policy engine, the narrative generation
//! pipeline with its offline fallbacks, the durable story graph, and
//! the progress and streak state machines. Remote narrative
//! intelligence comes from the [`muse`] client crate; everything here
//! keeps working when that service is unreachable.

pub mod coordinator;
pub mod entry;
pub mod feedback;
pub mod kvstore;
pub mod metadata;
pub mod narrative;
pub mod progress;
pub mod story;
pub mod streak;
pub mod testing;

pub use coordinator::{Coordinator, CoordinatorError, EntryOutcome};
pub use entry::{ChildId, DevelopmentalMode, EmotionalState, EntryId, JournalEntry, JournalSubject};
pub use feedback::{AdaptiveFeedback, FeedbackError, FeedbackPolicyEngine, FeedbackType};
pub use kvstore::{FileKvStore, KeyValueStore, KvError, MemoryKvStore};
pub use metadata::EntryMetadata;
pub use narrative::{
    DegradeReason, GenerationError, GenerationOutcome, NarrativePipeline, NarrativeService,
};
pub use progress::{FeedbackProgress, ProgressTracker};
pub use story::{
    ChapterId, ContinuityTracker, NodeId, StoryArc, StoryChapter, StoryGenre, StoryGraphStore,
    StoryNode,
};
pub use streak::{RewardTier, StreakManager, StreakState};
