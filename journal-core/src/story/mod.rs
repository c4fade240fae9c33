//! Story graph: chapters, continuity arcs, lineage nodes, and their
//! durable store.

pub mod arc;
pub mod chapter;
pub mod continuity;
pub mod node;
pub mod store;

pub use arc::{ArcId, StoryArc};
pub use chapter::{ChapterId, StoryChapter, StoryGenre};
pub use continuity::ContinuityTracker;
pub use node::{NodeId, StoryNode};
pub use store::{StoreError, StoreStatus, StoryGraph, StoryGraphStore};
