//! Story nodes: the lineage records linking entries to chapters.

use super::chapter::ChapterId;
use crate::entry::{ChildId, EntryId};
use crate::metadata::EntryMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a story node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One link in a child's story lineage.
///
/// Nodes form a parent-pointer forest, one lineage per child. A node is
/// never mutated after creation; it is only appended or explicitly
/// deleted. The parent, when set, was created strictly earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: NodeId,
    /// Which child's lineage this node belongs to.
    pub child_id: ChildId,
    /// The journal entry that produced this node.
    pub entry_id: EntryId,
    /// The chapter generated for that entry.
    pub chapter_id: ChapterId,
    /// Previous node in the lineage; None for the first chapter.
    pub parent_id: Option<NodeId>,
    /// The metadata actually used for generation, remote or fallback.
    pub metadata_snapshot: EntryMetadata,
    pub created_at: DateTime<Utc>,
}

impl StoryNode {
    /// Create a new node with the current timestamp.
    pub fn new(
        child_id: ChildId,
        entry_id: EntryId,
        chapter_id: ChapterId,
        parent_id: Option<NodeId>,
        metadata_snapshot: EntryMetadata,
    ) -> Self {
        Self {
            id: NodeId::new(),
            child_id,
            entry_id,
            chapter_id,
            parent_id,
            metadata_snapshot,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive match against the metadata snapshot's themes,
    /// entities, and key phrases.
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let snapshot = &self.metadata_snapshot;
        snapshot
            .themes
            .iter()
            .chain(snapshot.entities.iter())
            .chain(snapshot.key_phrases.iter())
            .any(|value| value.to_lowercase().contains(&query))
    }

    /// Case-insensitive match against the coarse sentiment label.
    pub fn matches_sentiment(&self, query: &str) -> bool {
        self.metadata_snapshot
            .sentiment_label()
            .contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> StoryNode {
        StoryNode::new(
            ChildId::new(),
            EntryId::new(),
            ChapterId::new(),
            None,
            EntryMetadata {
                sentiment: 0.8,
                themes: vec!["Perseverance".to_string()],
                entities: vec!["Science Fair".to_string()],
                key_phrases: vec!["volcano model".to_string()],
            },
        )
    }

    #[test]
    fn test_text_matching_is_case_insensitive() {
        let node = sample_node();
        assert!(node.matches_text("perseverance"));
        assert!(node.matches_text("SCIENCE"));
        assert!(node.matches_text("volcano"));
        assert!(!node.matches_text("dinosaur"));
    }

    #[test]
    fn test_sentiment_matching() {
        let node = sample_node();
        assert!(node.matches_sentiment("posit"));
        assert!(!node.matches_sentiment("negative"));
    }
}
