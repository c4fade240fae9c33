//! Durable storage for story nodes and continuity arcs.
//!
//! The graph lives in memory as an arena of nodes plus a children index,
//! and is persisted wholesale as two JSON documents on every mutation.
//! Mutations are serialized behind a single writer lock; reads run
//! against the in-memory snapshot.

use super::arc::StoryArc;
use super::node::{NodeId, StoryNode};
use crate::entry::ChildId;
use crate::metadata::EntryMetadata;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

const NODES_FILE: &str = "story_nodes.json";
const ARCS_FILE: &str = "story_arcs.json";

/// Errors from story graph operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("unknown parent node: {0}")]
    UnknownParent(NodeId),

    #[error("parent {parent} was not created before child {child}")]
    ParentNotOlder { parent: NodeId, child: NodeId },

    #[error("node {0} would create a cycle in the lineage")]
    WouldCycle(NodeId),

    #[error("no backup found for stamp {0}")]
    UnknownBackup(String),
}

/// Observable persistence status of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    Saving,
    Error,
}

// =============================================================================
// In-memory graph
// =============================================================================

/// The in-memory story graph: node arena, children index, arc history.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    nodes: HashMap<NodeId, StoryNode>,
    /// Secondary index for O(children) traversal; rebuilt on load.
    children: HashMap<NodeId, Vec<NodeId>>,
    arcs: Vec<StoryArc>,
}

impl StoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, validating lineage invariants.
    ///
    /// The parent must exist, must have been created strictly earlier,
    /// and the resulting ancestry chain must stay acyclic.
    pub fn insert_node(&mut self, node: StoryNode) -> Result<NodeId, StoreError> {
        if self.nodes.contains_key(&node.id) {
            return Err(StoreError::DuplicateNode(node.id));
        }

        if let Some(parent_id) = node.parent_id {
            let parent = self
                .nodes
                .get(&parent_id)
                .ok_or(StoreError::UnknownParent(parent_id))?;

            if parent.created_at >= node.created_at {
                return Err(StoreError::ParentNotOlder {
                    parent: parent_id,
                    child: node.id,
                });
            }

            // Walk the ancestry chain; the new id must not appear in it,
            // and a revisited ancestor means the stored graph is corrupt.
            let mut visited = HashSet::new();
            let mut cursor = Some(parent_id);
            while let Some(id) = cursor {
                if id == node.id || !visited.insert(id) {
                    return Err(StoreError::WouldCycle(node.id));
                }
                cursor = self.nodes.get(&id).and_then(|n| n.parent_id);
            }

            self.children.entry(parent_id).or_default().push(node.id);
        }

        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&StoryNode> {
        self.nodes.get(&id)
    }

    /// Replace a node's metadata snapshot. Returns false for unknown IDs.
    pub fn update_metadata_snapshot(&mut self, id: NodeId, snapshot: EntryMetadata) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.metadata_snapshot = snapshot;
                true
            }
            None => false,
        }
    }

    /// Remove a node by ID. Its children, if any, become roots.
    pub fn remove_node(&mut self, id: NodeId) -> Option<StoryNode> {
        let node = self.nodes.remove(&id)?;
        if let Some(parent_id) = node.parent_id {
            if let Some(siblings) = self.children.get_mut(&parent_id) {
                siblings.retain(|&child| child != id);
            }
        }
        self.children.remove(&id);
        Some(node)
    }

    /// Append a continuity arc. The arc history is never trimmed;
    /// recency is applied only at query time.
    pub fn append_arc(&mut self, arc: StoryArc) {
        self.arcs.push(arc);
    }

    /// All arcs in insertion order.
    pub fn arcs(&self) -> &[StoryArc] {
        &self.arcs
    }

    /// All nodes sorted by creation time ascending.
    pub fn chronological(&self) -> Vec<&StoryNode> {
        let mut nodes: Vec<_> = self.nodes.values().collect();
        nodes.sort_by_key(|n| n.created_at);
        nodes
    }

    /// Breadth-first layering: roots first, then their children, and so
    /// on. Nodes whose parent is missing are treated as roots. Each
    /// level is ordered by creation time.
    pub fn by_levels(&self) -> Vec<Vec<&StoryNode>> {
        let mut levels = Vec::new();
        let mut frontier: Vec<&StoryNode> = self
            .nodes
            .values()
            .filter(|n| match n.parent_id {
                None => true,
                Some(parent) => !self.nodes.contains_key(&parent),
            })
            .collect();

        let mut seen = HashSet::new();
        while !frontier.is_empty() {
            frontier.sort_by_key(|n| n.created_at);
            let mut next = Vec::new();
            for node in &frontier {
                if !seen.insert(node.id) {
                    continue;
                }
                if let Some(child_ids) = self.children.get(&node.id) {
                    next.extend(child_ids.iter().filter_map(|id| self.nodes.get(id)));
                }
            }
            levels.push(std::mem::take(&mut frontier));
            frontier = next;
        }
        levels
    }

    /// Filter nodes by sentiment label and/or search text, both
    /// case-insensitive substrings over the metadata snapshot.
    pub fn filter(&self, sentiment: Option<&str>, search_text: Option<&str>) -> Vec<&StoryNode> {
        let mut matches: Vec<_> = self
            .nodes
            .values()
            .filter(|node| {
                sentiment.map_or(true, |s| node.matches_sentiment(s))
                    && search_text.map_or(true, |t| node.matches_text(t))
            })
            .collect();
        matches.sort_by_key(|n| n.created_at);
        matches
    }

    /// The most recent node in a child's lineage.
    pub fn latest_node_for_child(&self, child_id: ChildId) -> Option<&StoryNode> {
        self.nodes
            .values()
            .filter(|n| n.child_id == child_id)
            .max_by_key(|n| n.created_at)
    }

    /// Number of nodes in a child's lineage.
    pub fn child_node_count(&self, child_id: ChildId) -> usize {
        self.nodes.values().filter(|n| n.child_id == child_id).count()
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Rebuild the children index from parent pointers.
    fn rebuild_index(&mut self) {
        self.children.clear();
        for node in self.nodes.values() {
            if let Some(parent_id) = node.parent_id {
                self.children.entry(parent_id).or_default().push(node.id);
            }
        }
    }

    /// Verify that no ancestry chain loops back on itself.
    fn validate_acyclic(&self) -> Result<(), StoreError> {
        for start in self.nodes.keys() {
            let mut visited = HashSet::new();
            let mut cursor = Some(*start);
            while let Some(id) = cursor {
                if !visited.insert(id) {
                    return Err(StoreError::WouldCycle(*start));
                }
                cursor = self.nodes.get(&id).and_then(|n| n.parent_id);
            }
        }
        Ok(())
    }

    fn from_documents(nodes: NodesDocument, arcs: ArcsDocument) -> Result<Self, StoreError> {
        let mut graph = Self {
            nodes: nodes.nodes.into_iter().map(|n| (n.id, n)).collect(),
            children: HashMap::new(),
            arcs: arcs.arcs,
        };
        graph.validate_acyclic()?;
        graph.rebuild_index();
        Ok(graph)
    }

    fn to_documents(&self) -> (NodesDocument, ArcsDocument) {
        let mut nodes: Vec<_> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|n| n.created_at);
        (
            NodesDocument { nodes },
            ArcsDocument {
                arcs: self.arcs.clone(),
            },
        )
    }
}

/// On-disk document holding all story nodes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct NodesDocument {
    nodes: Vec<StoryNode>,
}

/// On-disk document holding all continuity arcs.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ArcsDocument {
    arcs: Vec<StoryArc>,
}

// =============================================================================
// Durable store
// =============================================================================

/// Durable story graph store backed by two JSON documents.
pub struct StoryGraphStore {
    dir: PathBuf,
    graph: RwLock<StoryGraph>,
    state: RwLock<StoreState>,
    /// Single writer: document saves never interleave.
    write_lock: Mutex<()>,
}

#[derive(Debug, Default)]
struct StoreState {
    status: StoreStatus,
    last_error: Option<String>,
}

impl StoryGraphStore {
    /// Create a store rooted at the given directory. No IO happens
    /// until `load` or the first mutation.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            graph: RwLock::new(StoryGraph::new()),
            state: RwLock::new(StoreState::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Load both documents from disk.
    ///
    /// A missing document is treated as empty. A failed read or parse
    /// yields an empty collection with the error recorded in the store
    /// status; it is not surfaced to the caller.
    pub async fn load(&self) {
        self.set_status(StoreStatus::Loading).await;

        let result = self.read_documents(NODES_FILE, ARCS_FILE).await;
        match result {
            Ok(graph) => {
                *self.graph.write().await = graph;
                self.set_ok().await;
            }
            Err(e) => {
                warn!(error = %e, "story graph load failed; starting empty");
                *self.graph.write().await = StoryGraph::new();
                self.set_error(e).await;
            }
        }
    }

    /// Write both documents to disk.
    ///
    /// A failed save is recorded in the store status and is not
    /// retried; the next explicit save attempt proceeds independently.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.set_status(StoreStatus::Saving).await;
        let _writer = self.write_lock.lock().await;

        let (nodes, arcs) = self.graph.read().await.to_documents();
        let result = self.write_documents(&nodes, NODES_FILE, &arcs, ARCS_FILE).await;

        match result {
            Ok(()) => {
                self.set_ok().await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "story graph save failed");
                let message = e.to_string();
                self.set_error_message(message).await;
                Err(e)
            }
        }
    }

    // =========================================================================
    // Mutations (each followed by a best-effort save)
    // =========================================================================

    /// Insert a node and persist. Lineage violations are returned;
    /// persistence failures are only recorded in the store status.
    pub async fn insert_node(&self, node: StoryNode) -> Result<NodeId, StoreError> {
        let id = self.graph.write().await.insert_node(node)?;
        let _ = self.save().await;
        Ok(id)
    }

    /// Replace a node's metadata snapshot and persist.
    pub async fn update_metadata_snapshot(&self, id: NodeId, snapshot: EntryMetadata) -> bool {
        let updated = self.graph.write().await.update_metadata_snapshot(id, snapshot);
        if updated {
            let _ = self.save().await;
        }
        updated
    }

    /// Remove a node and persist. Returns the removed node.
    pub async fn remove_node(&self, id: NodeId) -> Option<StoryNode> {
        let removed = self.graph.write().await.remove_node(id);
        if removed.is_some() {
            let _ = self.save().await;
        }
        removed
    }

    /// Append a continuity arc and persist.
    pub async fn append_arc(&self, arc: StoryArc) {
        self.graph.write().await.append_arc(arc);
        let _ = self.save().await;
    }

    // =========================================================================
    // Queries (in-memory snapshot)
    // =========================================================================

    /// Get a node by ID.
    pub async fn node(&self, id: NodeId) -> Option<StoryNode> {
        self.graph.read().await.get_node(id).cloned()
    }

    /// All nodes sorted by creation time ascending.
    pub async fn chronological(&self) -> Vec<StoryNode> {
        self.graph
            .read()
            .await
            .chronological()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Breadth-first layering of the forest.
    pub async fn by_levels(&self) -> Vec<Vec<StoryNode>> {
        self.graph
            .read()
            .await
            .by_levels()
            .into_iter()
            .map(|level| level.into_iter().cloned().collect())
            .collect()
    }

    /// Filter nodes by sentiment and/or search text.
    pub async fn filter(&self, sentiment: Option<&str>, search_text: Option<&str>) -> Vec<StoryNode> {
        self.graph
            .read()
            .await
            .filter(sentiment, search_text)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The most recent node in a child's lineage.
    pub async fn latest_node_for_child(&self, child_id: ChildId) -> Option<StoryNode> {
        self.graph.read().await.latest_node_for_child(child_id).cloned()
    }

    /// Number of nodes in a child's lineage.
    pub async fn child_node_count(&self, child_id: ChildId) -> usize {
        self.graph.read().await.child_node_count(child_id)
    }

    /// All arcs in insertion order.
    pub async fn arcs(&self) -> Vec<StoryArc> {
        self.graph.read().await.arcs().to_vec()
    }

    /// Total number of nodes.
    pub async fn node_count(&self) -> usize {
        self.graph.read().await.node_count()
    }

    /// Current persistence status.
    pub async fn status(&self) -> StoreStatus {
        self.state.read().await.status
    }

    /// Most recent persistence error, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    // =========================================================================
    // Backup and restore
    // =========================================================================

    /// Write a timestamped point-in-time copy of both documents.
    /// Returns the backup stamp.
    pub async fn backup(&self) -> Result<String, StoreError> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let _writer = self.write_lock.lock().await;
        let (nodes, arcs) = self.graph.read().await.to_documents();
        self.write_documents(
            &nodes,
            &backup_file(NODES_FILE, &stamp),
            &arcs,
            &backup_file(ARCS_FILE, &stamp),
        )
        .await?;
        Ok(stamp)
    }

    /// List available backup stamps, most recent first.
    pub async fn list_backups(&self) -> Result<Vec<String>, StoreError> {
        let mut stamps = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stamps),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{}-", NODES_FILE.trim_end_matches(".json"));
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(rest) = name.strip_prefix(&prefix) {
                if let Some(stamp) = rest.strip_suffix(".json") {
                    stamps.push(stamp.to_string());
                }
            }
        }

        stamps.sort_by(|a, b| b.cmp(a));
        Ok(stamps)
    }

    /// Replace the in-memory collection from a backup, then re-save the
    /// primary documents.
    pub async fn restore(&self, stamp: &str) -> Result<(), StoreError> {
        let nodes_path = self.dir.join(backup_file(NODES_FILE, stamp));
        if !nodes_path.exists() {
            return Err(StoreError::UnknownBackup(stamp.to_string()));
        }

        let graph = self
            .read_documents(
                &backup_file(NODES_FILE, stamp),
                &backup_file(ARCS_FILE, stamp),
            )
            .await?;

        *self.graph.write().await = graph;
        self.save().await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn read_documents(&self, nodes_file: &str, arcs_file: &str) -> Result<StoryGraph, StoreError> {
        let nodes: NodesDocument = self.read_document(nodes_file).await?;
        let arcs: ArcsDocument = self.read_document(arcs_file).await?;
        StoryGraph::from_documents(nodes, arcs)
    }

    async fn read_document<T: Default + for<'de> Deserialize<'de>>(
        &self,
        file: &str,
    ) -> Result<T, StoreError> {
        match fs::read_to_string(self.dir.join(file)).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_documents(
        &self,
        nodes: &NodesDocument,
        nodes_file: &str,
        arcs: &ArcsDocument,
        arcs_file: &str,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let nodes_content = serde_json::to_string_pretty(nodes)?;
        let arcs_content = serde_json::to_string_pretty(arcs)?;
        fs::write(self.dir.join(nodes_file), nodes_content).await?;
        fs::write(self.dir.join(arcs_file), arcs_content).await?;
        Ok(())
    }

    async fn set_status(&self, status: StoreStatus) {
        self.state.write().await.status = status;
    }

    async fn set_ok(&self) {
        let mut state = self.state.write().await;
        state.status = StoreStatus::Idle;
    }

    async fn set_error(&self, error: StoreError) {
        self.set_error_message(error.to_string()).await;
    }

    async fn set_error_message(&self, message: String) {
        let mut state = self.state.write().await;
        state.status = StoreStatus::Error;
        state.last_error = Some(message);
    }
}

fn backup_file(file: &str, stamp: &str) -> String {
    format!("{}-{stamp}.json", file.trim_end_matches(".json"))
}
