//! Continuity tracking over the arc history.
//!
//! Pure reads: the tracker derives bounded "recent arcs" context from
//! the story graph store and never mutates it.

use super::arc::StoryArc;
use super::store::StoryGraphStore;
use std::sync::Arc;

/// Read-only view of the continuity history.
#[derive(Clone)]
pub struct ContinuityTracker {
    store: Arc<StoryGraphStore>,
}

impl ContinuityTracker {
    /// Create a tracker over the given store.
    pub fn new(store: Arc<StoryGraphStore>) -> Self {
        Self { store }
    }

    /// The most recent arcs, newest first.
    pub async fn recent_arcs(&self, limit: usize) -> Vec<StoryArc> {
        let mut arcs = self.store.arcs().await;
        arcs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        arcs.truncate(limit);
        arcs
    }

    /// The full arc history in insertion order.
    pub async fn all_arcs(&self) -> Vec<StoryArc> {
        self.store.arcs().await
    }
}
