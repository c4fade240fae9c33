//! Narrative generation pipeline.
//!
//! Orchestrates metadata extraction and chapter generation against the
//! remote narrative service, degrading to deterministic local fallbacks
//! on any transport error, decode error, or timeout. Results are
//! written into the story graph store and the continuity history.

pub mod fallback;

use crate::entry::{ChildId, JournalEntry};
use crate::metadata::EntryMetadata;
use crate::story::{
    ContinuityTracker, StoreError, StoryArc, StoryChapter, StoryGenre, StoryGraphStore, StoryNode,
};
use async_trait::async_trait;
use muse::Muse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Client-side bound on each remote collaborator call.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of recent arcs sent as generation context.
pub const DEFAULT_CONTINUITY_WINDOW: usize = 3;

/// Errors from the generation pipeline.
///
/// Collaborator failures never surface here; they degrade to local
/// fallback content. What remains is caller-requested cancellation and
/// lineage violations in the story store.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation was cancelled before completion")]
    Cancelled,

    #[error("story store rejected the generated node: {0}")]
    Store(#[from] StoreError),
}

/// Which generation steps fell back to local content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// Metadata extraction failed or timed out.
    MetadataFallback,
    /// Chapter generation failed or timed out.
    ChapterFallback,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The persisted lineage node.
    pub node: StoryNode,
    /// The chapter the node points at.
    pub chapter: StoryChapter,
    /// Degradations taken on the way; empty for a fully remote run.
    pub degraded: Vec<DegradeReason>,
}

impl GenerationOutcome {
    /// Whether any step used local fallback content.
    pub fn used_fallback(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// The two remote collaborators the pipeline depends on.
///
/// Implemented by [`muse::Muse`] in production and by
/// `testing::MockMuse` in tests.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn extract_metadata(
        &self,
        request: muse::ExtractRequest,
    ) -> Result<muse::ExtractedMetadata, muse::Error>;

    async fn generate_chapter(
        &self,
        request: muse::ChapterRequest,
    ) -> Result<muse::ChapterResponse, muse::Error>;
}

#[async_trait]
impl NarrativeService for muse::Muse {
    async fn extract_metadata(
        &self,
        request: muse::ExtractRequest,
    ) -> Result<muse::ExtractedMetadata, muse::Error> {
        Muse::extract_metadata(self, request).await
    }

    async fn generate_chapter(
        &self,
        request: muse::ChapterRequest,
    ) -> Result<muse::ChapterResponse, muse::Error> {
        Muse::generate_chapter(self, request).await
    }
}

/// The narrative generation pipeline.
pub struct NarrativePipeline {
    service: Arc<dyn NarrativeService>,
    store: Arc<StoryGraphStore>,
    continuity: ContinuityTracker,
    /// One generation at a time per child; overlapping calls would both
    /// read the same lineage head and fork the chain.
    child_locks: Mutex<HashMap<ChildId, Arc<Mutex<()>>>>,
    remote_timeout: Duration,
}

impl NarrativePipeline {
    /// Create a pipeline over the given service and store.
    pub fn new(service: Arc<dyn NarrativeService>, store: Arc<StoryGraphStore>) -> Self {
        let continuity = ContinuityTracker::new(store.clone());
        Self {
            service,
            store,
            continuity,
            child_locks: Mutex::new(HashMap::new()),
            remote_timeout: REMOTE_TIMEOUT,
        }
    }

    /// Override the remote call timeout (the default is 60 seconds).
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Generate a chapter for an entry and append it to the child's
    /// story lineage.
    ///
    /// Collaborator failures degrade to deterministic local content and
    /// are reported in the outcome, never as errors. A cancelled token
    /// aborts before anything is persisted, so an abandoned request
    /// cannot corrupt continuity ordering.
    pub async fn generate_chapter(
        &self,
        entry: &JournalEntry,
        child_id: ChildId,
        genre: StoryGenre,
        continuity_window: usize,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let lock = self.lock_for(child_id).await;
        let _guard = lock.lock().await;

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let mut degraded = Vec::new();

        // Step 1: metadata extraction, with deterministic fallback.
        let extract_request = muse::ExtractRequest::new(&entry.content);
        let metadata: EntryMetadata = tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            result = timeout(self.remote_timeout, self.service.extract_metadata(extract_request)) => {
                match result {
                    Ok(Ok(remote)) => remote.into(),
                    Ok(Err(e)) => {
                        warn!(error = %e, "metadata extraction failed; synthesizing locally");
                        degraded.push(DegradeReason::MetadataFallback);
                        EntryMetadata::fallback_for(entry)
                    }
                    Err(_) => {
                        warn!("metadata extraction timed out; synthesizing locally");
                        degraded.push(DegradeReason::MetadataFallback);
                        EntryMetadata::fallback_for(entry)
                    }
                }
            }
        };

        // Step 2: chapter generation under the 60-second bound.
        let previous_arcs = self.continuity.recent_arcs(continuity_window).await;
        let chapter_number = self.store.child_node_count(child_id).await + 1;
        let request = muse::ChapterRequest::new(
            (&metadata).into(),
            child_id.to_string(),
            genre.as_str(),
        )
        .with_previous_arcs(
            previous_arcs
                .iter()
                .map(|arc| muse::ArcContext {
                    summary: arc.summary.clone(),
                    themes: arc.themes.clone(),
                    chapter_id: arc.chapter_id.to_string(),
                })
                .collect(),
        );

        let chapter: StoryChapter = tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            result = timeout(self.remote_timeout, self.service.generate_chapter(request)) => {
                match result {
                    Ok(Ok(response)) => StoryChapter::from_response(
                        response,
                        format!("Chapter {chapter_number}"),
                    ),
                    Ok(Err(e)) => {
                        warn!(error = %e, "chapter generation failed; using local generator");
                        degraded.push(DegradeReason::ChapterFallback);
                        fallback::generate(genre, &metadata)
                    }
                    Err(_) => {
                        warn!("chapter generation timed out; using local generator");
                        degraded.push(DegradeReason::ChapterFallback);
                        fallback::generate(genre, &metadata)
                    }
                }
            }
        };

        // A caller torn down mid-generation must not append a stale node.
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        // Steps 3 and 4: persist the node, then the derived arc.
        let parent_id = self
            .store
            .latest_node_for_child(child_id)
            .await
            .map(|n| n.id);
        let node = StoryNode::new(
            child_id,
            entry.id,
            chapter.id.clone(),
            parent_id,
            metadata.clone(),
        );
        self.store.insert_node(node.clone()).await?;
        self.store
            .append_arc(StoryArc::from_chapter(&chapter, &metadata.themes))
            .await;

        debug!(
            child = %child_id,
            chapter = %chapter.id,
            degraded = degraded.len(),
            "chapter generated"
        );

        Ok(GenerationOutcome {
            node,
            chapter,
            degraded,
        })
    }

    /// Read access to the continuity history.
    pub fn continuity(&self) -> &ContinuityTracker {
        &self.continuity
    }

    async fn lock_for(&self, child_id: ChildId) -> Arc<Mutex<()>> {
        let mut locks = self.child_locks.lock().await;
        locks
            .entry(child_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_fallback_flag() {
        let metadata = EntryMetadata {
            sentiment: 0.5,
            themes: vec![],
            entities: vec![],
            key_phrases: vec![],
        };
        let chapter = fallback::generate(StoryGenre::General, &metadata);
        let node = StoryNode::new(
            ChildId::new(),
            crate::entry::EntryId::new(),
            chapter.id.clone(),
            None,
            metadata,
        );

        let clean = GenerationOutcome {
            node: node.clone(),
            chapter: chapter.clone(),
            degraded: vec![],
        };
        assert!(!clean.used_fallback());

        let degraded = GenerationOutcome {
            node,
            chapter,
            degraded: vec![DegradeReason::ChapterFallback],
        };
        assert!(degraded.used_fallback());
    }
}
