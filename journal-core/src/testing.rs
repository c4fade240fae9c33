//! Test doubles for the narrative service.
//!
//! `MockMuse` replays scripted responses so pipeline behavior can be
//! tested without a network.

use crate::narrative::NarrativeService;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

enum MockReply<T> {
    Ok(T),
    Err(muse::Error),
    /// Never completes; exercises timeout paths.
    Hang,
}

/// A scripted narrative service. Replies are consumed in queue order;
/// an empty queue yields a network error.
#[derive(Default)]
pub struct MockMuse {
    metadata: Mutex<VecDeque<MockReply<muse::ExtractedMetadata>>>,
    chapters: Mutex<VecDeque<MockReply<muse::ChapterResponse>>>,
}

impl MockMuse {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn queue_metadata(&self, metadata: muse::ExtractedMetadata) {
        self.metadata.lock().await.push_back(MockReply::Ok(metadata));
    }

    pub async fn queue_metadata_error(&self, error: muse::Error) {
        self.metadata.lock().await.push_back(MockReply::Err(error));
    }

    pub async fn queue_metadata_hang(&self) {
        self.metadata.lock().await.push_back(MockReply::Hang);
    }

    pub async fn queue_chapter(&self, response: muse::ChapterResponse) {
        self.chapters.lock().await.push_back(MockReply::Ok(response));
    }

    pub async fn queue_chapter_error(&self, error: muse::Error) {
        self.chapters.lock().await.push_back(MockReply::Err(error));
    }

    pub async fn queue_chapter_hang(&self) {
        self.chapters.lock().await.push_back(MockReply::Hang);
    }
}

async fn resolve<T>(reply: Option<MockReply<T>>) -> Result<T, muse::Error> {
    match reply {
        Some(MockReply::Ok(value)) => Ok(value),
        Some(MockReply::Err(error)) => Err(error),
        Some(MockReply::Hang) => std::future::pending().await,
        None => Err(muse::Error::Network("no scripted response".to_string())),
    }
}

#[async_trait]
impl NarrativeService for MockMuse {
    async fn extract_metadata(
        &self,
        _request: muse::ExtractRequest,
    ) -> Result<muse::ExtractedMetadata, muse::Error> {
        let reply = self.metadata.lock().await.pop_front();
        resolve(reply).await
    }

    async fn generate_chapter(
        &self,
        _request: muse::ChapterRequest,
    ) -> Result<muse::ChapterResponse, muse::Error> {
        let reply = self.chapters.lock().await.pop_front();
        resolve(reply).await
    }
}
