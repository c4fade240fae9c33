//! Minimal client for the narrative intelligence service.
//!
//! This crate provides a focused client for the two remote endpoints the
//! journaling engine depends on:
//! - Metadata extraction: free text in, sentiment/themes/entities out
//! - Chapter generation: extracted metadata plus prior story arcs in, a
//!   new story chapter out
//!
//! Both calls are plain request/response JSON over HTTPS, bounded by a
//! client-side timeout.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.muse.dev/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when using the Muse client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Narrative intelligence service client.
#[derive(Clone)]
pub struct Muse {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Muse {
    /// Create a new client with the given API key against the default
    /// service endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a specific base URL (useful for staging
    /// or self-hosted deployments).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from the MUSE_API_KEY environment variable,
    /// honoring MUSE_BASE_URL when set.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("MUSE_API_KEY").map_err(|_| Error::NoApiKey)?;
        match std::env::var("MUSE_BASE_URL") {
            Ok(base) => Ok(Self::with_base_url(api_key, base)),
            Err(_) => Ok(Self::new(api_key)),
        }
    }

    /// Replace the request timeout (the default is 60 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        self
    }

    /// Extract sentiment, themes, entities, and key phrases from free text.
    pub async fn extract_metadata(
        &self,
        request: ExtractRequest,
    ) -> Result<ExtractedMetadata, Error> {
        self.post_json("metadata/extract", &request).await
    }

    /// Generate a story chapter from extracted metadata and prior arcs.
    pub async fn generate_chapter(
        &self,
        request: ChapterRequest,
    ) -> Result<ChapterResponse, Error> {
        self.post_json("chapters/generate", &request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// A metadata extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

impl ExtractRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Metadata extracted from journal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    /// Sentiment score in [0.0, 1.0], 0.5 being neutral.
    pub sentiment: f64,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub key_phrases: Vec<String>,
}

/// A condensed prior chapter sent as generation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcContext {
    pub summary: String,
    #[serde(default)]
    pub themes: Vec<String>,
    pub chapter_id: String,
}

/// A chapter generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRequest {
    pub metadata: ExtractedMetadata,
    /// Pseudonymous author identifier; never a real name.
    pub user_id: String,
    pub genre: String,
    #[serde(default)]
    pub previous_arcs: Vec<ArcContext>,
}

impl ChapterRequest {
    pub fn new(metadata: ExtractedMetadata, user_id: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            metadata,
            user_id: user_id.into(),
            genre: genre.into(),
            previous_arcs: Vec::new(),
        }
    }

    pub fn with_previous_arcs(mut self, arcs: Vec<ArcContext>) -> Self {
        self.previous_arcs = arcs;
        self
    }
}

/// A generated chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub chapter_id: String,
    pub text: String,
    pub cliffhanger: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Muse::new("test-key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = Muse::with_base_url("test-key", "http://localhost:8900/v1");
        assert_eq!(client.base_url, "http://localhost:8900/v1");
    }

    #[test]
    fn test_chapter_request_builder() {
        let metadata = ExtractedMetadata {
            sentiment: 0.7,
            themes: vec!["perseverance".to_string()],
            entities: vec![],
            key_phrases: vec![],
        };

        let request = ChapterRequest::new(metadata, "child-1", "fantasy").with_previous_arcs(vec![
            ArcContext {
                summary: "Last time...".to_string(),
                themes: vec![],
                chapter_id: "ch-1".to_string(),
            },
        ]);

        assert_eq!(request.user_id, "child-1");
        assert_eq!(request.genre, "fantasy");
        assert_eq!(request.previous_arcs.len(), 1);
    }

    #[test]
    fn test_wire_field_names() {
        let request = ChapterRequest::new(
            ExtractedMetadata {
                sentiment: 0.5,
                themes: vec![],
                entities: vec![],
                key_phrases: vec![],
            },
            "u",
            "mystery",
        );

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("previousArcs").is_some());
        assert!(value["metadata"].get("keyPhrases").is_some());
    }

    #[test]
    fn test_chapter_response_optional_fields() {
        let json = r#"{"chapterId":"c1","text":"Once upon a time","cliffhanger":"To be continued"}"#;
        let response: ChapterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.chapter_id, "c1");
        assert!(response.student_name.is_none());
        assert!(response.feedback.is_none());
    }
}
