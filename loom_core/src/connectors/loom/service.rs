use std::sync::Arc;

use rmcp::model::{CallToolResult, IntoContents};
use tracing::{info, instrument, warn};

use super::captions::vtt_to_text;
use super::client::LoomApi;
use super::types::VideoMetadata;
use crate::resolver::extract_video_id;

pub const INVALID_URL_MESSAGE: &str = "Could not extract video ID from the provided URL.";
pub const TRANSCRIPT_UNAVAILABLE_MESSAGE: &str = "Could not fetch transcript for this video.";
pub const COMMENTS_UNAVAILABLE_MESSAGE: &str = "Could not fetch comments for this video.";

/// Result of a tool invocation. Expected failures (bad URL, Loom not
/// returning data) are a `Failure` with a user-facing message, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }

    /// The text block handed back to the caller.
    pub fn text(&self) -> String {
        match self {
            ToolOutcome::Success(text) => text.clone(),
            ToolOutcome::Failure(message) => format!("Error: {}", message),
        }
    }

    pub fn into_call_tool_result(self) -> CallToolResult {
        let text = self.text();
        if self.is_failure() {
            CallToolResult::error(text.into_contents())
        } else {
            CallToolResult::success(text.into_contents())
        }
    }
}

/// Transcript and comment retrieval on top of a [`LoomApi`].
#[derive(Clone)]
pub struct LoomService {
    api: Arc<dyn LoomApi>,
}

impl LoomService {
    pub fn new(api: Arc<dyn LoomApi>) -> Self {
        Self { api }
    }

    /// Transcript text for a share URL, headed by the title and description
    /// when Loom exposes them.
    #[instrument(skip(self))]
    pub async fn get_transcript(&self, video_url: &str) -> ToolOutcome {
        let Some(video_id) = extract_video_id(video_url) else {
            warn!("No video id in URL");
            return ToolOutcome::Failure(INVALID_URL_MESSAGE.to_string());
        };

        // Independent lookups; neither result feeds the other.
        let (metadata, descriptor) = tokio::join!(
            self.api.fetch_metadata(&video_id),
            self.api.fetch_transcript_descriptor(&video_id),
        );

        let Some(captions_url) = descriptor
            .as_ref()
            .and_then(|details| details.captions_source_url())
        else {
            return ToolOutcome::Failure(TRANSCRIPT_UNAVAILABLE_MESSAGE.to_string());
        };

        let payload = match self.api.fetch_caption_payload(captions_url).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%video_id, error = %e, "Caption download failed");
                return ToolOutcome::Failure(format!("Failed to fetch transcript: {}", e));
            }
        };

        let transcript = vtt_to_text(&payload);
        info!(
            %video_id,
            has_metadata = metadata.is_some(),
            transcript_len = transcript.len(),
            "Transcript assembled"
        );

        ToolOutcome::Success(format_transcript(metadata.as_ref(), &transcript))
    }

    /// Full comment tree for a share URL, as pretty-printed JSON.
    #[instrument(skip(self))]
    pub async fn get_comments(&self, video_url: &str) -> ToolOutcome {
        let Some(video_id) = extract_video_id(video_url) else {
            warn!("No video id in URL");
            return ToolOutcome::Failure(INVALID_URL_MESSAGE.to_string());
        };

        let Some(comments) = self.api.fetch_comments(&video_id).await else {
            return ToolOutcome::Failure(COMMENTS_UNAVAILABLE_MESSAGE.to_string());
        };

        info!(%video_id, count = comments.len(), "Comments retrieved");

        match serde_json::to_string_pretty(&comments) {
            Ok(json) => ToolOutcome::Success(json),
            Err(e) => ToolOutcome::Failure(e.to_string()),
        }
    }
}

/// Prefix the transcript body with a markdown heading built from the metadata.
pub fn format_transcript(metadata: Option<&VideoMetadata>, transcript: &str) -> String {
    let mut text = String::new();

    if let Some(metadata) = metadata {
        text.push_str(&format!("# {}\n\n", metadata.title));
        if let Some(description) = &metadata.description {
            text.push_str(&format!("**Description:** {}\n\n", description));
        }
        text.push_str("---\n\n## Transcript\n\n");
    }

    text.push_str(transcript);
    text
}
