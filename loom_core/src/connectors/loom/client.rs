use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::queries::{
    FETCH_VIDEO_COMMENTS, FETCH_VIDEO_COMMENTS_OP, FETCH_VIDEO_TRANSCRIPT,
    FETCH_VIDEO_TRANSCRIPT_OP, GET_VIDEO_INFO, GET_VIDEO_INFO_OP,
};
use super::types::{
    Comment, FetchVideoTranscriptData, FetchVideoTranscriptResult, GetVideoData,
    GraphqlResponse, VideoCommentsData, VideoCommentsResult, VideoMetadata,
    VideoTranscriptDetails,
};
use crate::config::LoomConfig;
use crate::error::{ConnectorError, LoomError};
use crate::resolver::VideoId;

/// Calls the transcript and comment tools need from Loom.
///
/// The three GraphQL lookups report any failure as `None`: callers only need
/// to know whether the data is available for this video. The caption download
/// is the exception and returns the reason it failed.
#[async_trait]
pub trait LoomApi: Send + Sync {
    async fn fetch_transcript_descriptor(&self, video_id: &VideoId)
        -> Option<VideoTranscriptDetails>;

    async fn fetch_metadata(&self, video_id: &VideoId) -> Option<VideoMetadata>;

    async fn fetch_comments(&self, video_id: &VideoId) -> Option<Vec<Comment>>;

    async fn fetch_caption_payload(&self, url: &str) -> Result<String, LoomError>;
}

/// [`LoomApi`] over HTTP.
#[derive(Clone)]
pub struct LoomClient {
    client: reqwest::Client,
    config: LoomConfig,
}

impl LoomClient {
    pub fn new(config: LoomConfig) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConnectorError::InternalError(format!("HTTP client error: {}", e)))?;
        Ok(Self { client, config })
    }

    // Helper: POST one GraphQL operation and decode the envelope
    async fn post_graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        variables: Value,
        query: &str,
    ) -> Result<Option<T>, LoomError> {
        let body = json!({
            "operationName": operation,
            "variables": variables,
            "query": query,
        });

        let res = self
            .client
            .post(&self.config.graphql_url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, self.config.user_agent.as_str())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LoomError::GraphqlStatus {
                status: status.as_u16(),
            });
        }

        let bytes = res.bytes().await?;
        debug!(operation, bytes = bytes.len(), "GraphQL response received");

        let envelope: GraphqlResponse<T> = serde_json::from_slice(&bytes)?;
        if envelope.data.is_none() {
            for err in &envelope.errors {
                warn!(operation, message = %err.message, "GraphQL request rejected");
            }
        } else {
            for err in &envelope.errors {
                debug!(operation, message = %err.message, "GraphQL error entry");
            }
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl LoomApi for LoomClient {
    #[instrument(skip_all, fields(video_id = %video_id))]
    async fn fetch_transcript_descriptor(
        &self,
        video_id: &VideoId,
    ) -> Option<VideoTranscriptDetails> {
        let data = match self
            .post_graphql::<FetchVideoTranscriptData>(
                FETCH_VIDEO_TRANSCRIPT_OP,
                json!({ "videoId": video_id, "password": null }),
                FETCH_VIDEO_TRANSCRIPT,
            )
            .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to fetch transcript descriptor");
                return None;
            }
        };

        match data.and_then(|d| d.fetch_video_transcript) {
            Some(FetchVideoTranscriptResult::VideoTranscriptDetails(details)) => {
                if details.captions_source_url().is_some() {
                    Some(details)
                } else {
                    debug!(
                        status = ?details.transcription_status,
                        "Transcript has no caption source yet"
                    );
                    None
                }
            }
            Some(FetchVideoTranscriptResult::GenericError { message }) => {
                warn!(
                    message = message.as_deref().unwrap_or(""),
                    "Loom returned an error for the transcript"
                );
                None
            }
            Some(FetchVideoTranscriptResult::Unknown) => {
                warn!("Unexpected transcript result variant");
                None
            }
            None => {
                debug!("No transcript returned");
                None
            }
        }
    }

    #[instrument(skip_all, fields(video_id = %video_id))]
    async fn fetch_metadata(&self, video_id: &VideoId) -> Option<VideoMetadata> {
        match self
            .post_graphql::<GetVideoData>(
                GET_VIDEO_INFO_OP,
                json!({ "id": video_id, "password": null }),
                GET_VIDEO_INFO,
            )
            .await
        {
            Ok(data) => {
                let metadata = data
                    .and_then(|d| d.get_video)
                    .and_then(|video| video.into_metadata());
                if metadata.is_none() {
                    debug!("Video metadata not exposed");
                }
                metadata
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch video metadata");
                None
            }
        }
    }

    #[instrument(skip_all, fields(video_id = %video_id))]
    async fn fetch_comments(&self, video_id: &VideoId) -> Option<Vec<Comment>> {
        let data = match self
            .post_graphql::<VideoCommentsData>(
                FETCH_VIDEO_COMMENTS_OP,
                json!({ "id": video_id, "password": null }),
                FETCH_VIDEO_COMMENTS,
            )
            .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to fetch video comments");
                return None;
            }
        };

        match data.and_then(|d| d.video) {
            Some(VideoCommentsResult::RegularUserVideo(video)) => {
                let comments = video.video_comments;
                if let Some(list) = &comments {
                    debug!(count = list.len(), "Comments fetched");
                } else {
                    debug!("Video has no comment collection");
                }
                comments
            }
            Some(VideoCommentsResult::Other) | None => {
                debug!("Comments are not available for this video");
                None
            }
        }
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_caption_payload(&self, url: &str) -> Result<String, LoomError> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        debug!(status = status.as_u16(), "Caption response");

        if !status.is_success() {
            return Err(LoomError::CaptionFetch {
                status: status.as_u16(),
            });
        }

        Ok(res.text().await?)
    }
}
