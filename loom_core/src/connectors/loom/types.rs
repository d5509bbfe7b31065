use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// GraphQL response envelope: `{ "data": ..., "errors": [...] }`
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// --- FetchVideoTranscript ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchVideoTranscriptData {
    pub fetch_video_transcript: Option<FetchVideoTranscriptResult>,
}

/// Union returned by `fetchVideoTranscript`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum FetchVideoTranscriptResult {
    VideoTranscriptDetails(VideoTranscriptDetails),
    GenericError {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Transcript descriptor for a video. Only `captions_source_url` is used;
/// the rest is kept so the upstream shape is modeled in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoTranscriptDetails {
    pub id: Option<String>,
    pub video_id: Option<String>,
    pub s3_id: Option<String>,
    pub version: Option<Value>,
    pub transcript_url: Option<String>,
    pub captions_url: Option<String>,
    pub processing_service: Option<String>,
    pub transcription_status: Option<String>,
    pub processing_start_time: Option<Value>,
    pub processing_end_time: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<Value>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<Value>,
    pub source_url: Option<String>,
    pub captions_source_url: Option<String>,
    pub filler_words: Option<Value>,
    pub filler_word_removal: Option<Value>,
}

impl VideoTranscriptDetails {
    /// Location of the WebVTT caption file, if Loom produced one.
    pub fn captions_source_url(&self) -> Option<&str> {
        self.captions_source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

// --- GetVideoInfo ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVideoData {
    pub get_video: Option<GetVideoResult>,
}

/// Union returned by `getVideo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum GetVideoResult {
    RegularUserVideo(VideoSummary),
    #[serde(rename = "CMSUserVideo")]
    CmsUserVideo(VideoSummary),
    PrivateVideo {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GetVideoResult {
    /// Title and description, when the variant exposes a name.
    pub fn into_metadata(self) -> Option<VideoMetadata> {
        match self {
            GetVideoResult::RegularUserVideo(video) | GetVideoResult::CmsUserVideo(video) => {
                let title = video.name.filter(|name| !name.is_empty())?;
                Some(VideoMetadata {
                    title,
                    description: video.description.filter(|d| !d.is_empty()),
                })
            }
            GetVideoResult::PrivateVideo { .. } | GetVideoResult::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: Option<String>,
}

// --- fetchVideoComments ---

#[derive(Debug, Deserialize)]
pub struct VideoCommentsData {
    pub video: Option<VideoCommentsResult>,
}

/// The comments query only selects fields on `RegularUserVideo`; every other
/// variant arrives with nothing but its type name.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum VideoCommentsResult {
    RegularUserVideo(RegularUserVideoComments),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegularUserVideoComments {
    pub id: Option<String>,
    #[serde(rename = "videoMeetingPlatform")]
    pub video_meeting_platform: Option<Value>,
    pub video_comments: Option<Vec<Comment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub name: Option<String>,
    pub thumb: Option<String>,
    #[serde(rename = "isAtlassianMastered")]
    pub is_atlassian_mastered: Option<bool>,
}

/// A top-level comment on a video. Field order follows the upstream fragment
/// so the serialized tree reads the same as the API response. Every field is
/// nullable upstream and an explicit `null` renders back as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<String>,
    /// Rich content, with mention markup.
    pub content: Option<String>,
    #[serde(rename = "plainContent")]
    pub plain_content: Option<String>,
    /// Seconds into the video the comment is pinned to.
    pub time_stamp: Option<Number>,
    pub user_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub edited: Option<bool>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "isChatMessage")]
    pub is_chat_message: Option<bool>,
    /// String or number depending on the account type.
    pub user_id: Option<Value>,
    pub anon_user_id: Option<Value>,
    #[serde(rename = "deletedAt")]
    pub deleted_at: Option<String>,
    pub children_comments: Option<Vec<CommentReply>>,
}

/// A reply to a [`Comment`]. Replies do not nest further.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentReply {
    pub id: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "plainContent")]
    pub plain_content: Option<String>,
    pub time_stamp: Option<Number>,
    pub user_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub edited: Option<bool>,
    pub user_id: Option<Value>,
    pub anon_user_id: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "isChatMessage")]
    pub is_chat_message: Option<bool>,
    /// Id of the parent comment.
    pub comment_post_id: Option<String>,
    pub extended_reaction: Option<Value>,
}
