//! GraphQL documents sent to Loom. Operation names must match the
//! `query <Name>` header of each document.

pub const FETCH_VIDEO_TRANSCRIPT_OP: &str = "FetchVideoTranscript";

pub const FETCH_VIDEO_TRANSCRIPT: &str = r#"query FetchVideoTranscript($videoId: ID!, $password: String) {
  fetchVideoTranscript(videoId: $videoId, password: $password) {
    ... on VideoTranscriptDetails {
      id
      video_id
      s3_id
      version
      transcript_url
      captions_url
      processing_service
      transcription_status
      processing_start_time
      processing_end_time
      createdAt
      updatedAt
      source_url
      captions_source_url
      filler_words
      filler_word_removal
      __typename
    }
    ... on GenericError {
      message
      __typename
    }
    __typename
  }
}"#;

pub const GET_VIDEO_INFO_OP: &str = "GetVideoInfo";

pub const GET_VIDEO_INFO: &str = r#"query GetVideoInfo($id: ID!, $password: String) {
  getVideo(id: $id, password: $password) {
    ... on RegularUserVideo {
      id
      name
      description
      __typename
    }
    ... on PrivateVideo {
      id
      __typename
    }
    ... on CMSUserVideo {
      id
      name
      description
      __typename
    }
    __typename
  }
}"#;

pub const FETCH_VIDEO_COMMENTS_OP: &str = "fetchVideoComments";

pub const FETCH_VIDEO_COMMENTS: &str = r#"query fetchVideoComments($id: ID!, $password: String) {
  video: getVideo(id: $id, password: $password) {
    __typename
    ... on RegularUserVideo {
      id
      videoMeetingPlatform
      video_comments(includeDeleted: true) {
        ...CommentPostFragment
        __typename
      }
      __typename
    }
  }
}

fragment CommentPostFragment on PublicVideoComment {
  id
  content(withMentionMarkups: true)
  plainContent: content(withMentionMarkups: false)
  time_stamp
  user_name
  avatar {
    name
    thumb
    isAtlassianMastered
    __typename
  }
  edited
  createdAt
  isChatMessage
  user_id
  anon_user_id
  deletedAt
  children_comments {
    ...CommentReplyFragment
    __typename
  }
  __typename
}

fragment CommentReplyFragment on PublicVideoComment {
  id
  content(withMentionMarkups: true)
  plainContent: content(withMentionMarkups: false)
  time_stamp
  user_name
  avatar {
    name
    thumb
    isAtlassianMastered
    __typename
  }
  edited
  user_id
  anon_user_id
  createdAt
  isChatMessage
  comment_post_id
  extended_reaction
  __typename
}"#;
