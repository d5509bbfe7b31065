mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{share_url, Fixture, SLOW_DELAY, VTT};
use loom_core::connectors::loom::{LoomApi, LoomClient, LoomService, ToolOutcome};
use loom_core::resolver::extract_video_id;
use loom_core::LoomError;
use serde_json::Value;

fn service(fixture: &Fixture) -> LoomService {
    LoomService::new(Arc::new(LoomClient::new(fixture.config()).unwrap()))
}

#[tokio::test]
async fn transcript_with_title_and_description() {
    let fixture = Fixture::start().await;

    let outcome = service(&fixture).get_transcript(&share_url("happy")).await;

    assert_eq!(
        outcome,
        ToolOutcome::Success(
            "# Demo\n\n**Description:** Walkthrough\n\n---\n\n## Transcript\n\nHello world Goodbye"
                .to_string()
        )
    );

    let mut operations = fixture.operations();
    operations.sort();
    assert_eq!(operations, vec!["FetchVideoTranscript", "GetVideoInfo"]);
}

#[tokio::test]
async fn cms_video_without_description() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_transcript(&share_url("cms")).await;
    assert_eq!(
        outcome.text(),
        "# Release notes\n\n---\n\n## Transcript\n\nHello world Goodbye"
    );
}

#[tokio::test]
async fn private_video_yields_body_only() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_transcript(&share_url("private")).await;
    assert_eq!(outcome, ToolOutcome::Success("Hello world Goodbye".to_string()));
}

#[tokio::test]
async fn generic_error_means_no_transcript() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_transcript(&share_url("errored")).await;
    assert_eq!(
        outcome.text(),
        "Error: Could not fetch transcript for this video."
    );
}

#[tokio::test]
async fn transcript_still_processing_has_no_captions() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture)
        .get_transcript(&share_url("processing"))
        .await;
    assert!(outcome.is_failure());
    assert!(outcome.text().contains("Could not fetch transcript"));
}

#[tokio::test]
async fn missing_caption_file_reports_status() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_transcript(&share_url("gone")).await;
    assert_eq!(
        outcome.text(),
        "Error: Failed to fetch transcript: HTTP error! status: 404"
    );
}

#[tokio::test]
async fn invalid_url_never_reaches_upstream() {
    let fixture = Fixture::start().await;
    let svc = service(&fixture);

    let transcript = svc.get_transcript("https://www.loom.com/looms/videos").await;
    let comments = svc.get_comments("").await;

    assert!(transcript.text().contains("Could not extract video ID"));
    assert!(comments.text().contains("Could not extract video ID"));
    assert!(fixture.requests().is_empty());
}

#[tokio::test]
async fn comments_keep_wire_shape_and_order() {
    let fixture = Fixture::start().await;

    let outcome = service(&fixture).get_comments(&share_url("chatty")).await;
    let text = match outcome {
        ToolOutcome::Success(text) => text,
        other => panic!("expected comments, got {:?}", other),
    };

    assert!(text.contains("\n  {\n    \"id\": \"c1\""), "not pretty printed: {text}");
    let comments: Value = serde_json::from_str(&text).unwrap();
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);

    assert_eq!(comments[0]["id"], "c1");
    assert_eq!(comments[0]["plainContent"], "Nice demo Sam");
    assert_eq!(comments[0]["time_stamp"], 12.5);
    assert_eq!(comments[0]["avatar"]["thumb"], "https://cdn.loom.com/avatars/alex.png");
    assert_eq!(comments[0]["children_comments"][0]["comment_post_id"], "c1");
    assert_eq!(comments[0]["children_comments"][0]["edited"], true);
    assert!(comments[0]["children_comments"][0]["avatar"].is_null());
    assert!(comments[0]["children_comments"][0]["time_stamp"].is_null());
    assert!(comments[0].get("__typename").is_none());

    // Deleted comments are part of the tree.
    assert_eq!(comments[1]["deletedAt"], "2024-05-03T09:00:00.000Z");
    assert_eq!(comments[1]["anon_user_id"], "anon-3");
    assert!(comments[1]["user_id"].is_null());
}

#[tokio::test]
async fn empty_comment_list_is_success() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_comments(&share_url("quiet")).await;
    assert_eq!(outcome, ToolOutcome::Success("[]".to_string()));
}

#[tokio::test]
async fn comments_unavailable_for_private_video() {
    let fixture = Fixture::start().await;
    let outcome = service(&fixture).get_comments(&share_url("private")).await;
    assert_eq!(
        outcome.text(),
        "Error: Could not fetch comments for this video."
    );
}

#[tokio::test]
async fn graphql_requests_carry_headers_and_variables() {
    let fixture = Fixture::start().await;
    let config = fixture.config();
    let client = LoomClient::new(config.clone()).unwrap();
    let id = extract_video_id(&share_url("happy")).unwrap();

    assert!(client.fetch_comments(&id).await.is_some());

    let requests = fixture.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.user_agent.as_deref(), Some(config.user_agent.as_str()));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.body["operationName"], "fetchVideoComments");
    assert_eq!(request.body["variables"]["id"], "happy");
    assert!(request.body["variables"]["password"].is_null());
    assert!(request.body["query"]
        .as_str()
        .unwrap()
        .contains("video_comments(includeDeleted: true)"));
}

#[tokio::test]
async fn upstream_failures_downgrade_to_absent() {
    let fixture = Fixture::start().await;
    let client = LoomClient::new(fixture.config()).unwrap();

    for video in ["broken", "garbled"] {
        let id = extract_video_id(&share_url(video)).unwrap();
        assert!(client.fetch_metadata(&id).await.is_none(), "{video}");
        assert!(client.fetch_transcript_descriptor(&id).await.is_none(), "{video}");
        assert!(client.fetch_comments(&id).await.is_none(), "{video}");
    }
}

#[tokio::test]
async fn graphql_errors_without_data_are_absent() {
    let fixture = Fixture::start().await;
    let svc = service(&fixture);

    let transcript = svc.get_transcript(&share_url("rejected")).await;
    let comments = svc.get_comments(&share_url("rejected")).await;

    assert_eq!(
        transcript.text(),
        "Error: Could not fetch transcript for this video."
    );
    assert_eq!(
        comments.text(),
        "Error: Could not fetch comments for this video."
    );
    assert_eq!(fixture.requests().len(), 3);
}

#[tokio::test]
async fn slow_upstream_is_cut_off_by_timeout() {
    let fixture = Fixture::start().await;
    let svc = service(&fixture);

    let started = Instant::now();
    let outcome = svc.get_transcript(&share_url("slow")).await;

    assert!(outcome.text().contains("Could not fetch transcript"));
    assert!(started.elapsed() < SLOW_DELAY);
}

#[tokio::test]
async fn caption_download_timeout_is_reported() {
    let fixture = Fixture::start().await;
    let client =
        LoomClient::new(fixture.config().with_timeout(Duration::from_millis(200))).unwrap();

    let err = client
        .fetch_caption_payload(&fixture.captions_url("slow.vtt"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoomError::Timeout), "{err:?}");

    let payload = client
        .fetch_caption_payload(&fixture.captions_url("hello.vtt"))
        .await
        .unwrap();
    assert_eq!(payload, VTT);
}
