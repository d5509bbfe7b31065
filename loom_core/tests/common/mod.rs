//! Local stand-in for the Loom GraphQL endpoint and caption CDN.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loom_core::LoomConfig;

pub const VTT: &str = "WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\nHello world\n\n2\n00:00:02.000 --> 00:00:04.000\nGoodbye\n";

/// Response delay for the `slow` video, well past the test client timeout.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// One GraphQL request as the fixture saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct FixtureState {
    base: String,
    requests: Mutex<Vec<Recorded>>,
}

pub struct Fixture {
    pub addr: SocketAddr,
    state: Arc<FixtureState>,
}

impl Fixture {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(FixtureState {
            base: format!("http://{}", addr),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/graphql", post(graphql))
            .route("/captions/{name}", get(captions))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Fixture { addr, state }
    }

    pub fn graphql_url(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn captions_url(&self, name: &str) -> String {
        format!("http://{}/captions/{}", self.addr, name)
    }

    pub fn config(&self) -> LoomConfig {
        LoomConfig::default()
            .with_graphql_url(self.graphql_url())
            .with_timeout(Duration::from_millis(500))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.body["operationName"].as_str().map(str::to_string))
            .collect()
    }
}

pub fn share_url(video: &str) -> String {
    format!("https://www.loom.com/share/{}?sid=test", video)
}

async fn graphql(
    State(state): State<Arc<FixtureState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(Recorded {
        user_agent: header_str(header::USER_AGENT),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let operation = body["operationName"].as_str().unwrap_or_default();
    let video = body["variables"]["videoId"]
        .as_str()
        .or_else(|| body["variables"]["id"].as_str())
        .unwrap_or_default()
        .to_string();

    match video.as_str() {
        "slow" => tokio::time::sleep(SLOW_DELAY).await,
        "broken" => return (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response(),
        "garbled" => return (StatusCode::OK, "<html>not json</html>").into_response(),
        "rejected" => {
            return Json(json!({
                "data": null,
                "errors": [{ "message": "Video not found", "path": [operation] }]
            }))
            .into_response()
        }
        _ => {}
    }

    let data = match operation {
        "FetchVideoTranscript" => transcript_payload(&state.base, &video),
        "GetVideoInfo" => video_payload(&video),
        "fetchVideoComments" => comments_payload(&video),
        _ => return (StatusCode::BAD_REQUEST, "unknown operation").into_response(),
    };

    Json(json!({ "data": data })).into_response()
}

fn transcript_payload(base: &str, video: &str) -> Value {
    let caption = match video {
        "errored" => {
            return json!({
                "fetchVideoTranscript": {
                    "__typename": "GenericError",
                    "message": "Transcript not available"
                }
            })
        }
        "processing" => Value::Null,
        "gone" => json!(format!("{}/captions/missing.vtt", base)),
        _ => json!(format!("{}/captions/hello.vtt", base)),
    };

    let status = if caption.is_null() {
        "in_progress"
    } else {
        "success"
    };

    json!({
        "fetchVideoTranscript": {
            "__typename": "VideoTranscriptDetails",
            "id": format!("t-{}", video),
            "video_id": video,
            "s3_id": null,
            "version": 2,
            "transcript_url": null,
            "captions_url": null,
            "processing_service": "internal",
            "transcription_status": status,
            "processing_start_time": null,
            "processing_end_time": null,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:05:00.000Z",
            "source_url": null,
            "captions_source_url": caption,
            "filler_words": null,
            "filler_word_removal": false
        }
    })
}

fn video_payload(video: &str) -> Value {
    match video {
        "private" => json!({ "getVideo": { "__typename": "PrivateVideo", "id": video } }),
        "cms" => json!({
            "getVideo": {
                "__typename": "CMSUserVideo",
                "id": video,
                "name": "Release notes",
                "description": null
            }
        }),
        _ => json!({
            "getVideo": {
                "__typename": "RegularUserVideo",
                "id": video,
                "name": "Demo",
                "description": "Walkthrough"
            }
        }),
    }
}

fn comments_payload(video: &str) -> Value {
    let comments = match video {
        "quiet" => json!([]),
        "private" => return json!({ "video": { "__typename": "PrivateVideo" } }),
        _ => json!([
            {
                "id": "c1",
                "content": "Nice demo @[Sam](user:7)",
                "plainContent": "Nice demo Sam",
                "time_stamp": 12.5,
                "user_name": "Alex",
                "avatar": {
                    "name": "Alex",
                    "thumb": "https://cdn.loom.com/avatars/alex.png",
                    "isAtlassianMastered": false,
                    "__typename": "Avatar"
                },
                "edited": false,
                "createdAt": "2024-05-01T11:00:00.000Z",
                "isChatMessage": false,
                "user_id": 1001,
                "anon_user_id": null,
                "deletedAt": null,
                "children_comments": [
                    {
                        "id": "r1",
                        "content": "Thanks!",
                        "plainContent": "Thanks!",
                        "time_stamp": null,
                        "user_name": "Sam",
                        "avatar": null,
                        "edited": true,
                        "user_id": 7,
                        "anon_user_id": null,
                        "createdAt": "2024-05-01T11:05:00.000Z",
                        "isChatMessage": false,
                        "comment_post_id": "c1",
                        "extended_reaction": null,
                        "__typename": "PublicVideoComment"
                    }
                ],
                "__typename": "PublicVideoComment"
            },
            {
                "id": "c2",
                "content": "",
                "plainContent": "",
                "time_stamp": null,
                "user_name": "Jo",
                "avatar": null,
                "edited": false,
                "createdAt": "2024-05-02T09:00:00.000Z",
                "isChatMessage": true,
                "user_id": null,
                "anon_user_id": "anon-3",
                "deletedAt": "2024-05-03T09:00:00.000Z",
                "children_comments": [],
                "__typename": "PublicVideoComment"
            }
        ]),
    };

    json!({
        "video": {
            "__typename": "RegularUserVideo",
            "id": video,
            "videoMeetingPlatform": null,
            "video_comments": comments
        }
    })
}

async fn captions(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "hello.vtt" => ([(header::CONTENT_TYPE, "text/vtt")], VTT).into_response(),
        "slow.vtt" => {
            tokio::time::sleep(SLOW_DELAY).await;
            ([(header::CONTENT_TYPE, "text/vtt")], VTT).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "no such caption").into_response(),
    }
}
