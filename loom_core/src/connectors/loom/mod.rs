use async_trait::async_trait;
use rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::info;

use crate::config::LoomConfig;
use crate::error::ConnectorError;
use crate::utils::input_schema_for;
use crate::Connector;

pub mod captions;
pub mod client;
pub mod queries;
pub mod service;
pub mod types;

pub use client::{LoomApi, LoomClient};
pub use service::{format_transcript, LoomService, ToolOutcome};
pub use types::{Avatar, Comment, CommentReply, VideoMetadata, VideoTranscriptDetails};

pub const GET_TRANSCRIPT_TOOL: &str = "getLoomTranscript";
pub const GET_COMMENTS_TOOL: &str = "getLoomComments";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoUrlInput {
    /// The Loom video URL (e.g., https://www.loom.com/share/123456)
    pub video_url: String,
}

/// Exposes Loom transcripts and comments as MCP tools.
#[derive(Clone)]
pub struct LoomConnector {
    service: LoomService,
}

impl LoomConnector {
    pub fn new(config: LoomConfig) -> Result<Self, ConnectorError> {
        let client = LoomClient::new(config)?;
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Build the connector over any [`LoomApi`], e.g. a test double.
    pub fn with_api(api: Arc<dyn LoomApi>) -> Self {
        Self {
            service: LoomService::new(api),
        }
    }
}

#[async_trait]
impl Connector for LoomConnector {
    fn name(&self) -> &'static str {
        "loom"
    }

    fn description(&self) -> &'static str {
        "Transcripts and comments for Loom videos."
    }

    async fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.capabilities().await,
            server_info: Implementation {
                name: self.name().to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Loom connector for video transcripts, titles, descriptions and comments"
                    .to_string(),
            ),
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListResourcesResult, ConnectorError> {
        Ok(ListResourcesResult {
            resources: vec![],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        _request: ReadResourceRequestParam,
    ) -> Result<Vec<ResourceContents>, ConnectorError> {
        Err(ConnectorError::ResourceNotFound)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let input_schema = input_schema_for::<VideoUrlInput>()?;
        let tools = vec![
            Tool {
                name: Cow::Borrowed(GET_TRANSCRIPT_TOOL),
                title: None,
                description: Some(Cow::Borrowed(
                    "Get transcript text, title, and description from a Loom video URL",
                )),
                input_schema: input_schema.clone(),
                output_schema: None,
                annotations: None,
                icons: None,
            },
            Tool {
                name: Cow::Borrowed(GET_COMMENTS_TOOL),
                title: None,
                description: Some(Cow::Borrowed("Get comments from a Loom video URL")),
                input_schema,
                output_schema: None,
                annotations: None,
                icons: None,
            },
        ];

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let name = request.name.as_ref();
        let args = request.arguments.unwrap_or_default();

        let outcome = match name {
            GET_TRANSCRIPT_TOOL => {
                let input = parse_input(args)?;
                info!(tool = name, url = %input.video_url, "Tool invoked");
                self.service.get_transcript(&input.video_url).await
            }
            GET_COMMENTS_TOOL => {
                let input = parse_input(args)?;
                info!(tool = name, url = %input.video_url, "Tool invoked");
                self.service.get_comments(&input.video_url).await
            }
            _ => return Err(ConnectorError::ToolNotFound),
        };

        Ok(outcome.into_call_tool_result())
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, ConnectorError> {
        Ok(ListPromptsResult {
            prompts: vec![],
            next_cursor: None,
        })
    }

    async fn get_prompt(&self, _name: &str) -> Result<Prompt, ConnectorError> {
        Err(ConnectorError::MethodNotFound)
    }
}

fn parse_input(args: JsonObject) -> Result<VideoUrlInput, ConnectorError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ConnectorError::InvalidParams(e.to_string()))
}
