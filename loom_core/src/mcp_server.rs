use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{ConnectorError, ProviderRegistry};
use rmcp::model::*;

pub const SERVER_NAME: &str = "loom-transcript";

const SERVER_INSTRUCTIONS: &str = "Loom video tools. getLoomTranscript returns the transcript of a Loom share URL, headed by the video title and description when available. getLoomComments returns the video's comments and replies as JSON.";

/// MCP Server implementation that wraps the ProviderRegistry
pub struct McpServer {
    registry: Arc<Mutex<ProviderRegistry>>,
}

impl McpServer {
    pub fn new(registry: Arc<Mutex<ProviderRegistry>>) -> Self {
        Self { registry }
    }

    /// Get aggregated capabilities from all connectors
    pub async fn get_capabilities(&self) -> ServerCapabilities {
        let registry = self.registry.lock().await;
        let mut capabilities = ServerCapabilities::default();

        for connector in registry.providers.values() {
            let conn_caps = connector.capabilities().await;
            if conn_caps.tools.is_some() {
                capabilities.tools = conn_caps.tools;
            }
            if conn_caps.resources.is_some() {
                capabilities.resources = conn_caps.resources;
            }
            if conn_caps.prompts.is_some() {
                capabilities.prompts = conn_caps.prompts;
            }
        }

        capabilities
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: Option<InitializeRequestParam>,
    ) -> Result<InitializeResult, ConnectorError> {
        match &request {
            Some(req) => info!(
                client = %req.client_info.name,
                client_version = %req.client_info.version,
                "MCP Server initializing"
            ),
            None => info!("MCP Server initializing"),
        }

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.get_capabilities().await,
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        })
    }

    /// Handle list_resources request - aggregates from all connectors
    pub async fn handle_list_resources(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListResourcesResult, ConnectorError> {
        let registry = self.registry.lock().await;
        let mut all_resources = Vec::new();

        for (name, connector) in registry.providers.iter() {
            match connector.list_resources(request.clone()).await {
                Ok(response) => all_resources.extend(response.resources),
                Err(e) => error!(connector = %name, "Error listing resources: {:?}", e),
            }
        }

        Ok(ListResourcesResult {
            resources: all_resources,
            next_cursor: None,
        })
    }

    /// Handle read_resource request - routes to appropriate connector
    pub async fn handle_read_resource(
        &self,
        request: ReadResourceRequestParam,
    ) -> Result<Vec<ResourceContents>, ConnectorError> {
        let registry = self.registry.lock().await;

        // Try each connector until one handles the resource
        for connector in registry.providers.values() {
            match connector.read_resource(request.clone()).await {
                Ok(contents) => return Ok(contents),
                Err(ConnectorError::ResourceNotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ConnectorError::ResourceNotFound)
    }

    /// Handle list_tools request - aggregates from all connectors
    pub async fn handle_list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let registry = self.registry.lock().await;
        let mut all_tools = Vec::new();

        for (name, connector) in registry.providers.iter() {
            match connector.list_tools(request.clone()).await {
                Ok(response) => all_tools.extend(response.tools),
                Err(e) => error!(connector = %name, "Error listing tools: {:?}", e),
            }
        }

        Ok(ListToolsResult {
            tools: all_tools,
            next_cursor: None,
        })
    }

    /// Handle call_tool request - routes to the connector that lists the tool
    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let connector = {
            let registry = self.registry.lock().await;
            let mut owner = None;
            for connector in registry.providers.values() {
                let lists_tool = connector
                    .list_tools(None)
                    .await
                    .map(|r| r.tools.iter().any(|t| t.name == request.name))
                    .unwrap_or(false);
                if lists_tool {
                    owner = Some(connector.clone());
                    break;
                }
            }
            owner
        };

        match connector {
            Some(connector) => {
                debug!(tool = %request.name, connector = connector.name(), "Routing tool call");
                connector.call_tool(request).await
            }
            None => {
                warn!(tool = %request.name, "Unknown tool requested");
                Err(ConnectorError::ToolNotFound)
            }
        }
    }

    /// Handle list_prompts request - aggregates from all connectors
    pub async fn handle_list_prompts(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, ConnectorError> {
        let registry = self.registry.lock().await;
        let mut all_prompts = Vec::new();

        for (name, connector) in registry.providers.iter() {
            match connector.list_prompts(request.clone()).await {
                Ok(response) => all_prompts.extend(response.prompts),
                Err(e) => error!(connector = %name, "Error listing prompts: {:?}", e),
            }
        }

        Ok(ListPromptsResult {
            prompts: all_prompts,
            next_cursor: None,
        })
    }

    /// Handle get_prompt request
    pub async fn handle_get_prompt(&self, name: &str) -> Result<Prompt, ConnectorError> {
        let registry = self.registry.lock().await;

        for connector in registry.providers.values() {
            match connector.get_prompt(name).await {
                Ok(prompt) => return Ok(prompt),
                Err(ConnectorError::MethodNotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ConnectorError::MethodNotFound)
    }
}

/// JSON-RPC message handler for the MCP server
pub struct JsonRpcHandler {
    server: McpServer,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Process one JSON-RPC payload: a single message or a batch array.
    /// Notifications (no `id`) get no response, and a batch made only of
    /// notifications gets none either.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        match request {
            Value::Array(batch) => self.handle_batch(batch).await,
            message => self.handle_message(message).await,
        }
    }

    async fn handle_batch(&self, batch: Vec<Value>) -> Option<Value> {
        if batch.is_empty() {
            warn!("Empty JSON-RPC batch");
            return Some(error_response(
                Value::Null,
                ConnectorError::InvalidRequest("empty batch".to_string()),
            ));
        }

        let mut responses = Vec::with_capacity(batch.len());
        for message in batch {
            if let Some(response) = self.handle_message(message).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            None
        } else {
            Some(Value::Array(responses))
        }
    }

    async fn handle_message(&self, request: Value) -> Option<Value> {
        debug!("Handling JSON-RPC request: {:?}", request);

        let Value::Object(request) = request else {
            warn!("JSON-RPC message is not an object");
            return Some(error_response(
                Value::Null,
                ConnectorError::InvalidRequest("message must be a JSON object".to_string()),
            ));
        };

        let id = request.get("id").cloned();
        let Some(method) = request.get("method").and_then(Value::as_str) else {
            warn!("JSON-RPC message has no method");
            return Some(error_response(
                id.unwrap_or(Value::Null),
                ConnectorError::InvalidRequest("missing method".to_string()),
            ));
        };
        let params = match request.get("params") {
            Some(Value::Null) | None => json!({}),
            Some(p) => p.clone(),
        };

        if method.starts_with("notifications/") {
            debug!(method, "Notification received");
            return None;
        }

        let result = match method {
            "initialize" => {
                let req = serde_json::from_value::<InitializeRequestParam>(params).ok();
                to_json(self.server.handle_initialize(req).await)
            }
            "ping" => Ok(json!({})),
            "resources/list" => match parse_params::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_json(self.server.handle_list_resources(req).await),
                Err(e) => Err(e.to_jsonrpc_error()),
            },
            "resources/read" => match parse_params::<ReadResourceRequestParam>(params) {
                Ok(req) => to_json(self.server.handle_read_resource(req).await),
                Err(e) => Err(e.to_jsonrpc_error()),
            },
            "tools/list" => match parse_params::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_json(self.server.handle_list_tools(req).await),
                Err(e) => Err(e.to_jsonrpc_error()),
            },
            "tools/call" => match parse_params::<CallToolRequestParam>(params) {
                Ok(req) => to_json(self.server.handle_call_tool(req).await),
                Err(e) => Err(e.to_jsonrpc_error()),
            },
            "prompts/list" => match parse_params::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_json(self.server.handle_list_prompts(req).await),
                Err(e) => Err(e.to_jsonrpc_error()),
            },
            "prompts/get" => match params.get("name").and_then(|n| n.as_str()) {
                Some(name) => to_json(self.server.handle_get_prompt(name).await),
                None => Err(
                    ConnectorError::InvalidParams("Missing 'name' parameter".to_string())
                        .to_jsonrpc_error(),
                ),
            },
            _ => {
                debug!(method, "Unsupported method");
                Err(ConnectorError::MethodNotFound.to_jsonrpc_error())
            }
        };

        // A request without an id is a notification even if the method is not
        // in the notifications/ namespace.
        let id = id?;

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ConnectorError> {
    serde_json::from_value(params).map_err(|e| ConnectorError::InvalidParams(e.to_string()))
}

fn to_json<T: serde::Serialize>(result: Result<T, ConnectorError>) -> Result<Value, Value> {
    result
        .and_then(|r| serde_json::to_value(r).map_err(ConnectorError::SerdeJson))
        .map_err(|e| e.to_jsonrpc_error())
}

fn error_response(id: Value, error: ConnectorError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": error.to_jsonrpc_error(),
        "id": id,
    })
}

/// JSON-RPC error response for input that is not valid JSON.
pub fn parse_error_response(detail: impl std::fmt::Display) -> Value {
    error_response(Value::Null, ConnectorError::ParseError(detail.to_string()))
}
