// Protocol-level errors use standard JSON-RPC error codes
// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Tool not found")]
    ToolNotFound,

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found")]
    MethodNotFound,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ConnectorError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ConnectorError::InvalidParams(_) => "invalid_params",
            ConnectorError::ResourceNotFound => "not_found",
            ConnectorError::ToolNotFound => "tool_not_found",
            ConnectorError::MethodNotFound => "method_not_found",
            ConnectorError::ParseError(_) => "parse_error",
            ConnectorError::InvalidRequest(_) => "invalid_request",
            ConnectorError::InternalError(_) | ConnectorError::SerdeJson(_) => "internal_error",
        }
    }

    pub fn to_jsonrpc_error(&self) -> serde_json::Value {
        let (code, message) = match self {
            ConnectorError::ResourceNotFound => (-32602, "Resource not found".to_string()),
            ConnectorError::ToolNotFound => (-32602, "Tool not found".to_string()),
            ConnectorError::InternalError(msg) => (-32603, msg.to_string()),
            ConnectorError::InvalidParams(msg) => (-32602, msg.to_string()),
            ConnectorError::MethodNotFound => (-32601, "Method not found".to_string()),
            ConnectorError::ParseError(_) => (-32700, "Parse error".to_string()),
            ConnectorError::InvalidRequest(_) => (-32600, "Invalid Request".to_string()),
            err => (-32603, err.to_string()),
        };

        let mut data = json!({ "kind": self.code_str() });
        if let ConnectorError::ParseError(detail) | ConnectorError::InvalidRequest(detail) = self {
            data["detail"] = json!(detail);
        }

        json!({
            "code": code,
            "message": message,
            "data": data,
        })
    }
}

/// Failures talking to the Loom API.
///
/// The GraphQL lookups swallow these and report "absent" to their callers;
/// only the caption download hands one back, so the transcript tool can say
/// what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum LoomError {
    #[error("HTTP error! status: {status}")]
    CaptionFetch { status: u16 },

    #[error("GraphQL request failed with status {status}")]
    GraphqlStatus { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Http(reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LoomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LoomError::Timeout
        } else {
            LoomError::Http(err)
        }
    }
}
