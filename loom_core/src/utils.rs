use std::sync::Arc;

use rmcp::model::JsonObject;
use schemars::JsonSchema;

use crate::error::ConnectorError;

/// JSON schema of a tool's input type, in the shape `Tool::input_schema` wants.
pub fn input_schema_for<T: JsonSchema>() -> Result<Arc<JsonObject>, ConnectorError> {
    let schema = serde_json::to_value(schemars::schema_for!(T))?;
    match schema {
        serde_json::Value::Object(map) => Ok(Arc::new(map)),
        other => Err(ConnectorError::InternalError(format!(
            "Tool input schema is not an object: {}",
            other
        ))),
    }
}
