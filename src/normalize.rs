use serde_json::Value;

use crate::error::ToolError;
use crate::upstream::UpstreamResponse;

/// Turn one upstream call outcome into the decoded payload or a tool error.
///
/// Non-2xx responses report the body's `error` field when the body is a JSON
/// object carrying one, otherwise the HTTP status text.
pub fn normalize(outcome: Result<UpstreamResponse, ToolError>) -> Result<Value, ToolError> {
    let response = outcome?;

    if !response.ok() {
        let message = upstream_error_message(&response);
        tracing::warn!(status = response.status, %message, "upstream request failed");
        return Err(ToolError::Upstream(message));
    }

    serde_json::from_str(&response.body).map_err(|e| {
        tracing::warn!("upstream body is not JSON: {e}");
        ToolError::MalformedBody(e)
    })
}

fn upstream_error_message(response: &UpstreamResponse) -> String {
    let parsed: Option<Value> = serde_json::from_str(&response.body).ok();
    match parsed.as_ref().and_then(|body| body.get("error")) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) | Some(Value::Null) | Some(Value::Bool(false)) | None => {
            response.status_text.clone()
        }
        Some(other) => other.to_string(),
    }
}

/// Render a payload the way every success envelope carries it.
pub fn render(payload: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(payload).map_err(ToolError::from)
}
