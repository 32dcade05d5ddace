pub mod coin_info;
pub mod coins_list;
pub mod price;
pub mod trending;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ToolError;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolResult,
};
use crate::schema;
use crate::tools::{self, ToolDescriptor, GET_COINS_LIST, GET_COIN_INFO, GET_PRICE, GET_TRENDING};
use crate::upstream::CoinGeckoApi;

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(
    req: &JsonRpcRequest,
    api: &Arc<dyn CoinGeckoApi>,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    protocol_version = params.protocol_version.as_deref().unwrap_or("unknown"),
                    client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    "initialize"
                );
            }
            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "mcp-coingecko-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => {
            let result = serde_json::json!({ "tools": tools::registry() });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, api).await;
            let result_json = serde_json::to_value(&tool_result).expect("ToolResult must serialize to JSON Value");
            Some(JsonRpcResponse::success(req.id.clone(), result_json))
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

/// Route a `tools/call` to its handler and wrap the outcome in an envelope.
///
/// Never fails: unknown tools, bad arguments, upstream failures and even a
/// panicking handler all come back as `isError: true`.
pub async fn dispatch_tool_call(params: &ToolCallParams, api: &Arc<dyn CoinGeckoApi>) -> ToolResult {
    let Some(tool) = tools::find(&params.name) else {
        tracing::warn!(tool = %params.name, "unknown tool");
        return ToolError::UnknownTool(params.name.clone()).into();
    };

    let arguments = params
        .arguments
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));
    let api = Arc::clone(api);
    let task = tokio::spawn(async move { run_tool(tool, arguments, api.as_ref()).await });

    match task.await {
        Ok(outcome) => {
            if let Err(err) = &outcome {
                tracing::warn!(tool = tool.name, "tool call failed: {err}");
            }
            ToolResult::from_outcome(outcome)
        }
        Err(join_err) => {
            tracing::error!(tool = tool.name, "tool task aborted: {join_err}");
            ToolError::Internal(format!("{} did not complete: {join_err}", tool.name)).into()
        }
    }
}

async fn run_tool(
    tool: &'static ToolDescriptor,
    arguments: Value,
    api: &dyn CoinGeckoApi,
) -> Result<Value, ToolError> {
    match tool.name {
        GET_PRICE => price::handle(parse_arguments(tool, arguments)?, api).await,
        GET_COINS_LIST => coins_list::handle(parse_arguments(tool, arguments)?, api).await,
        GET_COIN_INFO => coin_info::handle(parse_arguments(tool, arguments)?, api).await,
        GET_TRENDING => {
            check_arguments(tool, &arguments)?;
            trending::handle(api).await
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// Validate against the declared input schema, then decode.
fn parse_arguments<T: DeserializeOwned>(
    tool: &ToolDescriptor,
    arguments: Value,
) -> Result<T, ToolError> {
    check_arguments(tool, &arguments)?;
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name.to_string(),
        detail: e.to_string(),
    })
}

fn check_arguments(tool: &ToolDescriptor, arguments: &Value) -> Result<(), ToolError> {
    schema::validate_value(&tool.input_schema, arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name.to_string(),
        detail: e.to_string(),
    })
}
