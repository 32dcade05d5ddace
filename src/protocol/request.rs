use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID — may be a number or string per spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Parameters for the `get_price` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceParams {
    pub ids: Vec<String>,
    pub vs_currencies: Vec<String>,
    #[serde(default)]
    pub include_market_cap: bool,
    #[serde(default)]
    pub include_24hr_vol: bool,
    #[serde(default)]
    pub include_24hr_change: bool,
}

/// Parameters for the `get_coins_list` tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinsListParams {
    #[serde(default)]
    pub include_platform: bool,
}

/// Parameters for the `get_coin_info` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinInfoParams {
    pub id: String,
    #[serde(default = "default_vs_currencies")]
    pub vs_currencies: Vec<String>,
}

fn default_vs_currencies() -> Vec<String> {
    vec!["usd".to_string()]
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
