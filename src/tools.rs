use std::sync::OnceLock;

use serde::Serialize;
use serde_json::{json, Value};

pub const GET_PRICE: &str = "get_price";
pub const GET_COINS_LIST: &str = "get_coins_list";
pub const GET_COIN_INFO: &str = "get_coin_info";
pub const GET_TRENDING: &str = "get_trending";

/// One entry of the `tools/list` catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// The static tool catalog, in advertised order.
pub fn registry() -> &'static [ToolDescriptor] {
    static REGISTRY: OnceLock<Vec<ToolDescriptor>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

/// Look up a registered tool by name.
pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    registry().iter().find(|tool| tool.name == name)
}

fn build_registry() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: GET_PRICE,
            description: "Get current prices of coins in the given vs currencies",
            input_schema: json!({
                "type": "object",
                "required": ["ids", "vs_currencies"],
                "properties": {
                    "ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Coin ids, e.g. [\"bitcoin\", \"ethereum\"]"
                    },
                    "vs_currencies": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Target currencies, e.g. [\"usd\", \"eur\"]"
                    },
                    "include_market_cap": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include market capitalization"
                    },
                    "include_24hr_vol": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include 24 hour trading volume"
                    },
                    "include_24hr_change": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include 24 hour price change"
                    }
                }
            }),
        },
        ToolDescriptor {
            name: GET_COINS_LIST,
            description: "List all supported coins with id, symbol and name",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "include_platform": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include platform contract addresses"
                    }
                }
            }),
        },
        ToolDescriptor {
            name: GET_COIN_INFO,
            description: "Get detailed information and market data for a coin",
            input_schema: json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Coin id, e.g. \"bitcoin\""
                    },
                    "vs_currencies": {
                        "type": "array",
                        "items": { "type": "string" },
                        "default": ["usd"],
                        "description": "Currencies to keep in the market data"
                    }
                }
            }),
        },
        ToolDescriptor {
            name: GET_TRENDING,
            description: "Get trending coins searched on CoinGecko in the last 24 hours",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}
