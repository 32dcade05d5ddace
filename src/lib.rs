//! MCP server for the CoinGecko public API.
//!
//! Exposes `get_price`, `get_coins_list`, `get_coin_info` and `get_trending`
//! tools over JSON-RPC 2.0, on stdio or a TCP listener. Every tool call makes
//! exactly one GET against <https://api.coingecko.com/api/v3> and answers
//! with a single-text-block result, flagged `isError` on failure.

pub mod config;
pub mod error;
pub mod handlers;
pub mod normalize;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod upstream;

pub mod schema;
