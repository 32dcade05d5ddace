use serde_json::Value;

use crate::error::ToolError;
use crate::normalize::normalize;
use crate::upstream::{CoinGeckoApi, UpstreamRequest};

pub fn request() -> UpstreamRequest {
    UpstreamRequest::new("/search/trending")
}

/// Handle a `get_trending` tool call. The payload is passed through as is.
pub async fn handle(api: &dyn CoinGeckoApi) -> Result<Value, ToolError> {
    normalize(api.get(&request()).await)
}
