use serde_json::Value;

use crate::error::ToolError;
use crate::normalize::normalize;
use crate::protocol::CoinsListParams;
use crate::upstream::{CoinGeckoApi, UpstreamRequest};

pub fn request(params: &CoinsListParams) -> UpstreamRequest {
    UpstreamRequest::new("/coins/list").flag("include_platform", params.include_platform)
}

/// Handle a `get_coins_list` tool call.
pub async fn handle(params: CoinsListParams, api: &dyn CoinGeckoApi) -> Result<Value, ToolError> {
    normalize(api.get(&request(&params)).await)
}
