use serde_json::Value;

use crate::error::ToolError;
use crate::normalize::normalize;
use crate::protocol::PriceParams;
use crate::upstream::{CoinGeckoApi, UpstreamRequest};

/// Build the `/simple/price` request.
///
/// Optional flags are sent only when true.
pub fn request(params: &PriceParams) -> UpstreamRequest {
    UpstreamRequest::new("/simple/price")
        .param("ids", params.ids.join(","))
        .param("vs_currencies", params.vs_currencies.join(","))
        .flag("include_market_cap", params.include_market_cap)
        .flag("include_24hr_vol", params.include_24hr_vol)
        .flag("include_24hr_change", params.include_24hr_change)
}

/// Handle a `get_price` tool call.
pub async fn handle(params: PriceParams, api: &dyn CoinGeckoApi) -> Result<Value, ToolError> {
    normalize(api.get(&request(&params)).await)
}
