pub mod request;
pub mod response;

pub use request::{
    CoinInfoParams, CoinsListParams, InitializeParams, JsonRpcRequest, PriceParams, RpcId,
    ToolCallParams,
};
pub use response::{JsonRpcError, JsonRpcResponse, ToolResult, ToolResultContent};
