//! In-process stand-in for the CoinGecko API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mcp_coingecko_server::error::ToolError;
use mcp_coingecko_server::upstream::{CoinGeckoApi, UpstreamRequest, UpstreamResponse};

pub enum Reply {
    Response(UpstreamResponse),
    NetworkFailure(String),
    Panic,
}

/// Answers every GET with the same canned reply and records the requests.
pub struct StubApi {
    reply: Reply,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl StubApi {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 200 OK with `body` serialized as JSON.
    pub fn ok_json(body: serde_json::Value) -> Self {
        Self::raw(200, "OK", &body.to_string())
    }

    pub fn raw(status: u16, status_text: &str, body: &str) -> Self {
        Self::new(Reply::Response(UpstreamResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }))
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> UpstreamRequest {
        self.requests().pop().expect("no upstream request was made")
    }
}

#[async_trait]
impl CoinGeckoApi for StubApi {
    async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Response(resp) => Ok(resp.clone()),
            Reply::NetworkFailure(msg) => Err(ToolError::Transport(msg.clone())),
            Reply::Panic => panic!("stub upstream blew up"),
        }
    }
}

/// Share a stub both as the concrete type (for inspection) and as the trait
/// object the dispatcher takes.
pub fn shared(stub: StubApi) -> (Arc<StubApi>, Arc<dyn CoinGeckoApi>) {
    let stub = Arc::new(stub);
    let api: Arc<dyn CoinGeckoApi> = stub.clone();
    (stub, api)
}
