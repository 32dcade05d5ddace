use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::error::ToolError;

/// Public CoinGecko v3 API base.
pub const DEFAULT_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// One outbound GET against the CoinGecko API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Path below the API base, starting with `/`.
    pub path: String,
    /// Query parameters in transmission order.
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Append `key=true` only when `flag` is set.
    pub fn flag(self, key: &str, flag: bool) -> Self {
        if flag {
            self.param(key, "true")
        } else {
            self
        }
    }

    /// Look up the value sent for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Query string without the leading `?`.
    ///
    /// Commas separating list elements stay literal; each element is
    /// percent-encoded on its own.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), encode_list(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if self.query.is_empty() {
            format!("{base}{}", self.path)
        } else {
            format!("{base}{}?{}", self.path, self.query_string())
        }
    }
}

fn encode_list(value: &str) -> String {
    value
        .split(',')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Raw HTTP result handed to the response normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl UpstreamResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator behind every tool.
///
/// Implementations perform exactly one GET per call and never retry.
#[async_trait]
pub trait CoinGeckoApi: Send + Sync {
    async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError>;
}

/// `reqwest`-backed client for the live API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ToolError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CoinGeckoApi for CoinGeckoClient {
    async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError> {
        let url = request.url(&self.base_url);
        tracing::debug!(%url, "upstream GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("mcp-coingecko-server/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| ToolError::Transport(format!("fetch failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Transport(format!("failed to read body: {e}")))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            body,
        })
    }
}
