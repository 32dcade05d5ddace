/// Failure of a single tool invocation.
///
/// Every handler returns `Result<Value, ToolError>`; the `Display` text is
/// exactly what the caller sees in the error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Non-2xx upstream response. Carries the upstream `error` field or the
    /// HTTP status text.
    #[error("{0}")]
    Upstream(String),

    /// The upstream API could not be reached or the body could not be read.
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body is not valid JSON.
    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Invalid arguments for {tool}: {detail}")]
    InvalidArguments { tool: String, detail: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
