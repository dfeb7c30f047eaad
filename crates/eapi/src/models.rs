// eAPI JSON-RPC envelope types
//
// eAPI is JSON-RPC 2.0 with a single method, `runCmds`. Requests carry an
// ordered list of CLI commands; responses carry one result object per
// command, or a top-level `error` object if any command was rejected.

use serde::{Deserialize, Serialize};

/// Output encoding requested from the device.
///
/// `Json` yields structured per-command objects for commands that have a
/// JSON model; `Text` yields the raw CLI output in each result's `output`
/// field. The show-command parsers in [`crate::api`] rely on `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Json,
    Text,
}

/// A `runCmds` JSON-RPC request.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: RpcParams<'a>,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcParams<'a> {
    pub version: u32,
    pub cmds: &'a [String],
    pub format: Encoding,
}

/// A JSON-RPC response envelope: exactly one of `result` / `error` is set.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Vec<CommandResult>>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// The JSON-RPC error object returned when a command is rejected.
///
/// `data` holds the per-command results accumulated before the failure;
/// the last element carries the CLI error strings for the command that
/// was rejected.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Vec<CommandResult>,
}

/// The result object for a single CLI command.
///
/// With [`Encoding::Text`] the device puts the raw CLI output in `output`.
/// With [`Encoding::Json`] the fields vary per command and land in the
/// `extra` catch-all.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResult {
    #[serde(default)]
    pub output: Option<String>,
    /// CLI error strings, present on the rejected command inside an
    /// error envelope's `data`.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Catch-all for command-specific JSON fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
