use thiserror::Error;

use crate::models::CommandResult;

/// Top-level error type for the `eapi` crate.
///
/// Covers every failure mode of the eAPI surface: authentication, HTTP
/// transport, the JSON-RPC envelope, and CLI command rejection by the
/// device.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the HTTP credentials.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Command API ─────────────────────────────────────────────────
    /// The device rejected one of the submitted CLI commands.
    ///
    /// eAPI stops at the first failing command; `outputs` holds the
    /// per-command results up to and including the rejected one, so a
    /// caller can see exactly how far a batch got.
    #[error("Command failed (code {code}): {message}")]
    CommandFailed {
        code: i64,
        message: String,
        outputs: Vec<CommandResult>,
    },

    /// The JSON-RPC response carried neither `result` nor `error`.
    #[error("Malformed eAPI response: missing result")]
    MissingResult,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates rejected credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Extract the JSON-RPC error code, if available.
    pub fn command_error_code(&self) -> Option<i64> {
        match self {
            Self::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}
