// eAPI HTTP client
//
// Wraps `reqwest::Client` with eAPI-specific request construction and
// envelope unwrapping. Resource modules (api/) are layered on top of the
// three primitives here: run_commands, enable, and configure.

use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::api::acl::StandardAcls;
use crate::auth::Credentials;
use crate::error::Error;
use crate::models::{CommandResult, Encoding, RpcParams, RpcRequest, RpcResponse};
use crate::transport::TransportConfig;

/// A single EOS device reachable over eAPI.
///
/// Holds the HTTP client, the device base URL, and the basic-auth
/// credentials. Every public operation is one `runCmds` round trip;
/// connection reuse is delegated to `reqwest`.
pub struct EapiNode {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl EapiNode {
    /// Create a node from a `TransportConfig`.
    ///
    /// `base_url` is the device root, e.g. `https://switch1.example.net`
    /// or `http://10.0.0.1:8080` for an HTTP-only management VRF.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url, credentials })
    }

    /// Create a node with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self { http, base_url, credentials }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Handle for the standard ACL resources on this node.
    pub fn standard_acls(&self) -> StandardAcls<'_> {
        StandardAcls::new(self)
    }

    /// The eAPI endpoint: `{base}/command-api`.
    fn command_api_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("command-api")?)
    }

    // ── Command primitives ───────────────────────────────────────────

    /// Run a batch of CLI commands in order and return one result per
    /// command.
    ///
    /// The batch is submitted as a single `runCmds` call; the device
    /// stops at the first rejected command, which surfaces here as
    /// [`Error::CommandFailed`].
    pub async fn run_commands(
        &self,
        commands: &[String],
        encoding: Encoding,
    ) -> Result<Vec<CommandResult>, Error> {
        let url = self.command_api_url()?;
        debug!(count = commands.len(), ?encoding, "POST {}", url);

        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RpcParams {
                version: 1,
                cmds: commands,
                format: encoding,
            },
            id: Uuid::new_v4().to_string(),
        };

        let resp = self
            .http
            .post(url)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Run commands in privileged (enable) mode.
    ///
    /// Prepends the `enable` command and drops its result, so the
    /// returned vector lines up with `commands`.
    pub async fn enable(
        &self,
        commands: &[String],
        encoding: Encoding,
    ) -> Result<Vec<CommandResult>, Error> {
        let mut cmds = Vec::with_capacity(commands.len() + 1);
        cmds.push("enable".to_string());
        cmds.extend_from_slice(commands);

        let mut results = self.run_commands(&cmds, encoding).await?;
        if !results.is_empty() {
            results.remove(0);
        }
        Ok(results)
    }

    /// Apply commands to the running configuration.
    ///
    /// Prepends the `configure` mode command and drops its result. The
    /// whole batch goes to the device as one `runCmds` call; a rejected
    /// command surfaces as [`Error::CommandFailed`], whose `outputs`
    /// show how far the batch got before the rejection.
    pub async fn configure(&self, commands: &[String]) -> Result<Vec<CommandResult>, Error> {
        let mut cmds = Vec::with_capacity(commands.len() + 1);
        cmds.push("configure".to_string());
        cmds.extend_from_slice(commands);

        let mut results = self.run_commands(&cmds, Encoding::Json).await?;
        if !results.is_empty() {
            results.remove(0);
        }
        Ok(results)
    }

    /// Parse the JSON-RPC envelope, returning `result` on success or
    /// the mapped error otherwise.
    async fn parse_envelope(&self, resp: reqwest::Response) -> Result<Vec<CommandResult>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "device rejected credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: RpcResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if let Some(err) = envelope.error {
            return Err(Error::CommandFailed {
                code: err.code,
                message: err.message,
                outputs: err.data,
            });
        }

        envelope.result.ok_or(Error::MissingResult)
    }
}
