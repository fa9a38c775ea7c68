//! Session configuration, the strategy union and the error taxonomy.

use serde::Deserialize;
use thiserror::Error;

/// Environment used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "mypurecloud.com";

/// HTTP method verbs accepted by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case wire representation of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration accepted at session construction.
///
/// Which optional fields are required depends on `strategy`; violated
/// combinations are rejected by [`SessionConfig::resolve_strategy`] before
/// any I/O happens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Authentication strategy: `"token"`, `"implicit"` or
    /// `"client-credentials"`.
    pub strategy: String,
    /// Environment the session targets, e.g. `mypurecloud.ie`. Defaults to
    /// `mypurecloud.com`.
    #[serde(default)]
    pub environment: Option<String>,
    /// Client identifier for the `implicit` and `client-credentials`
    /// strategies.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret for the `client-credentials` strategy.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Callback URL for the `implicit` strategy.
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// Existing token for the `token` strategy.
    #[serde(default)]
    pub token: Option<String>,
    /// Key the bearer token is persisted under. Without it the token lives
    /// only in memory.
    #[serde(default)]
    pub storage_key: Option<String>,
    /// Opaque state round-tripped through the `implicit` flow.
    #[serde(default)]
    pub state: Option<String>,
}

impl SessionConfig {
    /// Resolves the configured strategy string into the closed strategy
    /// union, failing fast when a required field is missing or the strategy
    /// is unknown.
    pub fn resolve_strategy(&self) -> Result<AuthStrategy, ConfigError> {
        match self.strategy.as_str() {
            "token" => Ok(AuthStrategy::Token),
            "implicit" => Ok(AuthStrategy::Implicit {
                client_id: self.require("implicit", "client_id", &self.client_id)?,
                redirect_url: self.require("implicit", "redirect_url", &self.redirect_url)?,
                state: self.state.clone(),
            }),
            "client-credentials" => Ok(AuthStrategy::ClientCredentials {
                client_id: self.require("client-credentials", "client_id", &self.client_id)?,
                client_secret: self.require("client-credentials", "client_secret", &self.client_secret)?,
            }),
            other => Err(ConfigError::UnsupportedStrategy(other.to_string())),
        }
    }

    fn require(
        &self,
        strategy: &'static str,
        field: &'static str,
        value: &Option<String>,
    ) -> Result<String, ConfigError> {
        value
            .clone()
            .ok_or(ConfigError::MissingField { strategy, field })
    }
}

/// Closed set of authentication strategies. Adding a strategy means adding a
/// variant, not editing a string switch.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Pre-supplied token, trusted verbatim. No network call.
    Token,
    /// Browser implicit grant via the authorize endpoint.
    Implicit {
        /// Client identifier sent to the authorize endpoint.
        client_id: String,
        /// Callback URL the token fragment is delivered to.
        redirect_url: String,
        /// Optional opaque state echoed back in the fragment.
        state: Option<String>,
    },
    /// Machine-to-machine client credentials grant.
    ClientCredentials {
        /// Client identifier for basic authentication.
        client_id: String,
        /// Client secret for basic authentication.
        client_secret: String,
    },
}

/// Invalid or missing configuration. Surfaced synchronously, before any I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The strategy string matches no known variant.
    #[error("authentication strategy {0:?} is not supported")]
    UnsupportedStrategy(String),
    /// A field the selected strategy needs was not provided.
    #[error("the {strategy:?} strategy requires a {field:?} value")]
    MissingField {
        strategy: &'static str,
        field: &'static str,
    },
}

/// A credential exchange failed. The caller may run `login()` again; the
/// session never retries on its own.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-success status.
    #[error("token endpoint {url} returned status {status}: {body}")]
    TokenEndpoint {
        url: String,
        status: u16,
        body: String,
    },
    /// The token endpoint answered 200 but without an `access_token`.
    #[error("token endpoint response did not contain an access_token")]
    MalformedTokenResponse,
    /// The exchange never reached the endpoint.
    #[error("token request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A data call failed, either on the wire or with a non-success status.
/// Carries the request context; never retried.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered outside the 2xx/3xx window.
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },
    /// Transport failure or timeout; the call never completed.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The server answered with success but the body is not valid JSON.
    #[error("{method} {url} returned an unparsable body: {source}")]
    Decode {
        method: Method,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Unified error surface of the session core.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Http(#[from] HttpError),
}
