//! Strategy execution: the client-credentials exchange and the two-phase
//! implicit flow.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::instrument;
use urlencoding::encode;

use super::http_client::{HttpClient, HttpRequest};
use super::pipeline::REQUEST_TIMEOUT;
use super::types::{AuthError, Method};

/// Redirect the host must perform to continue an implicit login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInstruction {
    /// Fully assembled authorize-endpoint URL.
    pub url: String,
}

/// Token material recovered from an implicit-flow callback fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplicitCallback {
    /// Access token delivered in the fragment, if any.
    pub access_token: Option<String>,
    /// State echoed back by the authorization server, if any.
    pub state: Option<String>,
}

/// Builds the authorize-endpoint redirect for the implicit grant. The token
/// does not arrive synchronously; it comes back in the callback URL's
/// fragment and is consumed by [`complete_implicit_login`].
pub fn begin_implicit_login(
    auth_url: &str,
    client_id: &str,
    redirect_url: &str,
    state: Option<&str>,
) -> RedirectInstruction {
    let mut params = vec![
        ("response_type", "token".to_string()),
        ("client_id", client_id.to_string()),
        ("redirect_uri", redirect_url.to_string()),
    ];
    if let Some(state) = state {
        params.push(("state", state.to_string()));
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    RedirectInstruction {
        url: format!("{}/authorize?{}", auth_url, query),
    }
}

/// Parses `access_token` and `state` out of a callback URL fragment. Accepts
/// the fragment with or without its leading `#`; unknown keys are ignored.
pub fn complete_implicit_login(fragment: &str) -> ImplicitCallback {
    let mut callback = ImplicitCallback::default();
    for pair in fragment.trim_start_matches('#').split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "access_token" => callback.access_token = Some(value.to_string()),
            "state" => callback.state = Some(value.to_string()),
            _ => {}
        }
    }
    callback
}

/// Exchanges client credentials for an access token at `<auth_url>/token`:
/// one form-encoded POST with HTTP basic authentication, no retries.
#[instrument(skip(http, client_secret), level = "debug")]
pub async fn login_with_client_credentials<C: HttpClient>(
    http: &C,
    auth_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, AuthError> {
    let url = format!("{}/token", auth_url);
    let credentials = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    let request = HttpRequest {
        method: Method::Post,
        url: url.clone(),
        headers: vec![
            (
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
            ("Authorization".to_string(), format!("Basic {}", credentials)),
        ],
        body: Some(b"grant_type=client_credentials".to_vec()),
        timeout: Some(REQUEST_TIMEOUT),
    };
    let response = http
        .execute(request)
        .await
        .map_err(|source| AuthError::Transport {
            url: url.clone(),
            source,
        })?;
    if response.status != 200 {
        return Err(AuthError::TokenEndpoint {
            url,
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    let payload: Value =
        serde_json::from_slice(&response.body).map_err(|_| AuthError::MalformedTokenResponse)?;
    payload
        .get("access_token")
        .and_then(|token| token.as_str())
        .map(|token| token.to_string())
        .ok_or(AuthError::MalformedTokenResponse)
}
