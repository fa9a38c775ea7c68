//! The session facade: configuration, authentication gating and the public
//! request surface consumed by generated resource clients.

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use super::auth;
use super::http_client::{HttpClient, ReqwestHttpClient};
use super::location::{LocationProvider, NoopLocation};
use super::pipeline::RequestPipeline;
use super::storage::{InMemoryStore, PersistentStore, TokenStore};
use super::types::{
    AuthStrategy, ConfigError, DEFAULT_ENVIRONMENT, Method, SessionConfig, SessionError,
};

/// Cheap authenticated probe used to validate an existing implicit token.
const TOKEN_PROBE_PATH: &str = "/api/v2/users/me";

/// Authenticated session against the platform API.
///
/// Every public call goes through [`PureCloudSession::login`] first, so a
/// resource client can never bypass authentication. The token is the only
/// mutable authentication state; concurrent logins are serialized through a
/// shared gate so a burst of callers performs at most one credential
/// exchange.
#[derive(Debug)]
pub struct PureCloudSession<C: HttpClient, S: PersistentStore, L: LocationProvider> {
    config: SessionConfig,
    strategy: AuthStrategy,
    http: C,
    token_store: TokenStore<S>,
    location: L,
    pipeline: RequestPipeline,
    auth_url: String,
    token: RwLock<Option<String>>,
    login_gate: Mutex<()>,
}

impl PureCloudSession<ReqwestHttpClient, InMemoryStore, NoopLocation> {
    /// Creates a session with native-host defaults: reqwest transport,
    /// in-memory token persistence and no browsing context.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_parts(config, ReqwestHttpClient::new(), InMemoryStore::new(), NoopLocation)
    }
}

impl<C: HttpClient, S: PersistentStore, L: LocationProvider> PureCloudSession<C, S, L> {
    /// Creates a session with injected transport, persistence and
    /// browsing-context capabilities.
    ///
    /// Resolves the initial token from the explicit config value, then the
    /// token store, then an `access_token` fragment on the current location
    /// (the tail end of an implicit login). Fails fast with
    /// [`ConfigError`](super::types::ConfigError) on an unsupported strategy
    /// or a missing credential field.
    pub fn with_parts(
        mut config: SessionConfig,
        http: C,
        store: S,
        location: L,
    ) -> Result<Self, SessionError> {
        let token_store = TokenStore::new(store, config.storage_key.clone());
        let mut token = config.token.clone().or_else(|| token_store.load());
        if let Some(fragment) = location.fragment() {
            let callback = auth::complete_implicit_login(&fragment);
            if let Some(access_token) = callback.access_token {
                token_store.save(&access_token);
                token = Some(access_token);
            }
            if callback.state.is_some() {
                config.state = callback.state;
            }
        }
        let strategy = config.resolve_strategy()?;
        let environment = config
            .environment
            .clone()
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        Ok(Self {
            pipeline: RequestPipeline::new(format!("https://api.{}", environment)),
            auth_url: format!("https://login.{}", environment),
            token: RwLock::new(token),
            login_gate: Mutex::new(()),
            config,
            strategy,
            http,
            token_store,
            location,
        })
    }

    /// Base URL for API calls.
    pub fn api_url(&self) -> &str {
        self.pipeline.api_url()
    }

    /// Base URL for authentication endpoints.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Current bearer token, if one is known.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Points the session at another region. Recomputes both base URLs and
    /// leaves any existing token untouched.
    pub fn set_environment(&mut self, environment: &str) {
        self.config.environment = Some(environment.to_string());
        self.pipeline.set_api_url(format!("https://api.{}", environment));
        self.auth_url = format!("https://login.{}", environment);
    }

    /// Ensures the session holds a token, authenticating when necessary.
    ///
    /// With a token already present, the `implicit` strategy validates it
    /// with a probe and falls through to re-authentication on failure; other
    /// strategies trust it outright. Safe to call repeatedly.
    #[instrument(skip(self), level = "debug")]
    pub async fn login(&self) -> Result<(), SessionError> {
        let _gate = self.login_gate.lock().await;
        let token = self.token.read().await.clone();
        match token {
            Some(token) => {
                if !matches!(self.strategy, AuthStrategy::Implicit { .. }) {
                    return Ok(());
                }
                match self
                    .pipeline
                    .send(&self.http, Some(&token), Method::Get, TOKEN_PROBE_PATH, &[], None)
                    .await
                {
                    Ok(_) => Ok(()),
                    Err(err) => {
                        warn!(%err, "token probe failed, re-authenticating");
                        self.authenticate().await
                    }
                }
            }
            None => self.authenticate().await,
        }
    }

    async fn authenticate(&self) -> Result<(), SessionError> {
        match &self.strategy {
            AuthStrategy::Token => match &self.config.token {
                // Re-adopt the configured token; after a logout the next
                // login must leave the session authenticated again.
                Some(token) => {
                    let token = token.clone();
                    self.adopt_token(token).await;
                    Ok(())
                }
                None => Err(ConfigError::MissingField {
                    strategy: "token",
                    field: "token",
                }
                .into()),
            },
            AuthStrategy::Implicit {
                client_id,
                redirect_url,
                state,
            } => {
                // The token arrives later, in the callback URL's fragment.
                let redirect = auth::begin_implicit_login(
                    &self.auth_url,
                    client_id,
                    redirect_url,
                    state.as_deref(),
                );
                self.location.replace(&redirect.url);
                Ok(())
            }
            AuthStrategy::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let token = auth::login_with_client_credentials(
                    &self.http,
                    &self.auth_url,
                    client_id,
                    client_secret,
                )
                .await?;
                self.adopt_token(token).await;
                Ok(())
            }
        }
    }

    async fn adopt_token(&self, token: String) {
        self.token_store.save(&token);
        *self.token.write().await = Some(token);
    }

    /// Makes an authenticated request and resolves to the parsed response
    /// body. Logs in first; no call bypasses that gate.
    #[instrument(skip(self, body), level = "debug")]
    pub async fn make_request(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, SessionError> {
        self.login().await?;
        let token = self.token.read().await.clone();
        let value = self
            .pipeline
            .send(&self.http, token.as_deref(), method, url, query, body)
            .await?;
        Ok(value)
    }

    /// Convenience wrapper for GET requests.
    pub async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, SessionError> {
        self.make_request(Method::Get, url, query, None).await
    }

    /// Ends the remote session: drops the token from memory and storage and
    /// hands the logout URL to the browsing context (a no-op on native
    /// hosts).
    #[instrument(skip(self), level = "debug")]
    pub async fn logout(&self) {
        self.token_store.clear();
        *self.token.write().await = None;
        self.location.replace(&format!("{}/logout", self.auth_url));
    }
}
