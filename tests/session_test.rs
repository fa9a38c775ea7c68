use purecloud_session::{
    ConfigError, HttpResponse, InMemoryHttpClient, InMemoryStore, Method, NoopLocation,
    PersistentStore, PureCloudSession, SessionConfig, SessionError, StaticLocation,
};

fn token_config(token: &str) -> SessionConfig {
    SessionConfig {
        strategy: "token".to_string(),
        token: Some(token.to_string()),
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn token_strategy_logs_in_without_any_network_call() {
    let http = InMemoryHttpClient::new();
    let session = PureCloudSession::with_parts(
        token_config("T-123"),
        http.clone(),
        InMemoryStore::new(),
        NoopLocation,
    )
    .unwrap();

    session.login().await.unwrap();

    assert_eq!(session.token().await.as_deref(), Some("T-123"));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn token_strategy_without_a_token_fails_with_config_error() {
    let http = InMemoryHttpClient::new();
    let config = SessionConfig {
        strategy: "token".to_string(),
        ..SessionConfig::default()
    };
    let session =
        PureCloudSession::with_parts(config, http.clone(), InMemoryStore::new(), NoopLocation)
            .unwrap();

    let err = session.login().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Config(ConfigError::MissingField { .. })
    ));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn unsupported_strategy_is_rejected_before_any_io() {
    let http = InMemoryHttpClient::new();
    let config = SessionConfig {
        strategy: "bogus".to_string(),
        ..SessionConfig::default()
    };
    let err =
        PureCloudSession::with_parts(config, http.clone(), InMemoryStore::new(), NoopLocation)
            .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Config(ConfigError::UnsupportedStrategy(ref s)) if s == "bogus"
    ));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn environment_defaults_to_mypurecloud_com() {
    let session = PureCloudSession::with_parts(
        token_config("T"),
        InMemoryHttpClient::new(),
        InMemoryStore::new(),
        NoopLocation,
    )
    .unwrap();

    assert_eq!(session.api_url(), "https://api.mypurecloud.com");
    assert_eq!(session.auth_url(), "https://login.mypurecloud.com");
}

#[tokio::test]
async fn set_environment_recomputes_urls_and_keeps_the_token() {
    let mut session = PureCloudSession::with_parts(
        token_config("T"),
        InMemoryHttpClient::new(),
        InMemoryStore::new(),
        NoopLocation,
    )
    .unwrap();

    session.set_environment("mypurecloud.ie");

    assert_eq!(session.api_url(), "https://api.mypurecloud.ie");
    assert_eq!(session.auth_url(), "https://login.mypurecloud.ie");
    assert_eq!(session.token().await.as_deref(), Some("T"));
}

#[tokio::test]
async fn construction_seeds_the_token_from_the_store() {
    let store = InMemoryStore::new();
    store.set("pc_token", "STORED");
    let config = SessionConfig {
        strategy: "token".to_string(),
        storage_key: Some("pc_token".to_string()),
        ..SessionConfig::default()
    };
    let session = PureCloudSession::with_parts(
        config,
        InMemoryHttpClient::new(),
        store,
        NoopLocation,
    )
    .unwrap();

    assert_eq!(session.token().await.as_deref(), Some("STORED"));
    session.login().await.unwrap();
}

#[tokio::test]
async fn login_after_logout_re_adopts_the_configured_token() {
    let http = InMemoryHttpClient::with_default(HttpResponse::with_body(200, "{}"));
    let session = PureCloudSession::with_parts(
        token_config("T-123"),
        http.clone(),
        InMemoryStore::new(),
        NoopLocation,
    )
    .unwrap();

    session.logout().await;
    assert!(session.token().await.is_none());

    session.login().await.unwrap();
    assert_eq!(session.token().await.as_deref(), Some("T-123"));

    session
        .make_request(Method::Get, "/api/v2/users/me", &[], None)
        .await
        .unwrap();
    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("Authorization"), Some("bearer T-123"));
}

#[tokio::test]
async fn logout_clears_token_everywhere_and_redirects() {
    let store = InMemoryStore::new();
    store.set("pc_token", "T");
    let location = StaticLocation::new();
    let config = SessionConfig {
        strategy: "token".to_string(),
        token: Some("T".to_string()),
        storage_key: Some("pc_token".to_string()),
        ..SessionConfig::default()
    };
    let session = PureCloudSession::with_parts(
        config,
        InMemoryHttpClient::new(),
        store.clone(),
        location.clone(),
    )
    .unwrap();

    session.logout().await;

    assert!(session.token().await.is_none());
    assert!(store.get("pc_token").is_none());
    assert_eq!(
        location.replaced(),
        vec!["https://login.mypurecloud.com/logout".to_string()]
    );
}
