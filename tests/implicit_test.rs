use purecloud_session::{
    HttpResponse, InMemoryHttpClient, InMemoryStore, PersistentStore, PureCloudSession,
    SessionConfig, StaticLocation,
};
use serde_json::json;

fn implicit_config(state: Option<&str>) -> SessionConfig {
    SessionConfig {
        strategy: "implicit".to_string(),
        client_id: Some("cid".to_string()),
        redirect_url: Some("https://app.local/callback".to_string()),
        state: state.map(|s| s.to_string()),
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn login_without_a_token_redirects_to_the_authorize_endpoint() {
    let location = StaticLocation::new();
    let session = PureCloudSession::with_parts(
        implicit_config(Some("xyz")),
        InMemoryHttpClient::new(),
        InMemoryStore::new(),
        location.clone(),
    )
    .unwrap();

    session.login().await.unwrap();

    assert_eq!(
        location.replaced(),
        vec![
            "https://login.mypurecloud.com/authorize?response_type=token\
             &client_id=cid\
             &redirect_uri=https%3A%2F%2Fapp.local%2Fcallback\
             &state=xyz"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn a_valid_existing_token_is_probed_and_no_redirect_happens() {
    let location = StaticLocation::new();
    let http = InMemoryHttpClient::new();
    http.insert_response(
        "https://api.mypurecloud.com/api/v2/users/me",
        HttpResponse::with_body(200, serde_json::to_vec(&json!({ "id": "me" })).unwrap()),
    );
    let mut config = implicit_config(None);
    config.token = Some("VALID".to_string());
    let session = PureCloudSession::with_parts(
        config,
        http.clone(),
        InMemoryStore::new(),
        location.clone(),
    )
    .unwrap();

    session.login().await.unwrap();

    assert!(location.replaced().is_empty());
    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://api.mypurecloud.com/api/v2/users/me"
    );
    assert_eq!(requests[0].header("Authorization"), Some("bearer VALID"));
}

#[tokio::test]
async fn a_failing_probe_falls_through_to_re_authentication() {
    let location = StaticLocation::new();
    // Every request, the probe included, answers 401.
    let http = InMemoryHttpClient::with_default(HttpResponse::with_body(401, "unauthorized"));
    let mut config = implicit_config(None);
    config.token = Some("STALE".to_string());
    let session = PureCloudSession::with_parts(
        config,
        http,
        InMemoryStore::new(),
        location.clone(),
    )
    .unwrap();

    session.login().await.unwrap();

    let replaced = location.replaced();
    assert_eq!(replaced.len(), 1);
    assert!(replaced[0].starts_with("https://login.mypurecloud.com/authorize?response_type=token"));
}

#[tokio::test]
async fn a_callback_fragment_is_adopted_and_persisted_at_construction() {
    let store = InMemoryStore::new();
    let location = StaticLocation::with_fragment("access_token=FRAG&state=returned");
    let mut config = implicit_config(None);
    config.storage_key = Some("pc_token".to_string());
    let session = PureCloudSession::with_parts(
        config,
        InMemoryHttpClient::new(),
        store.clone(),
        location,
    )
    .unwrap();

    assert_eq!(session.token().await.as_deref(), Some("FRAG"));
    assert_eq!(store.get("pc_token").as_deref(), Some("FRAG"));
}

#[tokio::test]
async fn state_echoed_in_the_fragment_feeds_the_next_redirect() {
    // The fragment delivers a token that turns out stale, plus a state the
    // server echoed back; re-authentication must carry that state.
    let location = StaticLocation::with_fragment("access_token=STALE&state=returned");
    let http = InMemoryHttpClient::with_default(HttpResponse::with_body(401, "unauthorized"));
    let session = PureCloudSession::with_parts(
        implicit_config(None),
        http,
        InMemoryStore::new(),
        location.clone(),
    )
    .unwrap();

    session.login().await.unwrap();

    let replaced = location.replaced();
    assert_eq!(replaced.len(), 1);
    assert!(replaced[0].ends_with("&state=returned"));
}
