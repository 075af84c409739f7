use ask_core::config::ClientConfig;
use ask_core::identity::GoTrueIdentity;
use ask_core::routes::{resolve, GateDecision, Route};
use ask_core::session::{AuthEvent, IdentityProvider, Session, SessionChange, SessionStore};
use ask_core::team::TeamAssignment;
use ask_core::ClientError;
use chrono::{Duration, Utc};
use futures::StreamExt;
use serde_json::json;
use std::rc::Rc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity(server: &MockServer) -> GoTrueIdentity {
    let config = ClientConfig::from_values(None, Some(&server.uri()), Some("anon-key")).expect("config");
    GoTrueIdentity::new(config)
}

fn token_body(user_id: &str, access: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": (Utc::now() + Duration::hours(1)).timestamp(),
        "refresh_token": format!("refresh-{access}"),
        "user": {"id": user_id, "email": format!("{user_id}@example.com")}
    })
}

async fn mount_password_grant(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({"email": "ana@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ana", "jwt-1")))
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer, user_id: &str, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{user_id}").as_str()))
        .and(query_param("select", "team_name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_publishes_session_and_store_resolves_team() {
    let server = MockServer::start().await;
    mount_password_grant(&server).await;
    mount_profile(&server, "ana", json!([{"team_name": "devops"}])).await;

    let identity = Rc::new(identity(&server));
    let store = SessionStore::new(identity.clone());
    let mut events = store.subscribe();

    let session = identity
        .sign_in_with_password("ana@example.com", "hunter22")
        .await
        .expect("sign in");
    assert_eq!(session.user_id, "ana");
    assert_eq!(session.email.as_deref(), Some("ana@example.com"));

    let event = events.next().await.expect("event");
    assert_eq!(event.kind, AuthEvent::SignedIn);
    let change = store.process(event).await;

    assert_eq!(change, SessionChange::Established { user_id: "ana".into() });
    assert_eq!(store.access_token().as_deref(), Some("jwt-1"));
    assert_eq!(store.team_assignment(), TeamAssignment::Assigned("devops".into()));
}

#[tokio::test]
async fn bad_credentials_surface_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = identity(&server)
        .sign_in_with_password("ana@example.com", "wrong")
        .await
        .expect_err("rejected");

    assert_eq!(err, ClientError::Identity("Invalid login credentials".into()));
}

#[tokio::test]
async fn missing_profile_row_leaves_team_unknown() {
    let server = MockServer::start().await;
    mount_profile(&server, "ghost", json!([])).await;

    let profile = identity(&server).fetch_profile("ghost").await.expect("lookup");

    assert_eq!(profile, None);
}

#[tokio::test]
async fn logout_clears_session_profile_and_gates_routes() {
    let server = MockServer::start().await;
    mount_password_grant(&server).await;
    mount_profile(&server, "ana", json!([{"team_name": "security"}])).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let identity = Rc::new(identity(&server));
    let store = SessionStore::new(identity.clone());
    identity
        .sign_in_with_password("ana@example.com", "hunter22")
        .await
        .expect("sign in");
    store.initialize().await.expect("init");
    assert_eq!(
        resolve("/simulation", store.session().as_ref()),
        GateDecision::Render(Route::Simulation)
    );

    let next = store.logout().await;

    assert_eq!(next, Route::Login);
    assert!(store.session().is_none());
    assert!(store.team().profile().is_none());
    assert_eq!(identity.get_session().await.expect("session"), None);
    assert_eq!(
        resolve("/simulation", store.session().as_ref()),
        GateDecision::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn expired_session_is_refreshed_on_read() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "refresh-old"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ana", "jwt-2")))
        .expect(1)
        .mount(&server)
        .await;

    let identity = identity(&server);
    identity.restore(Some(Session {
        user_id: "ana".into(),
        email: None,
        access_token: "old".into(),
        refresh_token: Some("refresh-old".into()),
        expires_at: Utc::now() - Duration::minutes(5),
    }));
    let mut events = identity.subscribe();

    let session = identity.get_session().await.expect("refresh").expect("session");

    assert_eq!(session.access_token, "jwt-2");
    assert_eq!(events.next().await.map(|e| e.kind), Some(AuthEvent::TokenRefreshed));
}

#[tokio::test]
async fn failed_refresh_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Invalid Refresh Token"})))
        .mount(&server)
        .await;

    let identity = identity(&server);
    identity.restore(Some(Session {
        user_id: "ana".into(),
        email: None,
        access_token: "old".into(),
        refresh_token: Some("refresh-old".into()),
        expires_at: Utc::now() - Duration::minutes(5),
    }));
    let mut events = identity.subscribe();

    assert_eq!(identity.get_session().await.expect("read"), None);
    let event = events.next().await.expect("event");
    assert_eq!(event.kind, AuthEvent::SignedOut);
    assert_eq!(event.session, None);
}
