use super::*;
use crate::config::ClientConfig;
use httpmock::prelude::*;
use serde_json::json;

fn account_for(server: &MockServer) -> Account {
    Account::new(Client::new(&ClientConfig::new(server.url("/v1"), "test-project")).unwrap())
}

#[tokio::test]
async fn test_get_account() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/account");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "$id": "user1",
                    "$createdAt": "2024-01-01T00:00:00.000+00:00",
                    "name": "Ada",
                    "email": "ada@example.com",
                    "status": true,
                    "emailVerification": true,
                    "phoneVerification": false,
                    "prefs": { "theme": "dark" }
                }));
        })
        .await;

    let user = account.get().await.unwrap();
    assert_eq!(user.id, "user1");
    assert_eq!(user.name, "Ada");
    assert!(user.email_verification);
    assert_eq!(user.prefs["theme"], "dark");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_account_omits_missing_name() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/account").json_body(json!({
                "userId": "unique()",
                "email": "ada@example.com",
                "password": "hunter22"
            }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "user1", "email": "ada@example.com" }));
        })
        .await;

    let user = account
        .create(&crate::id::unique(), "ada@example.com", "hunter22", None)
        .await
        .unwrap();
    assert_eq!(user.email, "ada@example.com");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_email_password_session() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/account/sessions/email")
                .json_body(json!({ "email": "ada@example.com", "password": "hunter22" }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({
                    "$id": "sess1",
                    "userId": "user1",
                    "provider": "email",
                    "current": true
                }));
        })
        .await;

    let session = account
        .create_email_password_session("ada@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.user_id, "user1");
    assert!(session.current);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_credentials() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/account/sessions/email");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({
                    "message": "Invalid credentials. Please check the email and password.",
                    "code": 401,
                    "type": "user_invalid_credentials"
                }));
        })
        .await;

    let err = account
        .create_email_password_session("ada@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(401));
    assert!(err.to_string().contains("Invalid credentials"));
}

#[tokio::test]
async fn test_list_sessions_and_logs() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/account/sessions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 2,
                    "sessions": [
                        { "$id": "s1", "clientName": "Chrome", "$createdAt": "2024-01-01" },
                        { "$id": "s2", "clientName": "Firefox", "$createdAt": "2024-01-02" }
                    ]
                }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/account/logs");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 1,
                    "logs": [{ "event": "session.create", "time": "2024-01-01" }]
                }));
        })
        .await;

    let sessions = account.list_sessions().await.unwrap();
    assert_eq!(sessions.total, 2);
    assert_eq!(sessions.sessions[1].client_name, "Firefox");

    let logs = account.list_logs().await.unwrap();
    assert_eq!(logs.logs[0].event, "session.create");
}

#[tokio::test]
async fn test_update_prefs_and_password() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let prefs_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/account/prefs")
                .json_body(json!({ "prefs": { "theme": "dark" } }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "user1", "prefs": { "theme": "dark" } }));
        })
        .await;
    let password_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/account/password")
                .json_body(json!({ "password": "new-password" }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "user1", "passwordUpdate": "2024-02-01" }));
        })
        .await;

    let mut prefs = Preferences::new();
    prefs.insert("theme".to_string(), json!("dark"));
    let user = account.update_prefs(&prefs).await.unwrap();
    assert_eq!(user.prefs, prefs);

    let user = account.update_password("new-password", None).await.unwrap();
    assert_eq!(user.password_update, "2024-02-01");

    prefs_mock.assert_async().await;
    password_mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_current_session() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/account/sessions/current");
            then.status(204);
        })
        .await;

    account.delete_session("current").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_recovery_token() {
    let server = MockServer::start_async().await;
    let account = account_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/account/recovery").json_body(json!({
                "email": "ada@example.com",
                "url": "https://example.com/recover"
            }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "tok1", "expire": "2024-01-01T01:00:00.000+00:00" }));
        })
        .await;

    let token = account
        .create_recovery("ada@example.com", "https://example.com/recover")
        .await
        .unwrap();
    assert_eq!(token.expire, "2024-01-01T01:00:00.000+00:00");
    mock.assert_async().await;
}

#[test]
fn test_oauth2_url() {
    let client = Client::new(&ClientConfig::new("https://cloud.appwrite.io/v1", "proj")).unwrap();
    let account = Account::new(client);

    let url = account
        .create_oauth2_session(
            OAuthProvider::Github,
            Some("https://app.example.com/ok"),
            None,
            &["read:user"],
        )
        .unwrap();

    assert_eq!(url.path(), "/v1/account/sessions/oauth2/github");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("project".to_string(), "proj".to_string())));
    assert!(pairs.contains(&("success".to_string(), "https://app.example.com/ok".to_string())));
    assert!(pairs.contains(&("scopes[]".to_string(), "read:user".to_string())));
    assert!(!pairs.iter().any(|(k, _)| k == "failure"));
}
