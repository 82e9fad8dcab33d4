use appwrite_playground::config::ClientConfig;
use appwrite_playground::harness::{
    ActionLog, Dispatcher, HarnessError, Outcome, RegistryBuilder, ServiceKind, Session,
    SessionState, Severity,
};
use std::sync::Arc;

#[tokio::test]
async fn test_initialize_then_unknown_login() {
    let session = Arc::new(Session::new());
    session
        .initialize(&ClientConfig::new("https://x", "p"))
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let log = Arc::new(ActionLog::new("output", 500));
    let dispatcher = Dispatcher::new(
        Arc::new(RegistryBuilder::new().freeze()),
        Arc::clone(&session),
        Arc::clone(&log),
    );

    let outcome = dispatcher.invoke("Login").await;
    assert_eq!(
        outcome,
        Outcome::Failure {
            kind: "UnknownAction",
            message: "Login".to_string()
        }
    );

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "UnknownAction: Login");
    assert_eq!(entries[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_failed_initialize_is_terminal() {
    let session = Session::new();
    let err = session
        .initialize(&ClientConfig::new("ftp://x", "p"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "InitializationError");
    assert_eq!(session.state(), SessionState::Failed);

    // A valid config afterwards does not revive the session.
    assert!(session
        .initialize(&ClientConfig::new("https://x", "p"))
        .await
        .is_err());
    assert!(matches!(
        session.service_for(ServiceKind::Account),
        Err(HarnessError::NotInitialized(ServiceKind::Account))
    ));
}
