use super::*;
use crate::config::ClientConfig;
use httpmock::prelude::*;
use serde_json::json;

const EXECUTIONS: &str = "/v1/functions/fn1/executions";

fn functions_for(server: &MockServer) -> Functions {
    Functions::new(Client::new(&ClientConfig::new(server.url("/v1"), "test-project")).unwrap())
}

#[tokio::test]
async fn test_create_execution() {
    let server = MockServer::start_async().await;
    let functions = functions_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(EXECUTIONS).json_body(json!({
                "body": "{\"message\":\"hi\"}",
                "async": false,
                "method": "POST",
                "headers": { "x-trace": "1" }
            }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({
                    "$id": "exec1",
                    "functionId": "fn1",
                    "trigger": "http",
                    "status": "completed",
                    "responseStatusCode": 200,
                    "responseBody": "ok",
                    "duration": 0.25
                }));
        })
        .await;

    let mut request = ExecutionRequest::with_body(r#"{"message":"hi"}"#);
    request.is_async = Some(false);
    request.method = Some("POST".to_string());
    request.headers.insert("x-trace".to_string(), "1".to_string());

    let execution = functions.create_execution("fn1", &request).await.unwrap();
    assert_eq!(execution.status, "completed");
    assert_eq!(execution.response_body, "ok");
    assert_eq!(execution.duration, 0.25);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_and_get_execution() {
    let server = MockServer::start_async().await;
    let functions = functions_for(&server);

    let list = server
        .mock_async(|when, then| {
            when.method(GET).path(EXECUTIONS);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 2,
                    "executions": [
                        { "$id": "exec1", "status": "completed" },
                        { "$id": "exec2", "status": "failed" }
                    ]
                }));
        })
        .await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{EXECUTIONS}/exec2"));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "exec2", "status": "failed", "errors": "boom" }));
        })
        .await;

    let executions = functions.list_executions("fn1", &[]).await.unwrap();
    assert_eq!(executions.total, 2);
    assert_eq!(executions.executions[1].status, "failed");

    let execution = functions.get_execution("fn1", "exec2").await.unwrap();
    assert_eq!(execution.errors, "boom");

    list.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_unknown_function() {
    let server = MockServer::start_async().await;
    let functions = functions_for(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/functions/missing/executions");
            then.status(404)
                .header("content-type", "application/json")
                .json_body(json!({
                    "message": "Function with the requested ID could not be found.",
                    "code": 404,
                    "type": "function_not_found"
                }));
        })
        .await;

    let err = functions
        .create_execution("missing", &ExecutionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(404));
    assert!(err.to_string().contains("function_not_found"));
}
