use super::*;
use crate::config::ClientConfig;
use httpmock::prelude::*;
use serde::Serialize;
use serde_json::json;

const DOCUMENTS: &str = "/v1/databases/db1/collections/tasks/documents";

fn databases_for(server: &MockServer) -> Databases {
    Databases::new(Client::new(&ClientConfig::new(server.url("/v1"), "test-project")).unwrap())
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Task {
    title: String,
    priority: i32,
}

#[tokio::test]
async fn test_list_documents_with_queries() {
    let server = MockServer::start_async().await;
    let databases = databases_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DOCUMENTS)
                .query_param("queries[]", r#"{"method":"limit","values":[3]}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 1,
                    "documents": [{
                        "$id": "doc1",
                        "$collectionId": "tasks",
                        "$databaseId": "db1",
                        "$createdAt": "2024-01-01",
                        "$updatedAt": "2024-01-02",
                        "$permissions": [],
                        "Title": "Write tests",
                        "Priority": 2
                    }]
                }));
        })
        .await;

    let list = databases
        .list_documents("db1", "tasks", &[r#"{"method":"limit","values":[3]}"#.to_string()])
        .await
        .unwrap();

    assert_eq!(list.total, 1);
    let doc = &list.documents[0];
    assert_eq!(doc.id, "doc1");
    assert_eq!(doc.get("Title"), Some(&json!("Write tests")));
    assert_eq!(doc.attributes().count(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_document() {
    let server = MockServer::start_async().await;
    let databases = databases_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(DOCUMENTS).json_body(json!({
                "documentId": "unique()",
                "data": { "Title": "Write tests", "Priority": 3 }
            }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "doc9", "Title": "Write tests", "Priority": 3 }));
        })
        .await;

    let task = Task {
        title: "Write tests".to_string(),
        priority: 3,
    };
    let doc = databases
        .create_document("db1", "tasks", &crate::id::unique(), &task, None)
        .await
        .unwrap();
    assert_eq!(doc.id, "doc9");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_and_upsert_use_distinct_verbs() {
    let server = MockServer::start_async().await;
    let databases = databases_for(&server);
    let path = format!("{DOCUMENTS}/doc1");

    let patch = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path(path.clone())
                .json_body(json!({ "data": { "Completed": true } }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "doc1", "Completed": true }));
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(path.clone())
                .json_body(json!({ "data": { "title": "Upserted" } }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "doc1", "title": "Upserted" }));
        })
        .await;

    databases
        .update_document("db1", "tasks", "doc1", &json!({ "Completed": true }), None)
        .await
        .unwrap();
    databases
        .upsert_document("db1", "tasks", "doc1", &json!({ "title": "Upserted" }), None)
        .await
        .unwrap();

    patch.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let server = MockServer::start_async().await;
    let databases = databases_for(&server);

    let inc = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path(format!("{DOCUMENTS}/doc1/Priority/increment"))
                .json_body(json!({ "value": 1.0 }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "doc1", "Priority": 4 }));
        })
        .await;
    let dec = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path(format!("{DOCUMENTS}/doc1/Priority/decrement"))
                .json_body(json!({ "value": 1.0, "min": 0.0 }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "$id": "doc1", "Priority": 3 }));
        })
        .await;

    let doc = databases
        .increment_document_attribute("db1", "tasks", "doc1", "Priority", 1.0, None)
        .await
        .unwrap();
    assert_eq!(doc.get("Priority"), Some(&json!(4)));

    let doc = databases
        .decrement_document_attribute("db1", "tasks", "doc1", "Priority", 1.0, Some(0.0))
        .await
        .unwrap();
    assert_eq!(doc.get("Priority"), Some(&json!(3)));

    inc.assert_async().await;
    dec.assert_async().await;
}

#[tokio::test]
async fn test_missing_document() {
    let server = MockServer::start_async().await;
    let databases = databases_for(&server);

    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{DOCUMENTS}/gone"));
            then.status(404)
                .header("content-type", "application/json")
                .json_body(json!({
                    "message": "Document with the requested ID could not be found.",
                    "code": 404,
                    "type": "document_not_found"
                }));
        })
        .await;

    let err = databases
        .delete_document("db1", "tasks", "gone")
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(404));
}
