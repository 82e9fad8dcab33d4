use super::{add, Context};
use crate::databases::models::{Document, DocumentList};
use crate::harness::{HarnessError, RegistryBuilder};
use crate::id;
use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::json;

const NO_DOCUMENTS: &str = "No documents found. Create one first!";
const UPSERT_ID: &str = "upsert_test_doc";
const COUNTER: &str = "Priority";

/// Row shape of the playground test collection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PlaygroundDocument {
    title: String,
    content: String,
    author: String,
    created_at: String,
    completed: bool,
    priority: i64,
}

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "List Documents", list_documents, documents_summary)?;
    add(builder, ctx, "Create Document", create_document, |(doc, title): &(Document, String)| {
        vec![
            format!("Document created: {}", doc.id),
            format!("  Data: {title}"),
        ]
    })?;
    add(builder, ctx, "Get Document", get_document, document_details)?;
    add(builder, ctx, "Update Document", update_document, |doc: &Document| {
        vec![format!("Document updated: {}", doc.id)]
    })?;
    add(builder, ctx, "Delete Document", delete_document, |id: &String| {
        vec![format!("Document deleted: {id}")]
    })?;
    add(builder, ctx, "Upsert Document", upsert_document, |doc: &Document| {
        vec![format!("Document upserted: {}", doc.id)]
    })?;
    add(builder, ctx, "Increment Attribute", increment_attribute, |doc: &Document| {
        vec![format!("Document attribute incremented: {}", doc.id)]
    })?;
    add(builder, ctx, "Decrement Attribute", decrement_attribute, |doc: &Document| {
        vec![format!("Document attribute decremented: {}", doc.id)]
    })?;
    Ok(())
}

async fn list_documents(ctx: Context) -> Result<DocumentList, HarnessError> {
    let (database, collection) = ctx.database()?;
    Ok(ctx
        .services()?
        .databases
        .list_documents(database, collection, &[])
        .await?)
}

fn documents_summary(list: &DocumentList) -> Vec<String> {
    let mut lines = vec![format!("Found {} documents", list.total)];
    lines.extend(
        list.documents
            .iter()
            .take(3)
            .map(|doc| format!("  Document {}: {}", doc.id, doc.created_at)),
    );
    lines
}

/// Id of the first document, or a precondition failure with `empty` when there is none.
async fn first_document(ctx: &Context, empty: &str) -> Result<String, HarnessError> {
    let list = list_documents(ctx.clone()).await?;
    list.documents
        .into_iter()
        .next()
        .map(|doc| doc.id)
        .ok_or_else(|| HarnessError::precondition(empty))
}

/// Spreads priorities over 1..=4 without pulling in an RNG.
fn pick_priority() -> i64 {
    i64::from(Utc::now().timestamp_subsec_nanos() % 4) + 1
}

async fn create_document(ctx: Context) -> Result<(Document, String), HarnessError> {
    let (database, collection) = ctx.database()?;
    let data = PlaygroundDocument {
        title: "Test Document".to_string(),
        content: "This is a test document created from the playground".to_string(),
        author: "Playground".to_string(),
        created_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        completed: false,
        priority: pick_priority(),
    };
    let doc = ctx
        .services()?
        .databases
        .create_document(database, collection, &id::unique(), &data, None)
        .await?;
    Ok((doc, data.title))
}

async fn get_document(ctx: Context) -> Result<Document, HarnessError> {
    let document_id = first_document(&ctx, NO_DOCUMENTS).await?;
    let (database, collection) = ctx.database()?;
    Ok(ctx
        .services()?
        .databases
        .get_document(database, collection, &document_id)
        .await?)
}

fn document_details(doc: &Document) -> Vec<String> {
    let mut lines = vec![
        format!("Retrieved document: {}", doc.id),
        format!("  Created: {}", doc.created_at),
        format!("  Updated: {}", doc.updated_at),
    ];
    lines.extend(doc.attributes().map(|(key, value)| format!("  {key}: {value}")));
    lines
}

async fn update_document(ctx: Context) -> Result<Document, HarnessError> {
    let document_id = first_document(&ctx, NO_DOCUMENTS).await?;
    let (database, collection) = ctx.database()?;
    let data = json!({
        "Content": format!("Updated from the playground at {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        "Completed": true,
        "Author": "Playground",
    });
    Ok(ctx
        .services()?
        .databases
        .update_document(database, collection, &document_id, &data, None)
        .await?)
}

async fn delete_document(ctx: Context) -> Result<String, HarnessError> {
    let document_id = first_document(&ctx, "No documents found to delete!").await?;
    let (database, collection) = ctx.database()?;
    ctx.services()?
        .databases
        .delete_document(database, collection, &document_id)
        .await?;
    Ok(document_id)
}

async fn upsert_document(ctx: Context) -> Result<Document, HarnessError> {
    let (database, collection) = ctx.database()?;
    let data = json!({
        "title": "Upserted Document",
        "content": "This document was created/updated using upsert",
    });
    Ok(ctx
        .services()?
        .databases
        .upsert_document(database, collection, &id::custom(UPSERT_ID), &data, None)
        .await?)
}

async fn increment_attribute(ctx: Context) -> Result<Document, HarnessError> {
    let document_id = first_document(&ctx, NO_DOCUMENTS).await?;
    let (database, collection) = ctx.database()?;
    Ok(ctx
        .services()?
        .databases
        .increment_document_attribute(database, collection, &document_id, COUNTER, 1.0, None)
        .await?)
}

async fn decrement_attribute(ctx: Context) -> Result<Document, HarnessError> {
    let document_id = first_document(&ctx, NO_DOCUMENTS).await?;
    let (database, collection) = ctx.database()?;
    Ok(ctx
        .services()?
        .databases
        .decrement_document_attribute(database, collection, &document_id, COUNTER, 1.0, None)
        .await?)
}
