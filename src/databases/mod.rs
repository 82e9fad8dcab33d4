//! Databases service: documents inside a database collection.
//!
//! Document payloads are any `Serialize` type; responses keep user attributes as a JSON map on
//! [`Document::data`].

pub mod models;

#[cfg(test)]
mod tests;

use crate::core::{segment, Client, Error};
use models::{
    CreateDocumentRequest, DataRequest, DecrementRequest, Document, DocumentList,
    IncrementRequest,
};
use serde::Serialize;

#[derive(Clone)]
pub struct Databases {
    client: Client,
}

impl Databases {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            segment(database_id),
            segment(collection_id)
        )
    }

    fn document_path(database_id: &str, collection_id: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            Self::documents_path(database_id, collection_id),
            segment(document_id)
        )
    }

    /// Lists documents. `queries` are Appwrite query strings, e.g. `{"method":"limit","values":[5]}`.
    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[String],
    ) -> Result<DocumentList, Error> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let request = self
            .client
            .get(&Self::documents_path(database_id, collection_id))
            .query(&params);
        self.client.send(request, "List documents").await
    }

    pub async fn create_document<T: Serialize>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &T,
        permissions: Option<&[String]>,
    ) -> Result<Document, Error> {
        let body = CreateDocumentRequest {
            document_id,
            data,
            permissions,
        };
        let request = self
            .client
            .post(&Self::documents_path(database_id, collection_id))
            .json(&body);
        self.client.send(request, "Create document").await
    }

    pub async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, Error> {
        let path = Self::document_path(database_id, collection_id, document_id);
        self.client.send(self.client.get(&path), "Get document").await
    }

    /// Partially updates a document; attributes missing from `data` keep their values.
    pub async fn update_document<T: Serialize>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &T,
        permissions: Option<&[String]>,
    ) -> Result<Document, Error> {
        let path = Self::document_path(database_id, collection_id, document_id);
        let request = self
            .client
            .patch(&path)
            .json(&DataRequest { data, permissions });
        self.client.send(request, "Update document").await
    }

    /// Creates the document, or replaces it when `document_id` already exists.
    pub async fn upsert_document<T: Serialize>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &T,
        permissions: Option<&[String]>,
    ) -> Result<Document, Error> {
        let path = Self::document_path(database_id, collection_id, document_id);
        let request = self
            .client
            .put(&path)
            .json(&DataRequest { data, permissions });
        self.client.send(request, "Upsert document").await
    }

    pub async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), Error> {
        let path = Self::document_path(database_id, collection_id, document_id);
        self.client
            .send_empty(self.client.delete(&path), "Delete document")
            .await
    }

    /// Atomically adds `value` to a numeric attribute, optionally capped at `max`.
    pub async fn increment_document_attribute(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        attribute: &str,
        value: f64,
        max: Option<f64>,
    ) -> Result<Document, Error> {
        let path = format!(
            "{}/{}/increment",
            Self::document_path(database_id, collection_id, document_id),
            segment(attribute)
        );
        let request = self.client.patch(&path).json(&IncrementRequest { value, max });
        self.client.send(request, "Increment attribute").await
    }

    /// Atomically subtracts `value` from a numeric attribute, optionally floored at `min`.
    pub async fn decrement_document_attribute(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        attribute: &str,
        value: f64,
        min: Option<f64>,
    ) -> Result<Document, Error> {
        let path = format!(
            "{}/{}/decrement",
            Self::document_path(database_id, collection_id, document_id),
            segment(attribute)
        );
        let request = self.client.patch(&path).json(&DecrementRequest { value, min });
        self.client.send(request, "Decrement attribute").await
    }
}
