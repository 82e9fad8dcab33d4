use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document with its system attributes split out; user attributes stay in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$sequence")]
    pub sequence: Option<Value>,
    #[serde(rename = "$collectionId")]
    pub collection_id: String,
    #[serde(rename = "$databaseId")]
    pub database_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(rename = "$permissions")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// User attributes, excluding any remaining `$`-prefixed system keys.
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter().filter(|(key, _)| !key.starts_with('$'))
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.data.get(attribute)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDocumentRequest<'a, T: Serialize> {
    pub document_id: &'a str,
    pub data: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DataRequest<'a, T: Serialize> {
    pub data: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IncrementRequest {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DecrementRequest {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
}
