use serde::{Deserialize, Serialize};

/// Metadata of a file stored in a bucket.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct File {
    #[serde(rename = "$id")]
    pub id: String,
    pub bucket_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(rename = "$permissions")]
    pub permissions: Vec<String>,
    pub name: String,
    pub signature: String,
    pub mime_type: String,
    pub size_original: u64,
    pub chunks_total: u64,
    pub chunks_uploaded: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileList {
    pub total: u64,
    pub files: Vec<File>,
}

/// In-memory upload source.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn from_bytes(
        data: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Reported after every uploaded chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    pub id: String,
    /// Percentage in `0.0..=100.0`.
    pub progress: f64,
    pub size_uploaded: u64,
    pub chunks_total: u64,
    pub chunks_uploaded: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateFileRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<&'a [String]>,
}

/// Image transformation options for [`super::Storage::get_file_preview`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreviewOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}
