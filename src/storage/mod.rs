//! Storage service: files inside a bucket.
//!
//! Uploads up to [`CHUNK_SIZE`] go out as a single multipart request. Larger files are split
//! into `CHUNK_SIZE` pieces sent in order with a `Content-Range` header; every chunk after
//! the first carries the `X-Appwrite-ID` returned by the first one so the server appends to
//! the same file.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use appwrite_playground::storage::{Storage, models::InputFile};
//! # async fn run(storage: Storage) {
//! let file = InputFile::from_bytes(b"Hello, World!".to_vec(), "hello.txt", "text/plain");
//! let uploaded = storage
//!     .create_file("bucket", &appwrite_playground::id::unique(), file, None, None)
//!     .await;
//! # }
//! ```

pub mod models;


use crate::core::{segment, Client, Error};
use models::{File, FileList, InputFile, PreviewOptions, UpdateFileRequest, UploadProgress};
use reqwest::multipart::{Form, Part};

/// Upload chunk size used by the server-side chunk assembler.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Callback invoked after each uploaded chunk.
pub type ProgressCallback<'a> = &'a (dyn Fn(UploadProgress) + Send + Sync);

#[derive(Clone)]
pub struct Storage {
    client: Client,
    chunk_size: usize,
}

impl Storage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            chunk_size: CHUNK_SIZE,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn files_path(bucket_id: &str) -> String {
        format!("/storage/buckets/{}/files", segment(bucket_id))
    }

    fn file_path(bucket_id: &str, file_id: &str) -> String {
        format!("{}/{}", Self::files_path(bucket_id), segment(file_id))
    }

    pub async fn list_files(
        &self,
        bucket_id: &str,
        queries: &[String],
        search: Option<&str>,
    ) -> Result<FileList, Error> {
        let mut params: Vec<(&str, &str)> =
            queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        if let Some(search) = search {
            params.push(("search", search));
        }
        let request = self.client.get(&Self::files_path(bucket_id)).query(&params);
        self.client.send(request, "List files").await
    }

    fn form(
        file_id: &str,
        file: &InputFile,
        chunk: &[u8],
        permissions: Option<&[String]>,
    ) -> Result<Form, Error> {
        let part = Part::bytes(chunk.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)?;
        let mut form = Form::new().text("fileId", file_id.to_string()).part("file", part);
        for permission in permissions.unwrap_or_default() {
            form = form.text("permissions[]", permission.clone());
        }
        Ok(form)
    }

    /// Uploads a file, reporting progress after each chunk.
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
        permissions: Option<&[String]>,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<File, Error> {
        let path = Self::files_path(bucket_id);
        let total = file.data.len();

        if total <= self.chunk_size {
            let form = Self::form(file_id, &file, &file.data, permissions)?;
            let uploaded: File = self
                .client
                .send(self.client.post(&path).multipart(form), "Create file")
                .await?;
            if let Some(report) = on_progress {
                report(UploadProgress {
                    id: uploaded.id.clone(),
                    progress: 100.0,
                    size_uploaded: total as u64,
                    chunks_total: uploaded.chunks_total.max(1),
                    chunks_uploaded: uploaded.chunks_uploaded.max(1),
                });
            }
            return Ok(uploaded);
        }

        let mut upload_id: Option<String> = None;
        let mut last = None;
        for (index, chunk) in file.data.chunks(self.chunk_size).enumerate() {
            let start = index * self.chunk_size;
            let end = start + chunk.len() - 1;

            let form = Self::form(file_id, &file, chunk, permissions)?;
            let mut request = self
                .client
                .post(&path)
                .header("content-range", format!("bytes {start}-{end}/{total}"))
                .multipart(form);
            if let Some(id) = &upload_id {
                request = request.header("x-appwrite-id", id.as_str());
            }

            let uploaded: File = self.client.send(request, "Create file").await?;
            tracing::debug!(
                file_id = %uploaded.id,
                chunk = index + 1,
                chunks_total = uploaded.chunks_total,
                "uploaded chunk"
            );

            if let Some(report) = on_progress {
                report(UploadProgress {
                    id: uploaded.id.clone(),
                    progress: (end + 1) as f64 * 100.0 / total as f64,
                    size_uploaded: (end + 1) as u64,
                    chunks_total: uploaded.chunks_total,
                    chunks_uploaded: uploaded.chunks_uploaded,
                });
            }
            upload_id = Some(uploaded.id.clone());
            last = Some(uploaded);
        }

        last.ok_or_else(|| Error::Config("upload produced no chunks".to_string()))
    }

    pub async fn get_file(&self, bucket_id: &str, file_id: &str) -> Result<File, Error> {
        self.client
            .send(self.client.get(&Self::file_path(bucket_id, file_id)), "Get file")
            .await
    }

    /// Renames a file and/or replaces its permissions.
    pub async fn update_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        name: Option<&str>,
        permissions: Option<&[String]>,
    ) -> Result<File, Error> {
        let request = self
            .client
            .put(&Self::file_path(bucket_id, file_id))
            .json(&UpdateFileRequest { name, permissions });
        self.client.send(request, "Update file").await
    }

    /// Downloads the original file content.
    pub async fn get_file_download(
        &self,
        bucket_id: &str,
        file_id: &str,
    ) -> Result<bytes::Bytes, Error> {
        let path = format!("{}/download", Self::file_path(bucket_id, file_id));
        self.client
            .send_bytes(self.client.get(&path), "Download file")
            .await
    }

    /// Renders an image preview; non-image files get a file-type icon.
    pub async fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<bytes::Bytes, Error> {
        let path = format!("{}/preview", Self::file_path(bucket_id, file_id));
        self.client
            .send_bytes(self.client.get(&path).query(options), "Get file preview")
            .await
    }

    pub async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<(), Error> {
        self.client
            .send_empty(
                self.client.delete(&Self::file_path(bucket_id, file_id)),
                "Delete file",
            )
            .await
    }
}
