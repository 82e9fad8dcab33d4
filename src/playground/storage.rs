use super::{add, Context};
use crate::harness::{HarnessError, RegistryBuilder};
use crate::id;
use crate::storage::models::{File, FileList, InputFile, PreviewOptions, UploadProgress};
use chrono::Local;
use std::sync::Mutex;

const NO_FILES: &str = "No files found. Upload one first!";

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "List Files", list_files, files_summary)?;
    add(builder, ctx, "Upload File (Text)", upload_text_file, |(file, progress): &(File, Vec<String>)| {
        let mut lines = progress.clone();
        lines.push(format!("File uploaded: {} ({} bytes)", file.name, file.size_original));
        lines
    })?;
    add(builder, ctx, "Get File Info", get_file_info, |file: &File| {
        vec![
            format!("File info for: {}", file.name),
            format!("  Size: {} bytes", file.size_original),
            format!("  MIME Type: {}", file.mime_type),
            format!("  Created: {}", file.created_at),
            format!("  Signature: {}", file.signature),
        ]
    })?;
    add(builder, ctx, "Update File", update_file, |file: &File| {
        vec![format!("File updated: {}", file.name)]
    })?;
    add(builder, ctx, "Download File", download_file, download_summary)?;
    add(builder, ctx, "Get File Preview", get_file_preview, |(file, size): &(File, usize)| {
        vec![
            format!("File preview generated: {}", file.name),
            format!("  Preview size: {size} bytes"),
        ]
    })?;
    add(builder, ctx, "Delete File", delete_file, |file: &File| {
        vec![format!("File deleted: {}", file.name)]
    })?;
    Ok(())
}

async fn list_files(ctx: Context) -> Result<FileList, HarnessError> {
    let bucket = ctx.bucket()?;
    Ok(ctx.services()?.storage.list_files(bucket, &[], None).await?)
}

fn files_summary(list: &FileList) -> Vec<String> {
    let mut lines = vec![format!("Found {} files", list.total)];
    lines.extend(
        list.files
            .iter()
            .take(5)
            .map(|file| format!("  File: {} ({} bytes)", file.name, file.size_original)),
    );
    lines
}

async fn first_file(ctx: &Context, empty: &str) -> Result<File, HarnessError> {
    let list = list_files(ctx.clone()).await?;
    list.files
        .into_iter()
        .next()
        .ok_or_else(|| HarnessError::precondition(empty))
}

async fn upload_text_file(ctx: Context) -> Result<(File, Vec<String>), HarnessError> {
    let bucket = ctx.bucket()?;
    let now = Local::now();
    let content = format!(
        "This is a test file created from the playground at {}",
        now.format("%Y-%m-%d %H:%M:%S")
    );
    let input = InputFile::from_bytes(
        content.into_bytes(),
        format!("playground_{}.txt", now.format("%Y%m%d_%H%M%S")),
        "text/plain",
    );

    let progress = Mutex::new(Vec::new());
    let on_progress = |p: UploadProgress| {
        progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("Upload progress: {:.1}%", p.progress));
    };
    let file = ctx
        .services()?
        .storage
        .create_file(bucket, &id::unique(), input, None, Some(&on_progress))
        .await?;
    let progress = progress.into_inner().unwrap_or_else(|e| e.into_inner());
    Ok((file, progress))
}

async fn get_file_info(ctx: Context) -> Result<File, HarnessError> {
    let first = first_file(&ctx, NO_FILES).await?;
    let bucket = ctx.bucket()?;
    Ok(ctx.services()?.storage.get_file(bucket, &first.id).await?)
}

async fn update_file(ctx: Context) -> Result<File, HarnessError> {
    let first = first_file(&ctx, NO_FILES).await?;
    let bucket = ctx.bucket()?;
    let name = format!("updated_{}", first.name);
    Ok(ctx
        .services()?
        .storage
        .update_file(bucket, &first.id, Some(name.as_str()), None)
        .await?)
}

async fn download_file(ctx: Context) -> Result<(File, bytes::Bytes), HarnessError> {
    let first = first_file(&ctx, NO_FILES).await?;
    let bucket = ctx.bucket()?;
    let data = ctx
        .services()?
        .storage
        .get_file_download(bucket, &first.id)
        .await?;
    Ok((first, data))
}

fn download_summary((file, data): &(File, bytes::Bytes)) -> Vec<String> {
    let mut lines = vec![
        format!("File downloaded: {}", file.name),
        format!("  Downloaded {} bytes", data.len()),
    ];
    if file.mime_type.starts_with("text/") {
        let text = String::from_utf8_lossy(data);
        let preview: String = text.chars().take(100).collect();
        lines.push(format!("  Content: {preview}..."));
    }
    lines
}

async fn get_file_preview(ctx: Context) -> Result<(File, usize), HarnessError> {
    let first = first_file(&ctx, NO_FILES).await?;
    let bucket = ctx.bucket()?;
    let options = PreviewOptions {
        width: Some(200),
        height: Some(200),
        ..Default::default()
    };
    let preview = ctx
        .services()?
        .storage
        .get_file_preview(bucket, &first.id, &options)
        .await?;
    Ok((first, preview.len()))
}

async fn delete_file(ctx: Context) -> Result<File, HarnessError> {
    let first = first_file(&ctx, "No files found to delete!").await?;
    let bucket = ctx.bucket()?;
    ctx.services()?
        .storage
        .delete_file(bucket, &first.id)
        .await?;
    Ok(first)
}
