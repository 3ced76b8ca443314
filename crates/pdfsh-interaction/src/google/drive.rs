use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pdfsh_core::cloud::{CloudStorage, RemoteFile};
use pdfsh_core::error::CloudError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{check, transport_error};

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const PDF_QUERY: &str = "mimeType='application/pdf' and trashed=false";

/// Google Drive v3 client.
#[derive(Clone)]
pub struct GoogleDriveClient {
    client: Client,
    access_token: String,
    folder_id: Option<String>,
    api_base: String,
    upload_base: String,
}

impl GoogleDriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            folder_id: None,
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    /// Uploads go into this folder instead of the Drive root.
    pub fn with_folder(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = folder_id;
        self
    }

    pub fn with_base_urls(mut self, api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.upload_base = upload_base.into();
        self
    }

    async fn file_name(&self, file_id: &str) -> Result<String, CloudError> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "name")])
            .send()
            .await
            .map_err(transport_error)?;
        let metadata: FileMetadata = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(metadata.name)
    }
}

#[async_trait]
impl CloudStorage for GoogleDriveClient {
    async fn list_files(&self, limit: usize) -> Result<Vec<RemoteFile>, CloudError> {
        let page_size = limit.clamp(1, 1000).to_string();
        let response = self
            .client
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", PDF_QUERY),
                ("pageSize", page_size.as_str()),
                ("orderBy", "modifiedTime desc"),
                ("fields", "files(id,name,size)"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let listing: FileList = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        tracing::info!("[GoogleDrive] Listed {} PDF files", listing.files.len());

        Ok(listing.into_remote_files(limit))
    }

    async fn download(&self, file_id: &str, dest_dir: &Path) -> Result<PathBuf, CloudError> {
        let name = self.file_name(file_id).await?;
        let dest = download_path(dest_dir, &safe_file_name(&name, file_id), file_id);

        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(transport_error)?;
        let bytes = check(response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)?;

        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| CloudError::Io(format!("{}: {e}", dest.display())))?;

        tracing::info!(
            "[GoogleDrive] Downloaded {} ({} bytes) to {}",
            file_id,
            bytes.len(),
            dest.display()
        );
        Ok(dest)
    }

    async fn upload(&self, local_path: &Path) -> Result<String, CloudError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| CloudError::Io(format!("{}: {e}", local_path.display())))?;
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CloudError::Io(format!("{} has no file name", local_path.display())))?;

        let response = self
            .client
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("fields", "id")])
            .header("content-type", content_type(local_path))
            .body(bytes)
            .send()
            .await
            .map_err(transport_error)?;
        let created: CreatedFile = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        // Media uploads create an untitled file in the root; name and move it.
        let mut patch = self
            .client
            .patch(format!("{}/files/{}", self.api_base, created.id))
            .bearer_auth(&self.access_token)
            .json(&json!({ "name": name }));
        if let Some(folder) = &self.folder_id {
            patch = patch.query(&[("addParents", folder.as_str())]);
        }
        check(patch.send().await.map_err(transport_error)?).await?;

        tracing::info!("[GoogleDrive] Uploaded {} as {}", local_path.display(), created.id);
        Ok(created.id)
    }
}

#[derive(Deserialize)]
struct FileMetadata {
    name: String,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    /// Drive reports sizes as decimal strings
    size: Option<String>,
}

impl FileList {
    fn into_remote_files(self, limit: usize) -> Vec<RemoteFile> {
        self.files
            .into_iter()
            .take(limit)
            .map(|f| RemoteFile {
                size: f.size.and_then(|s| s.parse().ok()),
                id: f.id,
                name: f.name,
            })
            .collect()
    }
}

/// The last path component of a remote name, falling back to the file id.
fn safe_file_name(name: &str, file_id: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "..")
        .unwrap_or_else(|| format!("{file_id}.pdf"))
}

/// `dir/name`, or `dir/<stem>_<file_id>[_n].<ext>` when that file already exists.
fn download_path(dir: &Path, name: &str, file_id: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let id: String = file_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    let mut candidate = dir.join(format!("{stem}_{id}{ext}"));
    let mut n = 1;
    while candidate.exists() {
        n += 1;
        candidate = dir.join(format!("{stem}_{id}_{n}{ext}"));
    }
    candidate
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
