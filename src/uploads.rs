//! Upload storage - writes received images to the upload directory

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// File written to disk for one upload
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Name relative to the upload dir (also the `/uploads/<name>` path)
    pub file_name: String,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if missing
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredUpload> {
        let file_name = stored_file_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        Ok(StoredUpload {
            file_name,
            sha256: format!("{:x}", Sha256::digest(bytes)),
        })
    }

    /// Delete a previously stored upload
    pub async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        tokio::fs::remove_file(self.dir.join(file_name)).await
    }
}

/// `<unix-millis>-<uuid><.ext>`; never reuses the client-supplied stem
fn stored_file_name(original_name: &str) -> String {
    let unique = format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple());
    match extension(original_name) {
        Some(ext) => format!("{}.{}", unique, ext),
        None => unique,
    }
}

fn extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
