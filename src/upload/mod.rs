use axum::body::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// A file part pulled out of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Too many files: at most {max} allowed")]
    TooManyFiles { max: usize },

    #[error("Failed to store upload {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploaded files under a public content root.
///
/// Files are written one at a time in the order received. A failure part way
/// leaves earlier files on disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    public_prefix: String,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_root(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| UploadError::Storage {
                path: self.root.clone(),
                source,
            })
    }

    /// Store every file and return their public paths in the same order
    pub async fn save_all(&self, files: Vec<UploadedFile>) -> Result<Vec<String>, UploadError> {
        if files.is_empty() {
            return Ok(vec![]);
        }
        self.ensure_root().await?;

        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let name = stored_name(chrono::Utc::now().timestamp_millis(), file.file_name.as_deref());
            let path = self.root.join(&name);
            write_new(&path, &file.bytes)
                .await
                .map_err(|source| UploadError::Storage {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!("Stored upload {} ({} bytes)", path.display(), file.bytes.len());
            paths.push(format!("{}/{}", self.public_prefix, name));
        }
        Ok(paths)
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}

/// `<unix-millis>-<random>` plus the original extension, if it has a sane one
fn stored_name(millis: i64, original: Option<&str>) -> String {
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!("{}-{}{}", millis, suffix, ext)
}
