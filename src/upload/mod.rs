//! Image uploads: multipart parsing, generated filenames and on-disk storage.
//!
//! Only the generated filename ever leaves this module; the upload root is
//! an implementation detail of [`UploadStore`].

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use chrono::Utc;
use rand::Rng;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Multipart field carrying the optional image on every write route.
pub const IMAGE_FIELD: &str = "imagen";

// ── Parsed form ───────────────────────────────────────────────────────────────

/// A file received in a multipart body but not yet written to disk.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub field: String,
    pub original_name: String,
    pub bytes: Bytes,
}

/// Text fields plus at most one file, read fully into memory.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<PendingFile>,
}

impl UploadForm {
    /// Drain a multipart body. Text parts are kept by name; a single file is
    /// accepted from `file_field` and a file under any other name is rejected.
    pub async fn from_multipart(mut multipart: Multipart, file_field: &str) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(original_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            };

            if name != file_field {
                return Err(AppError::BadRequest(format!(
                    "unexpected file field {:?}, only {:?} accepts a file",
                    name, file_field
                )));
            }

            let bytes = field.bytes().await?;
            // Browsers send an empty, unnamed part when the file input is left blank.
            if original_name.is_empty() && bytes.is_empty() {
                continue;
            }
            if form.file.is_some() {
                return Err(AppError::BadRequest(format!(
                    "only one file may be sent in {:?}",
                    file_field
                )));
            }
            form.file = Some(PendingFile {
                field: name,
                original_name,
                bytes,
            });
        }

        Ok(form)
    }

    /// Trimmed value of a text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> AppResult<&str> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("field {} is required", name)))
    }

    pub fn file(&self) -> Option<&PendingFile> {
        self.file.as_ref()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }
}

// ── Filenames ─────────────────────────────────────────────────────────────────

/// `{field}-{unix millis}-{0..1e9}{.ext}`, keeping only the original extension.
pub fn generate_filename(field: &str, original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}{}", field, millis, suffix, extension_of(original_name))
}

fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Stored references are bare filenames; anything else never maps to a path.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
        && !name.contains(['/', '\\'])
}

// ── Storage ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        is_plain_filename(filename).then(|| self.root.join(filename))
    }

    /// Write the file under a fresh generated name and return that name.
    /// Opening with `create_new` means an existing file is never replaced.
    pub async fn save(&self, file: &PendingFile) -> io::Result<String> {
        let filename = generate_filename(&file.field, &file.original_name);
        let path = self.root.join(&filename);

        let bytes = file.bytes.clone();
        create_filled(&path, |mut out| async move {
            out.write_all(&bytes).await?;
            out.sync_all().await
        })
        .await?;

        debug!(filename = %filename, bytes = file.bytes.len(), "Stored upload");
        Ok(filename)
    }

    /// Persist the form's file, if any.
    pub async fn store(&self, file: Option<&PendingFile>) -> AppResult<Option<String>> {
        match file {
            Some(file) => Ok(Some(self.save(file).await?)),
            None => Ok(None),
        }
    }

    pub async fn remove(&self, filename: &str) -> io::Result<()> {
        let path = self.path_of(filename).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} is not a stored upload name", filename),
            )
        })?;
        fs::remove_file(path).await
    }

    /// Best-effort removal: failures are logged, never returned.
    pub async fn discard(&self, filename: &str) {
        match self.remove(filename).await {
            Ok(()) => debug!(filename = %filename, "Removed upload"),
            Err(err) => warn!(filename = %filename, error = %err, "Could not remove upload"),
        }
    }

    /// Second phase of a write that stored `new_file` first: keep the file if
    /// the store statement committed, otherwise remove it again.
    pub async fn commit_or_discard<T>(
        &self,
        new_file: Option<&str>,
        result: AppResult<T>,
    ) -> AppResult<T> {
        if result.is_err() {
            if let Some(filename) = new_file {
                self.discard(filename).await;
            }
        }
        result
    }
}

/// Create `path` (never replacing an existing file) and hand it to `fill`.
/// A failed fill removes the partial file before the error is returned.
async fn create_filled<F, Fut>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(File) -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    if let Err(err) = fill(out).await {
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "Could not remove partial upload");
        }
        return Err(err);
    }
    Ok(())
}
