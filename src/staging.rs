//! Staging of multipart submissions on local disk.
//!
//! The photo part is streamed to a randomly named file in the temp directory.
//! That random name doubles as the object store key. Every staged file is
//! owned by a [`StagedFileGuard`] that removes it when dropped, so cleanup
//! runs exactly once whichever way the request ends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::StagingError;

/// Multipart field name carrying the photo
pub const UPLOAD_FIELD: &str = "temp-img";

/// Deletes the staged file on drop. Failures are ignored.
///
/// Inside a tokio runtime the unlink runs on the blocking pool so the
/// dropping task is never held up by the filesystem.
#[derive(Debug)]
pub struct StagedFileGuard {
    path: PathBuf,
}

impl StagedFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for StagedFileGuard {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_staged(&path));
            }
            Err(_) => remove_staged(&path),
        }
    }
}

fn remove_staged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed staged file {}", path.display()),
        Err(e) => debug!("Could not remove staged file {}: {}", path.display(), e),
    }
}

/// A photo written to the temp directory.
#[derive(Debug)]
pub struct StagedFile {
    /// Generated file name, also used as the storage key
    pub key: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    pub path: PathBuf,
    _guard: StagedFileGuard,
}

impl StagedFile {
    /// Take ownership of a file already on disk; it is removed on drop.
    #[cfg(test)]
    pub(crate) fn adopt(
        key: &str,
        original_name: &str,
        content_type: &str,
        size: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            key: key.to_string(),
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            size,
            _guard: StagedFileGuard::new(path.clone()),
            path,
        }
    }

    /// Read the whole staged file into memory.
    pub async fn read(&self) -> Result<Vec<u8>, StagingError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| StagingError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Text fields and the optional photo of one submission.
#[derive(Debug, Default)]
pub struct StagedUpload {
    pub fields: HashMap<String, String>,
    pub file: Option<StagedFile>,
}

/// Random 32 hex character name for a staged upload.
pub fn generate_key() -> String {
    Uuid::new_v4().simple().to_string()
}

fn content_type_for(declared: Option<&str>, file_name: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Consume the multipart body, writing the photo part (if any) to `tmp_dir`.
///
/// A file part with an empty file name is treated as "no photo", which is
/// what browsers send for an untouched file input. Any other file part, or a
/// second photo, is rejected.
pub async fn stage_multipart(
    mut multipart: Multipart,
    tmp_dir: &Path,
) -> Result<StagedUpload, StagingError> {
    let mut upload = StagedUpload::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            upload.fields.insert(name, value);
            continue;
        };

        if name != UPLOAD_FIELD || upload.file.is_some() {
            return Err(StagingError::UnexpectedFile(name));
        }

        if file_name.is_empty() {
            // Drain the empty part
            while field.chunk().await?.is_some() {}
            continue;
        }

        let content_type = content_type_for(field.content_type(), &file_name);
        let key = generate_key();
        let path = tmp_dir.join(&key);

        let io_err = |source| StagingError::Io {
            path: path.clone(),
            source,
        };

        // The file is removed on every exit path from here on, including a
        // failure halfway through the body. Declared before the handle so the
        // handle closes first.
        let guard = StagedFileGuard::new(path.clone());
        let mut file = File::create(&path).await.map_err(io_err)?;

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await.map_err(io_err)?;
            size += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;

        info!(
            "Staged upload '{}' as {} ({}, {} bytes)",
            file_name, key, content_type, size
        );

        upload.file = Some(StagedFile {
            key,
            original_name: file_name,
            content_type,
            size,
            path,
            _guard: guard,
        });
    }

    Ok(upload)
}
