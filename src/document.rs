// src/document.rs - Scratch storage for uploaded documents
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use uuid::Uuid;

/// A document received from the upload web page, stored in the scratch area.
///
/// The backing file is removed when the last handle drops, so a document stays
/// on disk for exactly as long as a preview render or a print job still refers
/// to it.
#[derive(Debug)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub original_name: String,
    path: PathBuf,
    pub size: u64,
    pub received_at: DateTime<Utc>,
}

/// Shared, reference-counted ownership of an [`UploadedDocument`].
pub type DocumentHandle = Arc<UploadedDocument>;

impl UploadedDocument {
    pub fn new(original_name: impl Into<String>, path: PathBuf, size: u64) -> DocumentHandle {
        Arc::new(Self {
            id: Uuid::new_v4(),
            original_name: original_name.into(),
            path,
            size,
            received_at: Utc::now(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadedDocument {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove scratch file {}: {}", self.path.display(), e)
            }
        }
    }
}

enum ScratchRoot {
    /// Temporary directory removed when the store drops.
    Temp(TempDir),
    /// Operator-configured directory, left in place on exit.
    Fixed(PathBuf),
}

/// Writes uploads into the scratch area under collision-free names.
pub struct ScratchStore {
    root: ScratchRoot,
    seq: AtomicU64,
}

impl ScratchStore {
    /// Create a store backed by a fresh temporary directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            root: ScratchRoot::Temp(tempfile::tempdir()?),
            seq: AtomicU64::new(0),
        })
    }

    /// Create a store at a fixed directory, creating it if needed.
    pub fn at(dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            root: ScratchRoot::Fixed(dir),
            seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        match &self.root {
            ScratchRoot::Temp(dir) => dir.path(),
            ScratchRoot::Fixed(dir) => dir,
        }
    }

    /// Persist an upload and return a handle to it.
    ///
    /// Names combine the receive timestamp, a process-wide sequence number and
    /// the sanitized original name, so concurrent uploads of the same file in
    /// the same second still land on distinct paths.
    pub async fn store(&self, original_name: &str, data: &[u8]) -> io::Result<DocumentHandle> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let received_at = Utc::now();
        let file_name = format!(
            "print_{}_{}_{}",
            received_at.timestamp(),
            seq,
            sanitize_file_name(original_name)
        );
        let path = self.dir().join(file_name);
        tokio::fs::write(&path, data).await?;

        Ok(Arc::new(UploadedDocument {
            id: Uuid::new_v4(),
            original_name: original_name.to_string(),
            path,
            size: data.len() as u64,
            received_at,
        }))
    }
}

/// Reduce an uploaded filename to a safe single path component.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}
