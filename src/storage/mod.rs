//! On-disk storage for uploaded and created files
//!
//! Layout inside the storage directory:
//! - `<id>_<filename>`            the stored file
//! - `<id>.meta.json`             metadata written at store time
//! - `<id>.report.json`           latest analysis report
//! - `<id>.optimized_<filename>`  latest optimizer output
//!
//! Lookups glob `<id>_*`, which never matches the sidecar files.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{is_valid_file_id, FileId, Language, Report, StoredFile};

/// Errors from the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file identifier: {0}")]
    InvalidId(String),

    #[error("File not found: {0}")]
    NotFound(FileId),

    #[error("Unsupported file extension for '{0}'")]
    UnsupportedExtension(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lookup pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Files stored on disk, addressed by identifier
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// A stored file read back from disk
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file_id: FileId,
    pub filename: String,
    pub path: PathBuf,
    /// Language recorded at store time, else detected from the extension
    pub language: Language,
    pub content: Vec<u8>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = dir.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize().unwrap_or(root);
        debug!("[marvin:storage] Using {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` under a fresh identifier.
    ///
    /// `language` overrides the one detected from the filename; the
    /// extension must still be one of the allowed ones.
    pub fn save(
        &self,
        filename: &str,
        content: &[u8],
        language: Option<Language>,
    ) -> Result<StoredFile, StorageError> {
        let filename = sanitize_filename(filename)?;
        let detected = Language::detect(&filename)
            .ok_or_else(|| StorageError::UnsupportedExtension(filename.clone()))?;
        let language = language.unwrap_or(detected);

        let file_id = Uuid::new_v4().simple().to_string();
        let path = self.root.join(format!("{}_{}", file_id, filename));
        write_atomic(&path, content)?;

        let stored = StoredFile {
            file_id,
            filename,
            language,
            size: content.len() as u64,
            sha256: sha256_hex(content),
            path,
            created_at: Utc::now(),
        };
        write_atomic(
            &self.meta_path(&stored.file_id),
            &serde_json::to_vec_pretty(&stored)?,
        )?;

        info!(
            "[marvin:storage] Stored {} as {} ({}, {} bytes)",
            stored.filename, stored.file_id, stored.language, stored.size
        );

        Ok(stored)
    }

    fn meta_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}.meta.json", file_id))
    }

    /// Metadata written by [`FileStore::save`], if present and readable
    fn load_meta(&self, file_id: &str) -> Option<StoredFile> {
        let path = self.meta_path(file_id);
        let content = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&content) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("[marvin:storage] Ignoring unreadable {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Locate a stored file by identifier
    pub fn find(&self, file_id: &str) -> Result<(PathBuf, String), StorageError> {
        if !is_valid_file_id(file_id) {
            return Err(StorageError::InvalidId(file_id.to_string()));
        }

        let prefix = format!("{}_", file_id);
        let pattern = format!(
            "{}/{}*",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            prefix
        );

        for entry in glob::glob(&pattern)?.flatten() {
            if !entry.is_file() {
                continue;
            }
            let filename = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| name.strip_prefix(&prefix))
                .map(str::to_string);
            if let Some(filename) = filename {
                return Ok((entry, filename));
            }
        }

        Err(StorageError::NotFound(file_id.to_string()))
    }

    /// Read a stored file by identifier
    pub fn read(&self, file_id: &str) -> Result<LoadedFile, StorageError> {
        let (path, filename) = self.find(file_id)?;
        let content = std::fs::read(&path)?;
        let language = self
            .load_meta(file_id)
            .map(|meta| meta.language)
            .or_else(|| Language::detect(&filename))
            .unwrap_or_default();
        Ok(LoadedFile {
            file_id: file_id.to_string(),
            filename,
            path,
            language,
            content,
        })
    }

    /// Path of the report sidecar for `file_id`
    pub fn report_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}.report.json", file_id))
    }

    /// Persist (overwrite) the report for a stored file
    pub fn save_report(&self, file_id: &str, report: &Report) -> Result<PathBuf, StorageError> {
        if !is_valid_file_id(file_id) {
            return Err(StorageError::InvalidId(file_id.to_string()));
        }
        let path = self.report_path(file_id);
        let json = serde_json::to_vec_pretty(report)?;
        write_atomic(&path, &json)?;
        debug!("[marvin:storage] Wrote report {}", path.display());
        Ok(path)
    }

    /// Load a previously written report
    pub fn load_report(&self, file_id: &str) -> Result<Report, StorageError> {
        if !is_valid_file_id(file_id) {
            return Err(StorageError::InvalidId(file_id.to_string()));
        }
        let path = self.report_path(file_id);
        if !path.exists() {
            return Err(StorageError::NotFound(file_id.to_string()));
        }
        let content = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Persist (overwrite) optimizer output for a stored file
    pub fn save_optimized(
        &self,
        file_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<PathBuf, StorageError> {
        if !is_valid_file_id(file_id) {
            return Err(StorageError::InvalidId(file_id.to_string()));
        }
        let filename = sanitize_filename(filename)?;
        let path = self.root.join(format!("{}.optimized_{}", file_id, filename));
        write_atomic(&path, content.as_bytes())?;
        debug!("[marvin:storage] Wrote optimized copy {}", path.display());
        Ok(path)
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`.
pub fn sanitize_filename(raw: &str) -> Result<String, StorageError> {
    let base = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(StorageError::InvalidFilename(raw.to_string()));
    }

    Ok(cleaned)
}

/// Lowercase hex SHA-256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Write via temp file + fsync + rename so readers never see a partial file
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    temp_file.write_all(content)?;
    temp_file.sync_all()?;

    std::fs::rename(&temp_path, path)?;
    Ok(())
}
