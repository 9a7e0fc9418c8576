//! Dataset directory layout
//!
//! Session files live at `<root>/<username>/<session_id>.npz`; the metadata
//! table tells which user a session id belongs to.

use std::fs;
use std::path::{Path, PathBuf};

use crate::SESSION_EXTENSION;
use crate::error::DataError;
use crate::metadata::{MetadataTable, SessionMetadata};
use crate::session::Session;

/// A session file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionFile {
    pub username: String,
    pub session_id: String,
    pub path: PathBuf,
}

/// A dataset root together with its metadata table.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    metadata: MetadataTable,
}

impl Dataset {
    pub fn new(root: impl Into<PathBuf>, metadata: MetadataTable) -> Self {
        Self {
            root: root.into(),
            metadata,
        }
    }

    /// Open a dataset root, reading the metadata table from `metadata_path`.
    pub fn open(root: impl Into<PathBuf>, metadata_path: impl AsRef<Path>) -> Result<Self, DataError> {
        Ok(Self::new(root, MetadataTable::load(metadata_path)?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Path of a session file as given by the layout; the file may not exist.
    pub fn session_path(&self, session_id: &str) -> Result<PathBuf, DataError> {
        let meta = self
            .metadata
            .get(session_id)
            .ok_or_else(|| DataError::UnknownSession(session_id.to_string()))?;
        Ok(session_file_path(&self.root, &meta.username, session_id))
    }

    /// Load a session together with its metadata.
    ///
    /// A disagreement between the metadata length and the number of recorded
    /// timesteps is logged, not treated as an error.
    pub fn load_session(&self, session_id: &str) -> Result<(Session, &SessionMetadata), DataError> {
        let meta = self
            .metadata
            .get(session_id)
            .ok_or_else(|| DataError::UnknownSession(session_id.to_string()))?;

        let session = Session::load(session_file_path(&self.root, &meta.username, session_id))?;
        if session.len() as u64 != meta.length {
            tracing::warn!(
                session_id,
                metadata_length = meta.length,
                steps = session.len(),
                "session length differs from metadata"
            );
        }
        Ok((session, meta))
    }

    /// Every `<user>/<id>.npz` file under the root, sorted by user then id.
    pub fn scan(&self) -> Result<Vec<SessionFile>, DataError> {
        scan_root(&self.root)
    }

    /// Session ids listed in the metadata whose file is absent.
    pub fn missing_sessions(&self) -> Vec<&str> {
        self.metadata
            .iter()
            .filter(|(id, meta)| !session_file_path(&self.root, &meta.username, id).is_file())
            .map(|(id, _)| id)
            .collect()
    }
}

/// `<root>/<username>/<session_id>.npz`
pub fn session_file_path(root: &Path, username: &str, session_id: &str) -> PathBuf {
    root.join(username)
        .join(format!("{session_id}.{SESSION_EXTENSION}"))
}

/// Walk a dataset root without consulting any metadata.
pub fn scan_root(root: &Path) -> Result<Vec<SessionFile>, DataError> {
    let mut files = Vec::new();
    for user_entry in fs::read_dir(root)? {
        let user_entry = user_entry?;
        if !user_entry.file_type()?.is_dir() {
            continue;
        }
        let username = user_entry.file_name().to_string_lossy().into_owned();

        for entry in fs::read_dir(user_entry.path())? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != SESSION_EXTENSION) {
                continue;
            }
            let Some(session_id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            files.push(SessionFile {
                username: username.clone(),
                session_id,
                path,
            });
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), sessions = files.len(), "dataset scanned");
    Ok(files)
}
