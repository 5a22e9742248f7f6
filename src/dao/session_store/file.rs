//! Session store keeping one JSON file per puzzle inside a directory.

use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    dao::{
        session_store::SessionStore,
        storage::{StorageError, StorageResult},
    },
    state::game::PuzzleId,
};

const RECORD_EXTENSION: &str = "json";
const TMP_EXTENSION: &str = "json.tmp";

/// Directory-backed store; records survive process restarts on the same device.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Open the store, creating the directory when it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| {
            StorageError::unavailable(
                format!("failed to create session directory `{}`", root.display()),
                source,
            )
        })?;
        debug!(path = %root.display(), "opened session directory");
        Ok(Self { root })
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &PuzzleId, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", file_stem(id), extension))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, id: &PuzzleId) -> StorageResult<Option<String>> {
        let path = self.record_path(id, RECORD_EXTENSION);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::unavailable(
                format!("failed to read session record `{}`", path.display()),
                err,
            )),
        }
    }

    fn set(&self, id: &PuzzleId, payload: &str) -> StorageResult<()> {
        let path = self.record_path(id, RECORD_EXTENSION);
        let tmp = self.record_path(id, TMP_EXTENSION);

        fs::write(&tmp, payload).map_err(|source| {
            StorageError::unavailable(
                format!("failed to write session record `{}`", tmp.display()),
                source,
            )
        })?;
        fs::rename(&tmp, &path).map_err(|source| {
            StorageError::unavailable(
                format!("failed to replace session record `{}`", path.display()),
                source,
            )
        })
    }
}

/// Map a puzzle id to a file stem, hex-escaping anything outside `[A-Za-z0-9_-]`.
fn file_stem(id: &PuzzleId) -> String {
    let mut stem = String::with_capacity(id.as_str().len());
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{byte:02x}");
        }
    }
    if stem.is_empty() {
        stem.push('%');
    }
    stem
}
