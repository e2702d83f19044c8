//! Keyed string storage for gallery snapshots.
//!
//! The controller only sees the [`KeyValueStore`] trait.  The runtime uses
//! [`SessionStore`] (one JSON file per key under a per-session runtime
//! directory, so snapshots survive page switches and relaunches from the
//! same shell but not a logout).  Tests use an in-memory map.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[cfg(test)]
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// A string-keyed get/set store.  Last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────── memory ────────────


// ───────────────────────────────────────── session files ─────

/// File-backed store scoped to one terminal session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store rooted at `$XDG_RUNTIME_DIR/club-gallery/<session>`.
    ///
    /// `session` defaults to the parent process id, i.e. the shell that
    /// launched us.
    pub fn for_session(session: Option<&str>) -> Self {
        let session = session
            .map(sanitize)
            .unwrap_or_else(default_session_id);
        Self {
            dir: runtime_dir().join("club-gallery").join(session),
        }
    }

    /// Store rooted at an explicit directory.
    #[cfg(test)]
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(key)))
    }
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write to a sibling temp file, then rename over the target.
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &target).map_err(write_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

#[cfg(unix)]
fn default_session_id() -> String {
    format!("ppid-{}", std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn default_session_id() -> String {
    "default".to_string()
}

/// Keep keys and session names usable as single path components.
fn sanitize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("grid", "{}").unwrap();
        assert_eq!(b.get("grid").unwrap().as_deref(), Some("{}"));
        a.remove("grid").unwrap();
        assert_eq!(b.get("grid").unwrap(), None);
    }

    #[test]
    fn session_store_round_trips_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionStore::with_dir(tmp.path().join("s1"));

        assert_eq!(store.get("projects-grid").unwrap(), None);
        store.set("projects-grid", "{\"category\":\"web\"}").unwrap();
        store.set("projects-grid", "{\"category\":\"ai\"}").unwrap();
        assert_eq!(
            store.get("projects-grid").unwrap().as_deref(),
            Some("{\"category\":\"ai\"}")
        );

        // No temp files left behind.
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["projects-grid.json".to_string()]);
    }

    #[test]
    fn session_store_remove_missing_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionStore::with_dir(tmp.path().to_path_buf());
        store.remove("nothing").unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_session_dir() {
        let store = SessionStore::with_dir(PathBuf::from("/run/x"));
        assert_eq!(
            store.path_for("../../etc/passwd"),
            PathBuf::from("/run/x/______etc_passwd.json")
        );
    }
}
