//! File-backed storage: one file per key under a root directory.
//!
//! Keys carry arbitrary identity material, so file names are derived from
//! a SHA-256 digest of the key rather than the key itself. Writes replace
//! the file atomically (tmp file, fsync, rename) so a crash mid-write
//! never leaves a half-serialized record behind.

use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{KeyValueStorage, StorageError};

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `root`. The directory is created on first
    /// write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        self.root.join(format!("{}.json", hex_lower(&hash)))
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                message: format!("{}: {err}", path.display()),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key);
        let write_err = |message: String| StorageError::Write {
            key: key.to_string(),
            message,
        };

        fs::create_dir_all(&self.root)
            .map_err(|e| write_err(format!("{}: {e}", self.root.display())))?;

        let tmp_path = tmp_write_path(&path);
        let write_result = (|| -> Result<(), StorageError> {
            let mut file = File::create(&tmp_path)
                .map_err(|e| write_err(format!("{}: {e}", tmp_path.display())))?;
            file.write_all(value.as_bytes())
                .map_err(|e| write_err(format!("{}: {e}", tmp_path.display())))?;
            file.sync_all()
                .map_err(|e| write_err(format!("{}: {e}", tmp_path.display())))?;
            Ok(())
        })();

        if let Err(error) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(error);
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            write_err(format!(
                "{} -> {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Remove {
                key: key.to_string(),
                message: format!("{}: {err}", path.display()),
            }),
        }
    }
}
