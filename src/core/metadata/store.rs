//! core::metadata::store
//!
//! Desktop metadata store backed by a key file.
//!
//! # Architecture
//!
//! Every desktop icon owns one group in the key file at
//! `<user dir>/desktop-metadata`; each key in the group is one metadata
//! attribute holding a string or a list of strings. The store keeps the
//! whole table in memory:
//!
//! - The table is loaded lazily on first access, exactly once
//! - Mutations apply synchronously to the in-memory table
//! - The changed group is projected onto the caller's file object right away
//! - Writes to disk are debounced: a burst of edits produces one write once
//!   activity settles
//! - Without a tokio runtime the write waits for [`MetadataStore::flush_now`]
//!   or for the store to be dropped
//!
//! # Failure Handling
//!
//! Nothing here fails the caller. A missing key file is an empty store, an
//! unreadable or malformed one is logged and treated as empty, and failed
//! writes are logged and dropped without retry. [`MetadataStore::flush_now`]
//! is the one operation that reports write errors.
//!
//! # Single-Element Lists
//!
//! A one-element list is stored with [`STRV_TERMINATOR`] appended so that it
//! reloads as a list instead of a plain string. A real value equal to the
//! terminator is indistinguishable from it.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use caja_metadata::core::metadata::{AttributeValue, CachedFile, MetadataStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = MetadataStore::with_path(dir.path().join("desktop-metadata"), Duration::ZERO);
//! let mut trash = CachedFile::new("trash");
//!
//! store.set_string(&mut trash, "trash", "icon-position", Some("64,128"));
//! store.set_string_list(&mut trash, "trash", "emblems", &["important"]);
//!
//! assert_eq!(
//!     trash.metadata_value("emblems"),
//!     Some(&AttributeValue::StringV(vec!["important".into()]))
//! );
//! store.flush_now().unwrap();
//! ```

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use thiserror::Error;

use super::info::{attribute_name, AttributeValue, FileInfo};
use super::target::MetadataTarget;
use crate::core::config::{Config, ConfigError};
use crate::core::debounce::{DebounceStats, Debouncer};
use crate::core::keyfile::{KeyFile, KeyFileError};

/// Marker appended to one-element lists in the key file.
pub const STRV_TERMINATOR: &str = "@x-caja-desktop-metadata-term@";

/// Errors from metadata storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the key file.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The key file is malformed.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: KeyFileError,
    },

    /// Failed to write the key file.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The in-memory table rejected an operation.
    #[error("key file error: {0}")]
    KeyFile(#[from] KeyFileError),
}

/// Decode a stored sequence into an attribute value.
///
/// - empty: no value
/// - one element: a string
/// - two elements ending in [`STRV_TERMINATOR`]: a one-element list
/// - anything else: a list
///
/// # Example
///
/// ```
/// use caja_metadata::core::metadata::{decode_values, AttributeValue, STRV_TERMINATOR};
///
/// let stored = vec!["only".to_string(), STRV_TERMINATOR.to_string()];
/// assert_eq!(
///     decode_values(&stored),
///     Some(AttributeValue::StringV(vec!["only".into()]))
/// );
/// assert_eq!(decode_values(&[]), None);
/// ```
pub fn decode_values(values: &[String]) -> Option<AttributeValue> {
    match values {
        [] => None,
        [single] => Some(AttributeValue::String(single.clone())),
        [first, second] if second == STRV_TERMINATOR => {
            Some(AttributeValue::StringV(vec![first.clone()]))
        }
        many => Some(AttributeValue::StringV(many.to_vec())),
    }
}

/// Encode a list for storage, padding one-element lists with the terminator.
pub fn encode_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut encoded: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
    if encoded.len() == 1 {
        encoded.push(STRV_TERMINATOR.to_string());
    }
    encoded
}

/// Read the key file at `path`.
///
/// A missing file yields an empty key file.
pub fn read_keyfile(path: &Path) -> Result<KeyFile, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(KeyFile::new()),
        Err(e) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    KeyFile::parse(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Sibling temp file for `path`: the full file name with `.tmp` appended.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` atomically (temp file + rename).
fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let write_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let temp_path = temp_path(path);
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(write_error)?;

        file.write_all(contents.as_bytes()).map_err(write_error)?;
        file.sync_all().map_err(write_error)?;
    }

    fs::rename(&temp_path, path).map_err(write_error)
}

/// State shared between the store and its pending flush job.
#[derive(Debug)]
struct Shared {
    path: PathBuf,
    keyfile: OnceLock<Mutex<KeyFile>>,
}

impl Shared {
    /// Lock the table, loading it on first use.
    fn keyfile(&self) -> MutexGuard<'_, KeyFile> {
        self.keyfile
            .get_or_init(|| Mutex::new(self.load()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> KeyFile {
        match read_keyfile(&self.path) {
            Ok(keyfile) => {
                tracing::debug!(path = %self.path.display(), "loaded desktop metadata");
                keyfile
            }
            Err(e) => {
                tracing::warn!(error = %e, "unable to open the desktop metadata keyfile");
                KeyFile::new()
            }
        }
    }

    fn save(&self) -> Result<(), StoreError> {
        let contents = self.keyfile().to_data();
        write_atomic(&self.path, &contents)?;
        tracing::debug!(path = %self.path.display(), "saved desktop metadata");
        Ok(())
    }

    fn save_logged(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(
                error = %e,
                "couldn't save the desktop metadata keyfile to disk"
            );
        }
    }
}

/// Debounced desktop metadata store.
///
/// Owns the in-memory table and the deferred flush. Callers hold the store
/// and pass the file object they are editing to each operation.
#[derive(Debug)]
pub struct MetadataStore {
    shared: Arc<Shared>,
    flush: Debouncer,
}

impl MetadataStore {
    /// Create a store using the key file and flush delay from `config`.
    pub fn open(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_path(config.keyfile_path()?, config.flush_delay()))
    }

    /// Create a store for the key file at `path`.
    ///
    /// Nothing is read until the first access.
    pub fn with_path(path: impl Into<PathBuf>, flush_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.into(),
                keyfile: OnceLock::new(),
            }),
            flush: Debouncer::new(flush_delay),
        }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Whether the key file has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.shared.keyfile.get().is_some()
    }

    /// Set `key` in `group` to a single string, or remove it when `value` is
    /// `None`.
    ///
    /// Removing a key that does not exist is silently ignored.
    pub fn set_string<T>(&mut self, target: &mut T, group: &str, key: &str, value: Option<&str>)
    where
        T: MetadataTarget + ?Sized,
    {
        {
            let mut keyfile = self.shared.keyfile();
            match value {
                Some(value) => {
                    if let Err(e) = keyfile.set_string(group, key, value) {
                        tracing::warn!(group, key, error = %e, "couldn't set metadata string");
                    }
                }
                None => match keyfile.remove_key(group, key) {
                    Ok(()) | Err(KeyFileError::KeyNotFound { .. }) => {}
                    Err(e) => {
                        tracing::warn!(
                            group,
                            key,
                            error = %e,
                            "couldn't remove the key from the keyfile"
                        );
                    }
                },
            }
        }

        self.commit(target, group);
    }

    /// Set `key` in `group` to a list of strings.
    ///
    /// An empty list is stored as such and projects to no attribute.
    pub fn set_string_list<T, S>(&mut self, target: &mut T, group: &str, key: &str, values: &[S])
    where
        T: MetadataTarget + ?Sized,
        S: AsRef<str>,
    {
        {
            let mut keyfile = self.shared.keyfile();
            if let Err(e) = keyfile.set_string_list(group, key, &encode_list(values)) {
                tracing::warn!(group, key, error = %e, "couldn't set metadata list");
            }
        }

        self.commit(target, group);
    }

    /// Drop every key of `group`.
    pub fn remove_group<T>(&mut self, target: &mut T, group: &str)
    where
        T: MetadataTarget + ?Sized,
    {
        let removed = self.shared.keyfile().remove_group(group).is_ok();
        if !removed {
            return;
        }

        self.schedule_flush();
        if target.update_metadata_from_info(&FileInfo::new()) {
            target.changed();
        }
    }

    /// Project `group` onto `target`.
    ///
    /// Returns whether the target's metadata changed. A group that does not
    /// exist leaves the target untouched and returns `false`.
    pub fn project<T>(&self, target: &mut T, group: &str) -> bool
    where
        T: MetadataTarget + ?Sized,
    {
        match self.file_info(group) {
            Some(info) => target.update_metadata_from_info(&info),
            None => false,
        }
    }

    /// The attribute record `project` would hand to a target.
    pub fn file_info(&self, group: &str) -> Option<FileInfo> {
        let keyfile = self.shared.keyfile();
        let keys = keyfile.keys(group)?;

        let mut info = FileInfo::new();
        for key in keys {
            let decoded = keyfile.get(group, key).and_then(decode_values);
            if let Some(value) = decoded {
                info.set_attribute(&attribute_name(key), value);
            }
        }
        Some(info)
    }

    /// Decoded value of `key` in `group`.
    ///
    /// A stored empty list is `Some(StringV([]))`, unlike a missing key.
    /// Projection skips it, so it never shows up in [`file_info`].
    ///
    /// [`file_info`]: MetadataStore::file_info
    pub fn get(&self, group: &str, key: &str) -> Option<AttributeValue> {
        self.shared.keyfile().get(group, key).map(|values| {
            decode_values(values).unwrap_or_else(|| AttributeValue::StringV(Vec::new()))
        })
    }

    pub fn groups(&self) -> Vec<String> {
        self.shared.keyfile().groups().map(str::to_string).collect()
    }

    pub fn keys(&self, group: &str) -> Option<Vec<String>> {
        self.shared
            .keyfile()
            .keys(group)
            .map(|keys| keys.into_iter().map(str::to_string).collect())
    }

    /// Write the table now, cancelling any pending deferred flush.
    pub fn flush_now(&mut self) -> Result<(), StoreError> {
        self.flush.cancel();
        self.shared.save()
    }

    /// Whether a deferred flush is waiting to run.
    pub fn flush_pending(&self) -> bool {
        self.flush.is_pending()
    }

    pub fn flush_stats(&self) -> DebounceStats {
        self.flush.stats()
    }

    fn commit<T>(&mut self, target: &mut T, group: &str)
    where
        T: MetadataTarget + ?Sized,
    {
        self.schedule_flush();
        if self.project(target, group) {
            target.changed();
        }
    }

    fn schedule_flush(&mut self) {
        let shared = Arc::clone(&self.shared);
        self.flush.schedule(move || shared.save_logged());
    }
}

impl Drop for MetadataStore {
    fn drop(&mut self) {
        self.flush.run_pending();
    }
}
