//! core::metadata::target
//!
//! The file-object side of metadata projection.
//!
//! The store never reaches into a file object directly. It computes a
//! [`FileInfo`] for a group and hands it to a [`MetadataTarget`], which
//! merges it into whatever cache it keeps and reports whether anything
//! changed. Only then does the store ask the target to announce the change.

use super::info::{AttributeValue, FileInfo, METADATA_NAMESPACE};

/// A file object that caches metadata attributes.
pub trait MetadataTarget {
    /// Merge `info` into the cached metadata.
    ///
    /// Returns `true` if the cached metadata differs afterwards.
    fn update_metadata_from_info(&mut self, info: &FileInfo) -> bool;

    /// Notify listeners that the object changed.
    fn changed(&mut self);
}

type ChangedHandler = Box<dyn FnMut(&str) + Send>;

/// An in-memory file object with a metadata cache and change observers.
///
/// # Example
///
/// ```
/// use caja_metadata::core::metadata::{CachedFile, FileInfo, MetadataTarget};
///
/// let mut file = CachedFile::new("trash");
/// file.connect_changed(|name| println!("{} changed", name));
///
/// let mut info = FileInfo::new();
/// info.set_attribute_string("metadata::icon-position", "64,128");
/// assert!(file.update_metadata_from_info(&info));
/// assert!(!file.update_metadata_from_info(&info));
/// ```
pub struct CachedFile {
    name: String,
    metadata: FileInfo,
    handlers: Vec<ChangedHandler>,
    change_count: u64,
}

impl CachedFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: FileInfo::new(),
            handlers: Vec::new(),
            change_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cached `metadata::` attributes.
    pub fn metadata(&self) -> &FileInfo {
        &self.metadata
    }

    /// Cached value for a metadata key (without the namespace prefix).
    pub fn metadata_value(&self, key: &str) -> Option<&AttributeValue> {
        self.metadata
            .metadata()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Register a handler run on every change notification.
    pub fn connect_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Number of change notifications emitted so far.
    pub fn change_count(&self) -> u64 {
        self.change_count
    }
}

impl std::fmt::Debug for CachedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFile")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("handlers", &self.handlers.len())
            .field("change_count", &self.change_count)
            .finish()
    }
}

impl MetadataTarget for CachedFile {
    /// Replaces the cached metadata with the `metadata::` attributes of
    /// `info`. Attributes outside the namespace are ignored.
    fn update_metadata_from_info(&mut self, info: &FileInfo) -> bool {
        let incoming: FileInfo = info
            .iter()
            .filter(|(name, _)| name.starts_with(METADATA_NAMESPACE))
            .map(|(name, value)| (name, value.clone()))
            .collect();

        if incoming == self.metadata {
            return false;
        }

        self.metadata = incoming;
        true
    }

    fn changed(&mut self) {
        self.change_count += 1;
        for handler in &mut self.handlers {
            handler(&self.name);
        }
    }
}
