//! core::metadata
//!
//! Desktop icon metadata: storage and projection onto file objects.
//!
//! # Modules
//!
//! - [`store`] - Debounced key-file store
//! - [`info`] - Attribute records produced by projection
//! - [`target`] - The file-object interface the store projects onto
//!
//! # Flow
//!
//! A caller edits metadata through [`MetadataStore`], passing the file
//! object being edited. The store updates its table, arms the deferred
//! write, and projects the group's keys onto the object as
//! `metadata::<key>` attributes. The object is told it changed only when the
//! projection actually altered its cached metadata.

pub mod info;
pub mod store;
pub mod target;

// Re-export commonly used types
pub use info::{attribute_name, AttributeValue, FileInfo, METADATA_NAMESPACE};
pub use store::{
    decode_values, encode_list, read_keyfile, MetadataStore, StoreError, STRV_TERMINATOR,
};
pub use target::{CachedFile, MetadataTarget};
