//! core
//!
//! Core types and storage for desktop metadata.
//!
//! # Modules
//!
//! - [`keyfile`] - Key-file data structure and text codec
//! - [`debounce`] - Single-slot debounce timer for deferred writes
//! - [`metadata`] - Metadata store and projection onto file objects
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod debounce;
pub mod keyfile;
pub mod metadata;
