//! caja-metadata - Desktop icon metadata store
//!
//! Keeps per-icon attributes for the desktop in a key file under the user's
//! Caja directory. Each icon owns one group; each key in it holds a string or
//! a list of strings.
//!
//! # Architecture
//!
//! - [`core`] - Key-file codec, debounce timer, configuration and the store
//! - [`cli`] - Command-line interface for inspecting and editing the store
//! - [`ui`] - Output formatting
//! - [`logging`] - Diagnostic logging setup
//!
//! # Guarantees
//!
//! 1. Edits are visible to the file object as soon as the call returns
//! 2. Bursts of edits produce a single write to disk
//! 3. Storage failures are logged, never raised to the editing caller
//! 4. One-element lists reload as lists, not as plain strings

pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
