//! core::keyfile
//!
//! In-memory key file and its text codec.
//!
//! # Format
//!
//! The on-disk format follows the GLib key-file conventions used by desktop
//! applications:
//!
//! ```text
//! # comments are ignored
//! [trash]
//! icon-position=64,128
//! emblems=important;
//! ```
//!
//! - Group headers are `[name]`; entries are `key=value`.
//! - Values escape `\s` (leading space), `\n`, `\t`, `\r`, `\\` and `\;`.
//! - Every stored value is a sequence of strings. A one-element sequence is
//!   written as a plain value; any other length is written as a list with
//!   each element followed by `;`.
//!
//! Groups and keys keep their insertion order, which is also the order they
//! are written in.
//!
//! # Example
//!
//! ```
//! use caja_metadata::core::keyfile::KeyFile;
//!
//! let mut keyfile = KeyFile::new();
//! keyfile.set_string("home", "icon-scale", "1.5").unwrap();
//! keyfile.set_string_list("home", "emblems", &["new", "shared"]).unwrap();
//!
//! let data = keyfile.to_data();
//! assert_eq!(data, "[home]\nicon-scale=1.5\nemblems=new;shared;\n");
//!
//! let reloaded = KeyFile::parse(&data).unwrap();
//! assert_eq!(reloaded, keyfile);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// List separator used in the text format.
pub const LIST_SEPARATOR: char = ';';

/// Errors from key-file operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyFileError {
    /// The requested group does not exist.
    #[error("key file does not have group '{0}'")]
    GroupNotFound(String),

    /// The requested key does not exist in an existing group.
    #[error("key file does not have key '{key}' in group '{group}'")]
    KeyNotFound { group: String, key: String },

    /// Group name cannot be represented in the text format.
    #[error("invalid group name: {0:?}")]
    InvalidGroupName(String),

    /// Key cannot be represented in the text format.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// The text could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    name: String,
    entries: Vec<(String, Vec<String>)>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    fn set(&mut self, key: &str, values: Vec<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((key.to_string(), values)),
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }
}

/// An ordered mapping of groups to keys to string sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFile {
    groups: Vec<Group>,
}

impl KeyFile {
    /// Create an empty key file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse key-file text.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFileError::Parse`] with the 1-based line number for
    /// malformed headers, entries before the first group, invalid keys and
    /// invalid escape sequences.
    pub fn parse(data: &str) -> Result<Self, KeyFileError> {
        let mut keyfile = KeyFile::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in data.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                let name = line
                    .trim_end()
                    .strip_prefix('[')
                    .and_then(|l| l.strip_suffix(']'))
                    .ok_or_else(|| parse_error(line_no, "unterminated group header"))?;
                validate_group_name(name)
                    .map_err(|_| parse_error(line_no, format!("invalid group name '{}'", name)))?;
                current = Some(keyfile.group_index_or_insert(name));
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                parse_error(line_no, "expected a group header, a comment or key=value")
            })?;
            let key = key.trim_end_matches([' ', '\t']);
            let value = value.trim_start_matches([' ', '\t']);

            validate_key(key).map_err(|_| parse_error(line_no, format!("invalid key '{}'", key)))?;
            let group = current
                .ok_or_else(|| parse_error(line_no, "key/value pair before the first group"))?;
            let values = parse_value(value).map_err(|message| parse_error(line_no, message))?;

            keyfile.groups[group].set(key, values);
        }

        Ok(keyfile)
    }

    /// Serialize to the canonical text format.
    pub fn to_data(&self) -> String {
        let mut out = String::new();
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&group.name);
            out.push_str("]\n");
            for (key, values) in &group.entries {
                out.push_str(key);
                out.push('=');
                out.push_str(&format_values(values));
                out.push('\n');
            }
        }
        out
    }

    /// Whether the key file has no groups at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group names in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.get(group, key).is_some()
    }

    /// Keys of `group` in insertion order.
    ///
    /// Returns `None` if the group does not exist. An existing group whose
    /// keys were all removed yields an empty list.
    pub fn keys(&self, group: &str) -> Option<Vec<&str>> {
        self.group(group)
            .map(|g| g.entries.iter().map(|(k, _)| k.as_str()).collect())
    }

    /// The stored sequence for `key` in `group`.
    pub fn get(&self, group: &str, key: &str) -> Option<&[String]> {
        self.group(group).and_then(|g| g.get(key))
    }

    /// Owned copy of the stored sequence.
    pub fn get_string_list(&self, group: &str, key: &str) -> Result<Vec<String>, KeyFileError> {
        let entries = self
            .group(group)
            .ok_or_else(|| KeyFileError::GroupNotFound(group.to_string()))?;
        entries
            .get(key)
            .map(<[String]>::to_vec)
            .ok_or_else(|| KeyFileError::KeyNotFound {
                group: group.to_string(),
                key: key.to_string(),
            })
    }

    /// Store a single string, creating the group if needed.
    pub fn set_string(&mut self, group: &str, key: &str, value: &str) -> Result<(), KeyFileError> {
        self.set_values(group, key, vec![value.to_string()])
    }

    /// Store a sequence of strings as-is, creating the group if needed.
    pub fn set_string_list<S: AsRef<str>>(
        &mut self,
        group: &str,
        key: &str,
        values: &[S],
    ) -> Result<(), KeyFileError> {
        let values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.set_values(group, key, values)
    }

    fn set_values(
        &mut self,
        group: &str,
        key: &str,
        values: Vec<String>,
    ) -> Result<(), KeyFileError> {
        validate_group_name(group)?;
        validate_key(key)?;
        let idx = self.group_index_or_insert(group);
        self.groups[idx].set(key, values);
        Ok(())
    }

    /// Remove `key` from `group`.
    ///
    /// The group itself is kept even when its last key goes away.
    ///
    /// # Errors
    ///
    /// - [`KeyFileError::GroupNotFound`] if the group does not exist
    /// - [`KeyFileError::KeyNotFound`] if the group exists without the key
    pub fn remove_key(&mut self, group: &str, key: &str) -> Result<(), KeyFileError> {
        let g = self
            .groups
            .iter_mut()
            .find(|g| g.name == group)
            .ok_or_else(|| KeyFileError::GroupNotFound(group.to_string()))?;

        if g.remove(key) {
            Ok(())
        } else {
            Err(KeyFileError::KeyNotFound {
                group: group.to_string(),
                key: key.to_string(),
            })
        }
    }

    /// Remove `group` and all its keys.
    pub fn remove_group(&mut self, group: &str) -> Result<(), KeyFileError> {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != group);
        if self.groups.len() == before {
            Err(KeyFileError::GroupNotFound(group.to_string()))
        } else {
            Ok(())
        }
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        match self.groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        }
    }
}

impl FromStr for KeyFile {
    type Err = KeyFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data())
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> KeyFileError {
    KeyFileError::Parse {
        line,
        message: message.into(),
    }
}

/// Check that `name` can be written as a group header.
pub fn validate_group_name(name: &str) -> Result<(), KeyFileError> {
    if name.is_empty() || name.chars().any(|c| c == '[' || c == ']' || c.is_control()) {
        return Err(KeyFileError::InvalidGroupName(name.to_string()));
    }
    Ok(())
}

/// Check that `key` can be written as an entry name.
pub fn validate_key(key: &str) -> Result<(), KeyFileError> {
    let invalid = key.is_empty()
        || key.starts_with('#')
        || key.starts_with(char::is_whitespace)
        || key.ends_with(char::is_whitespace)
        || key
            .chars()
            .any(|c| c == '=' || c == '[' || c == ']' || c.is_control());
    if invalid {
        return Err(KeyFileError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn escape_into(out: &mut String, value: &str) {
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 => out.push_str("\\s"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            LIST_SEPARATOR => out.push_str("\\;"),
            c => out.push(c),
        }
    }
}

fn format_values(values: &[String]) -> String {
    let mut out = String::new();
    match values {
        [single] => escape_into(&mut out, single),
        many => {
            for value in many {
                escape_into(&mut out, value);
                out.push(LIST_SEPARATOR);
            }
        }
    }
    out
}

/// Split a raw value on unescaped separators, unescaping each element.
///
/// A trailing separator closes the last element; it never adds an empty one.
fn parse_value(raw: &str) -> Result<Vec<String>, String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('s') => current.push(' '),
                Some('n') => current.push('\n'),
                Some('t') => current.push('\t'),
                Some('r') => current.push('\r'),
                Some('\\') => current.push('\\'),
                Some(LIST_SEPARATOR) => current.push(LIST_SEPARATOR),
                Some(other) => return Err(format!("invalid escape sequence '\\{}'", other)),
                None => return Err("escape character at end of value".to_string()),
            },
            LIST_SEPARATOR => values.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        values.push(current);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_groups_and_values() {
        let keyfile = KeyFile::parse(
            "# saved by caja\n\
             [trash]\n\
             icon-position=64,128\n\
             emblems=important;urgent;\n\
             \n\
             [home]\n\
             icon-scale = 1.5\n",
        )
        .expect("parse");

        assert_eq!(keyfile.groups().collect::<Vec<_>>(), vec!["trash", "home"]);
        assert_eq!(
            keyfile.get("trash", "icon-position"),
            Some(&["64,128".to_string()][..])
        );
        assert_eq!(
            keyfile.get("trash", "emblems"),
            Some(&["important".to_string(), "urgent".to_string()][..])
        );
        assert_eq!(keyfile.get("home", "icon-scale"), Some(&["1.5".to_string()][..]));
    }

    #[test]
    fn keys_preserve_insertion_order() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("g", "zeta", "1").unwrap();
        keyfile.set_string("g", "alpha", "2").unwrap();
        keyfile.set_string("g", "zeta", "3").unwrap();

        assert_eq!(keyfile.keys("g"), Some(vec!["zeta", "alpha"]));
        assert_eq!(keyfile.get("g", "zeta"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn to_data_separates_groups() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("a", "k", "v").unwrap();
        keyfile.set_string_list("b", "list", &["x", "y"]).unwrap();

        assert_eq!(keyfile.to_data(), "[a]\nk=v\n\n[b]\nlist=x;y;\n");
    }

    #[test]
    fn scalar_with_separator_stays_scalar() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("g", "k", "left;right").unwrap();

        let data = keyfile.to_data();
        assert!(data.contains("k=left\\;right\n"), "got: {}", data);

        let reloaded = KeyFile::parse(&data).unwrap();
        assert_eq!(reloaded.get("g", "k"), Some(&["left;right".to_string()][..]));
    }

    #[test]
    fn escapes_special_characters() {
        let mut keyfile = KeyFile::new();
        keyfile
            .set_string("g", "k", " leading space\nnew\tline\\slash\r")
            .unwrap();

        let data = keyfile.to_data();
        assert_eq!(data, "[g]\nk=\\sleading space\\nnew\\tline\\\\slash\\r\n");
        assert_eq!(KeyFile::parse(&data).unwrap(), keyfile);
    }

    #[test]
    fn empty_list_is_written_as_empty_value() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string_list::<&str>("g", "k", &[]).unwrap();

        assert_eq!(keyfile.to_data(), "[g]\nk=\n");

        let reloaded = KeyFile::parse(&keyfile.to_data()).unwrap();
        assert_eq!(reloaded.get("g", "k"), Some(&[][..]));
    }

    #[test]
    fn list_of_empty_strings() {
        let reloaded = KeyFile::parse("[g]\nk=;;\n").unwrap();
        assert_eq!(
            reloaded.get("g", "k"),
            Some(&[String::new(), String::new()][..])
        );
    }

    #[test]
    fn list_without_trailing_separator() {
        let keyfile = KeyFile::parse("[g]\nk=a;b\n").unwrap();
        assert_eq!(
            keyfile.get("g", "k"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn duplicate_group_headers_merge() {
        let keyfile = KeyFile::parse("[g]\na=1\nb=2\n[h]\nc=3\n[g]\na=9\n").unwrap();

        assert_eq!(keyfile.groups().count(), 2);
        assert_eq!(keyfile.keys("g"), Some(vec!["a", "b"]));
        assert_eq!(keyfile.get("g", "a"), Some(&["9".to_string()][..]));
    }

    #[test]
    fn crlf_line_endings() {
        let keyfile = KeyFile::parse("[g]\r\nk=v\r\n").unwrap();
        assert_eq!(keyfile.get("g", "k"), Some(&["v".to_string()][..]));
    }

    #[test]
    fn entry_before_group_is_an_error() {
        let err = KeyFile::parse("k=v\n[g]\n").unwrap_err();
        assert!(matches!(err, KeyFileError::Parse { line: 1, .. }), "{:?}", err);
    }

    #[test]
    fn garbage_line_is_an_error() {
        let err = KeyFile::parse("[g]\nk=v\nnot an entry\n").unwrap_err();
        match err {
            KeyFileError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("key=value"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unterminated_header_is_an_error() {
        assert!(matches!(
            KeyFile::parse("[g\n"),
            Err(KeyFileError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn invalid_escape_is_an_error() {
        let err = KeyFile::parse("[g]\nk=bad\\q\n").unwrap_err();
        assert!(err.to_string().contains("invalid escape"), "{}", err);

        let err = KeyFile::parse("[g]\nk=dangling\\\n").unwrap_err();
        assert!(err.to_string().contains("end of value"), "{}", err);
    }

    #[test]
    fn remove_key_reports_missing_group_and_key() {
        let mut keyfile = KeyFile::new();
        assert_eq!(
            keyfile.remove_key("g", "k"),
            Err(KeyFileError::GroupNotFound("g".into()))
        );

        keyfile.set_string("g", "k", "v").unwrap();
        keyfile.remove_key("g", "k").expect("remove existing");
        assert_eq!(
            keyfile.remove_key("g", "k"),
            Err(KeyFileError::KeyNotFound {
                group: "g".into(),
                key: "k".into()
            })
        );
    }

    #[test]
    fn get_string_list_reports_missing_entries() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string_list("g", "k", &["a", "b"]).unwrap();

        assert_eq!(keyfile.get_string_list("g", "k"), Ok(vec!["a".into(), "b".into()]));
        assert_eq!(
            keyfile.get_string_list("other", "k"),
            Err(KeyFileError::GroupNotFound("other".into()))
        );
        assert!(matches!(
            keyfile.get_string_list("g", "missing"),
            Err(KeyFileError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn removing_last_key_keeps_group() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("g", "k", "v").unwrap();
        keyfile.remove_key("g", "k").unwrap();

        assert!(keyfile.has_group("g"));
        assert_eq!(keyfile.keys("g"), Some(vec![]));
        assert_eq!(keyfile.to_data(), "[g]\n");
    }

    #[test]
    fn remove_group() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("g", "k", "v").unwrap();
        keyfile.remove_group("g").unwrap();

        assert!(keyfile.is_empty());
        assert!(matches!(
            keyfile.remove_group("g"),
            Err(KeyFileError::GroupNotFound(_))
        ));
    }

    #[test]
    fn rejects_unrepresentable_names() {
        let mut keyfile = KeyFile::new();
        assert!(matches!(
            keyfile.set_string("bad]name", "k", "v"),
            Err(KeyFileError::InvalidGroupName(_))
        ));
        assert!(matches!(
            keyfile.set_string("", "k", "v"),
            Err(KeyFileError::InvalidGroupName(_))
        ));
        assert!(matches!(
            keyfile.set_string("g", "a=b", "v"),
            Err(KeyFileError::InvalidKey(_))
        ));
        assert!(matches!(
            keyfile.set_string("g", " padded", "v"),
            Err(KeyFileError::InvalidKey(_))
        ));
        assert!(matches!(
            keyfile.set_string("g", "#comment", "v"),
            Err(KeyFileError::InvalidKey(_))
        ));
        assert!(keyfile.is_empty());
    }

    #[test]
    fn group_names_may_contain_spaces_and_dots() {
        let mut keyfile = KeyFile::new();
        keyfile.set_string("My Documents.desktop", "k", "v").unwrap();

        let reloaded = KeyFile::parse(&keyfile.to_data()).unwrap();
        assert!(reloaded.has_key("My Documents.desktop", "k"));
    }
}
