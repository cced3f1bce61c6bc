//! core::metadata::info
//!
//! Attribute records produced by projecting a metadata group.
//!
//! A [`FileInfo`] is a small, ordered set of named attributes. The store
//! fills one with `metadata::<key>` attributes for every key of a group and
//! hands it to the file object, which decides whether its cached metadata
//! changed.

use serde::Serialize;

/// Namespace prefix for projected metadata attributes.
pub const METADATA_NAMESPACE: &str = "metadata::";

/// Build the attribute name for a metadata key.
///
/// # Example
///
/// ```
/// use caja_metadata::core::metadata::info::attribute_name;
///
/// assert_eq!(attribute_name("icon-position"), "metadata::icon-position");
/// ```
pub fn attribute_name(key: &str) -> String {
    format!("{}{}", METADATA_NAMESPACE, key)
}

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A single string.
    String(String),
    /// An ordered list of strings.
    StringV(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::StringV(_) => None,
        }
    }

    pub fn as_strv(&self) -> Option<&[String]> {
        match self {
            AttributeValue::String(_) => None,
            AttributeValue::StringV(v) => Some(v),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::StringV(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

/// An ordered set of named attributes.
///
/// Equality ignores attribute order: two records are equal when they carry
/// the same names with the same values.
#[derive(Debug, Clone, Default)]
pub struct FileInfo {
    attributes: Vec<(String, AttributeValue)>,
}

impl FileInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attribute_string(&mut self, name: &str, value: &str) {
        self.set_attribute(name, AttributeValue::String(value.to_string()));
    }

    pub fn set_attribute_stringv<S: AsRef<str>>(&mut self, name: &str, values: &[S]) {
        let values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.set_attribute(name, AttributeValue::StringV(values));
    }

    /// Set `name`, replacing any previous value in place.
    pub fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        let idx = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Attributes in the `metadata::` namespace, with the prefix stripped.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.iter()
            .filter_map(|(n, v)| n.strip_prefix(METADATA_NAMESPACE).map(|key| (key, v)))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl PartialEq for FileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.attribute(name) == Some(value))
    }
}

impl Eq for FileInfo {}

impl<N: Into<String>> FromIterator<(N, AttributeValue)> for FileInfo {
    fn from_iter<I: IntoIterator<Item = (N, AttributeValue)>>(iter: I) -> Self {
        let mut info = FileInfo::new();
        for (name, value) in iter {
            info.set_attribute(&name.into(), value);
        }
        info
    }
}
