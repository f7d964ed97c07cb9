//! Qualified type names.
//!
//! A [`TypeKey`] is how the rest of the system names a runtime type: a
//! `::`-separated path such as `food::Apple`. Keys are compared as plain
//! strings; hierarchy and category live in the type registry.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Fully-qualified name of a sub-object, container, or interface type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeKey(String);

impl TypeKey {
    /// Creates a key, rejecting empty or whitespace-only names and names
    /// with empty path segments (`"a::"`, `"::b"`).
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.split("::").any(|seg| seg.trim().is_empty()) {
            return Err(Error::InvalidTypeKey(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Creates a key from a compile-time name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid key. Intended for `SubObjectKind`
    /// constants and tests, where the name is a literal.
    #[must_use]
    pub fn from_static(name: &'static str) -> Self {
        match Self::new(name) {
            Ok(key) => key,
            Err(_) => panic!("invalid static type key: {name:?}"),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, used as the default display name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Everything before the last path segment, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once("::").map(|(ns, _)| ns)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TypeKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeKey> for String {
    fn from(key: TypeKey) -> Self {
        key.0
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
