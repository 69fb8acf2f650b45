use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Stable adapter identifier reported as `source` on every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Wraps an explicitly configured id verbatim.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives an id from a display name: lowercased, with every run of
    /// whitespace collapsed to a single underscore.
    ///
    /// Leading and trailing whitespace is not trimmed; it collapses to an
    /// underscore like any other run.
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut in_whitespace = false;

        for ch in name.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    slug.push('_');
                    in_whitespace = true;
                }
                continue;
            }
            in_whitespace = false;
            slug.extend(ch.to_lowercase());
        }

        Self(slug)
    }

    /// Explicit id when configured and non-empty, otherwise the slug of
    /// `name`.
    pub fn resolve(explicit: Option<&str>, name: &str) -> Self {
        match explicit.filter(|id| !id.is_empty()) {
            Some(id) => Self::new(id),
            None => Self::from_name(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<SourceId> for String {
    fn from(value: SourceId) -> Self {
        value.0
    }
}
