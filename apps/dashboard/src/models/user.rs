use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identity (an email address in practice) used as the partition
/// key across the object store, the match store and the feedback collection.
///
/// The only invariant is non-emptiness. No trimming or format validation is
/// performed; the string is used as-is, including inside storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Returns `None` for the empty string.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage-safe form of the identity: every `@` becomes `_`.
    pub fn sanitized(&self) -> String {
        self.0.replace('@', "_")
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserIdentity {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value).ok_or("user identity must not be empty")
    }
}

impl From<UserIdentity> for String {
    fn from(value: UserIdentity) -> Self {
        value.0
    }
}
