//! Shared types used across Spoor.
//!
//! Newtypes and enums for the values that cross crate boundaries: the
//! identifiers being probed and the events flowing in and out of the finder.

use crate::error::SpoorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Candidate account identifier (a username) to probe the catalog with.
///
/// Identifiers must be 1-256 characters with no whitespace and none of the
/// characters that would change the shape of a check URL (`/ ? # & { }`).
/// Case is preserved: derived identifiers arrive lowercased, but usernames
/// supplied directly are probed as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    /// Create a new `Identifier` from a string.
    ///
    /// # Errors
    /// Returns error if the identifier is empty, too long or contains
    /// characters that cannot be placed into a URL path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, SpoorError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first `.`, if the identifier has one.
    #[must_use]
    pub fn dotted_prefix(&self) -> Option<&str> {
        self.0.split_once('.').map(|(prefix, _)| prefix)
    }

    fn validate(id: &str) -> Result<(), SpoorError> {
        static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = IDENTIFIER_REGEX
            .get_or_init(|| Regex::new(r"^[^\s/?#&{}]+$").expect("valid regex"));

        if id.is_empty() || id.chars().count() > 256 {
            return Err(SpoorError::Validation(format!(
                "invalid identifier: must be 1-256 characters, got {}",
                id.chars().count()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(SpoorError::Validation(format!(
                "invalid identifier: contains whitespace or URL-reserved characters, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kinds of events consumed and produced by the account finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// An e-mail address; its local part is a candidate username
    #[serde(rename = "EMAILADDR")]
    EmailAddr,
    /// A registered domain; its keyword is a candidate username
    DomainName,
    /// A person's name; joined variants are candidate usernames
    HumanName,
    /// A username to probe the catalog with
    Username,
    /// An account discovered on an external site
    AccountExternalOwned,
}

impl EventKind {
    /// Wire name of the event kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailAddr => "EMAILADDR",
            Self::DomainName => "DOMAIN_NAME",
            Self::HumanName => "HUMAN_NAME",
            Self::Username => "USERNAME",
            Self::AccountExternalOwned => "ACCOUNT_EXTERNAL_OWNED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event flowing into or out of the account finder.
///
/// `source` links a derived event back to the event it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderEvent {
    /// Event kind
    pub kind: EventKind,
    /// Event payload (an address, a name, a username or a site label)
    pub data: String,
    /// Name of the module that produced the event
    pub module: String,
    /// Event this one was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Arc<FinderEvent>>,
}

impl FinderEvent {
    /// Create a root event with no source.
    #[must_use]
    pub fn new(kind: EventKind, data: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
            module: module.into(),
            source: None,
        }
    }

    /// Create an event derived from `source`.
    #[must_use]
    pub fn derived(
        kind: EventKind,
        data: impl Into<String>,
        module: impl Into<String>,
        source: Arc<FinderEvent>,
    ) -> Self {
        Self {
            kind,
            data: data.into(),
            module: module.into(),
            source: Some(source),
        }
    }
}
