//! Site definition types and feed deserialization.
//!
//! A site definition describes how to check one external service for an
//! account: the URL to fetch and what the response must look like when the
//! account exists.

use serde::{Deserialize, Deserializer, Serialize};
use spoor_core::Identifier;

/// Placeholder in `check_uri` replaced by the probed identifier.
pub const ACCOUNT_PLACEHOLDER: &str = "{account}";

/// One probeable site from the catalog feed.
///
/// Definitions are immutable once loaded; probe workers share them through
/// `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Site name, unique within a catalog
    pub name: String,

    /// Site category (e.g. "social", "coding")
    #[serde(default)]
    pub category: String,

    /// URL template containing the `{account}` placeholder
    #[serde(rename = "check_uri")]
    pub check_url_template: String,

    /// Whether the feed marks this definition as working
    #[serde(rename = "valid", default)]
    pub usable: bool,

    /// Status code returned when the account exists
    #[serde(
        rename = "account_existence_code",
        default,
        deserialize_with = "deserialize_status"
    )]
    pub expected_status: Option<u16>,

    /// Text present in the page when the account exists
    #[serde(rename = "account_existence_string", default)]
    pub expected_body: Option<String>,
}

impl SiteDefinition {
    /// URL to fetch when checking `identifier` on this site.
    #[must_use]
    pub fn check_url(&self, identifier: &Identifier) -> String {
        self.check_url_template
            .replace(ACCOUNT_PLACEHOLDER, identifier.as_str())
    }

    /// Display label for an outcome on this site, naming the checked URL.
    #[must_use]
    pub fn label(&self, url: &str) -> String {
        format!("{} (Category: {})\n{url}", self.name, self.category)
    }
}

/// Raw feed entry before usability filtering.
///
/// `check_uri` is optional here so one malformed entry does not reject the
/// whole feed.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedEntry {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub check_uri: Option<String>,
    #[serde(default)]
    pub valid: bool,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub account_existence_code: Option<u16>,
    #[serde(default)]
    pub account_existence_string: Option<String>,
}

impl FeedEntry {
    /// Convert into a definition, if the entry is usable and probeable.
    pub(crate) fn into_definition(self) -> Option<SiteDefinition> {
        if !self.valid {
            return None;
        }

        let Some(check_url_template) = self.check_uri else {
            tracing::debug!(site = %self.name, "skipping site without check_uri");
            return None;
        };

        Some(SiteDefinition {
            name: self.name,
            category: self.category,
            check_url_template,
            usable: true,
            expected_status: self.account_existence_code,
            expected_body: self.account_existence_string,
        })
    }
}

/// Top-level feed document.
#[derive(Debug, Deserialize)]
pub(crate) struct Feed {
    pub sites: Vec<FeedEntry>,
}

/// Accept a status code as a JSON number or a numeric string.
///
/// Unparsable strings become `None`, which never matches a response.
fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStatus {
        Number(u16),
        Text(String),
    }

    Ok(match Option::<RawStatus>::deserialize(deserializer)? {
        Some(RawStatus::Number(code)) => Some(code),
        Some(RawStatus::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
