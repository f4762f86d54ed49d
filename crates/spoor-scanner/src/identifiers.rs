//! Candidate identifier derivation and filtering.
//!
//! Turns an incoming event into the usernames worth probing, and drops
//! candidates too common to attribute to a single person.

use crate::error::{Result, ScanError};
use spoor_core::{EventKind, IdentifierConfig};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const BUILTIN_NAMES: &str = include_str!("../dicts/first_names.txt");
const BUILTIN_WORDS: &str = include_str!("../dicts/english_words.txt");

/// Derives and filters candidate usernames.
#[derive(Debug, Clone, Default)]
pub struct IdentifierDeriver {
    user_from_email: bool,
    generic_users: HashSet<String>,
    names: Option<HashSet<String>>,
    words: Option<HashSet<String>>,
    internet_tlds: Vec<String>,
}

impl IdentifierDeriver {
    /// Build a deriver from configuration.
    ///
    /// A dictionary is consulted when its `ignore_*` flag is set. It is read
    /// from the configured path, or taken from the built-in list when no
    /// path is set.
    ///
    /// # Errors
    /// Returns `ScanError::Dictionary` if a configured dictionary cannot be read.
    pub fn from_config(config: &IdentifierConfig) -> Result<Self> {
        let names = match (&config.name_dict_path, config.ignore_name_dict) {
            (Some(path), true) => Some(load_dictionary(path)?),
            (None, true) => Some(parse_dictionary(BUILTIN_NAMES)),
            (_, false) => None,
        };
        let words = match (&config.word_dict_path, config.ignore_word_dict) {
            (Some(path), true) => Some(load_dictionary(path)?),
            (None, true) => Some(parse_dictionary(BUILTIN_WORDS)),
            (_, false) => None,
        };

        Ok(Self {
            user_from_email: config.user_from_email,
            generic_users: config
                .generic_users
                .iter()
                .map(|user| user.trim().to_lowercase())
                .collect(),
            names,
            words,
            internet_tlds: config.internet_tlds.clone(),
        })
    }

    /// Replace the first-name dictionary.
    #[must_use]
    pub fn with_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the word dictionary.
    #[must_use]
    pub fn with_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.words = Some(words.into_iter().map(Into::into).collect());
        self
    }

    /// Candidate identifiers for an event, deduplicated in first-seen order.
    ///
    /// Candidates are not filtered here; see [`IdentifierDeriver::accept`].
    #[must_use]
    pub fn derive(&self, kind: EventKind, data: &str) -> Vec<String> {
        let candidates = match kind {
            EventKind::EmailAddr if self.user_from_email => data
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(|local| vec![local.to_lowercase()])
                .unwrap_or_default(),
            EventKind::HumanName => {
                let name = data.to_lowercase();
                vec![name.replace(' ', ""), name.replace(' ', ".")]
            }
            EventKind::DomainName => domain_keyword(data, &self.internet_tlds)
                .into_iter()
                .collect(),
            EventKind::Username => vec![data.to_string()],
            _ => Vec::new(),
        };

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect()
    }

    /// Whether a candidate is specific enough to probe.
    #[must_use]
    pub fn accept(&self, candidate: &str) -> bool {
        if self.generic_users.contains(candidate) {
            debug!(candidate, "generic account name, skipping");
            return false;
        }

        if self.names.as_ref().is_some_and(|names| names.contains(candidate)) {
            debug!(candidate, "found in name dictionary, skipping");
            return false;
        }

        if self.words.as_ref().is_some_and(|words| words.contains(candidate)) {
            debug!(candidate, "found in word dictionary, skipping");
            return false;
        }

        true
    }
}

/// The registrable keyword of `domain`: the label just left of the longest
/// suffix in `tlds`.
///
/// `www.example.co.uk` with suffixes `uk` and `co.uk` yields `example`.
/// Returns `None` when no suffix matches or nothing precedes it.
#[must_use]
pub fn domain_keyword(domain: &str, tlds: &[String]) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();

    let suffix = tlds
        .iter()
        .map(|tld| tld.trim().trim_start_matches('.').to_lowercase())
        .filter(|tld| !tld.is_empty() && domain.ends_with(&format!(".{tld}")))
        .max_by_key(String::len)?;

    let rest = &domain[..domain.len() - suffix.len() - 1];
    rest.rsplit('.')
        .next()
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
}

fn load_dictionary(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::Dictionary {
        path: path.display().to_string(),
        source,
    })?;

    let entries = parse_dictionary(&content);
    debug!(path = %path.display(), entries = entries.len(), "loaded dictionary");
    Ok(entries)
}

/// One lowercase entry per line; blank lines and `#` comments are skipped.
fn parse_dictionary(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn deriver() -> IdentifierDeriver {
        IdentifierDeriver::from_config(&IdentifierConfig::default()).expect("default deriver")
    }

    fn tlds(list: &[&str]) -> Vec<String> {
        list.iter().map(|tld| (*tld).to_string()).collect()
    }

    #[test]
    fn test_email_yields_lowercase_local_part() {
        assert_eq!(
            deriver().derive(EventKind::EmailAddr, "J.Smith@example.com"),
            vec!["j.smith"]
        );
    }

    #[test]
    fn test_email_ignored_when_disabled() {
        let config = IdentifierConfig {
            user_from_email: false,
            ..IdentifierConfig::default()
        };
        let deriver = IdentifierDeriver::from_config(&config).expect("deriver");
        assert!(deriver.derive(EventKind::EmailAddr, "bob@example.com").is_empty());
    }

    #[test]
    fn test_human_name_yields_two_forms() {
        assert_eq!(
            deriver().derive(EventKind::HumanName, "Jane Doe"),
            vec!["janedoe", "jane.doe"]
        );
    }

    #[test]
    fn test_single_word_name_deduplicated() {
        assert_eq!(deriver().derive(EventKind::HumanName, "Plato"), vec!["plato"]);
    }

    #[test]
    fn test_username_passes_through_unchanged() {
        assert_eq!(
            deriver().derive(EventKind::Username, "MixedCase"),
            vec!["MixedCase"]
        );
    }

    #[test]
    fn test_account_events_derive_nothing() {
        assert!(deriver()
            .derive(EventKind::AccountExternalOwned, "GitHub")
            .is_empty());
    }

    #[test]
    fn test_domain_keyword_uses_longest_suffix() {
        let list = tlds(&["uk", "co.uk", "com"]);
        assert_eq!(
            domain_keyword("www.example.co.uk", &list).as_deref(),
            Some("example")
        );
        assert_eq!(domain_keyword("example.com.", &list).as_deref(), Some("example"));
        assert_eq!(domain_keyword("co.uk", &list).as_deref(), Some("co"));
    }

    #[test]
    fn test_domain_keyword_without_match() {
        let list = tlds(&["com"]);
        assert_eq!(domain_keyword("example.invalid", &list), None);
        assert_eq!(domain_keyword("com", &list), None);
    }

    #[test]
    fn test_generic_users_rejected() {
        let deriver = deriver();
        assert!(!deriver.accept("admin"));
        assert!(deriver.accept("zx81fan"));
    }

    #[test]
    fn test_dictionaries_reject_common_entries() {
        let deriver = deriver().with_names(["jane"]).with_words(["table"]);
        assert!(!deriver.accept("jane"));
        assert!(!deriver.accept("table"));
        assert!(deriver.accept("janedoe"));
    }

    #[test]
    fn test_dictionary_loaded_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# first names\nJane\n\n  Bob  ").expect("write dictionary");

        let config = IdentifierConfig {
            name_dict_path: Some(file.path().to_path_buf()),
            ..IdentifierConfig::default()
        };
        let deriver = IdentifierDeriver::from_config(&config).expect("deriver");

        assert!(!deriver.accept("jane"));
        assert!(!deriver.accept("bob"));
        assert!(deriver.accept("# first names"));
    }

    #[test]
    fn test_builtin_dictionaries_used_by_default() {
        let deriver = deriver();
        assert!(!deriver.accept("jane"));
        assert!(!deriver.accept("michael"));
        assert!(!deriver.accept("table"));
        assert!(!deriver.accept("sunny"));
        assert!(deriver.accept("jane.doe"));
        assert!(deriver.accept("bob.smith"));
    }

    #[test]
    fn test_builtin_dictionaries_off_when_disabled() {
        let config = IdentifierConfig {
            ignore_name_dict: false,
            ignore_word_dict: false,
            ..IdentifierConfig::default()
        };
        let deriver = IdentifierDeriver::from_config(&config).expect("deriver");
        assert!(deriver.accept("jane"));
        assert!(deriver.accept("table"));
    }

    #[test]
    fn test_builtin_lists_skip_comments() {
        let names = parse_dictionary(BUILTIN_NAMES);
        assert!(names.len() > 200);
        assert!(names.iter().all(|name| !name.starts_with('#')));
    }

    #[test]
    fn test_disabled_dictionary_not_loaded() {
        let config = IdentifierConfig {
            ignore_word_dict: false,
            word_dict_path: Some("/nonexistent/words.txt".into()),
            ..IdentifierConfig::default()
        };
        assert!(IdentifierDeriver::from_config(&config).is_ok());
    }

    #[test]
    fn test_missing_dictionary_is_an_error() {
        let config = IdentifierConfig {
            name_dict_path: Some("/nonexistent/names.txt".into()),
            ..IdentifierConfig::default()
        };
        assert!(matches!(
            IdentifierDeriver::from_config(&config),
            Err(ScanError::Dictionary { .. })
        ));
    }
}
