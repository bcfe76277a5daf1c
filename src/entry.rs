//! Entry model and manifest parsing.
//!
//! The blog manifest is a JSON array of records, one per posting, each
//! carrying a block per language:
//!
//! ```json
//! [
//!   {
//!     "id": "a1",
//!     "languages": {
//!       "en": { "title": "Hello", "destination_path": "hello", "authors": ["jd"] },
//!       "de": { "title": "Hallo", "destination_path": "hallo" }
//!     }
//!   }
//! ]
//! ```
//!
//! An [`Entry`] is the in-memory form of one such block for one language.
//! Entries have no durable identity across runs — they are rebuilt from the
//! manifest on every invocation, and their identity is the `(language, id)`
//! pair. Temporal metadata (publish date, modification date, content digest)
//! is owned by the ledger; entries carry a copy for the duration of one run.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("entry '{id}' has no title for language '{language}'")]
    MissingTitle { id: String, language: Language },
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The two locales the blog publishes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
}

impl Language {
    /// All supported languages, in the order collections are built.
    pub const ALL: [Language; 2] = [Language::De, Language::En];

    /// Lowercase locale code as used in paths and the manifest.
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    /// The respectively other supported language.
    pub fn other(&self) -> Language {
        match self {
            Language::De => Language::En,
            Language::En => Language::De,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One manifest record: an entry id plus its per-language blocks.
///
/// Blocks are keyed by locale code strings rather than [`Language`] so that
/// a manifest mentioning an unsupported locale still parses; such blocks are
/// simply never looked up.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRecord {
    pub id: String,
    pub languages: BTreeMap<String, Localization>,
}

/// The per-language block of a manifest record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Localization {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub destination_path: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// One localized blog posting.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub language: Language,
    pub title: String,
    pub subtitle: Option<String>,
    /// Language-prefixed relative path, e.g. `/en/hello.html`.
    pub destination_path: String,
    pub authors: Vec<String>,
    /// Destination paths of this entry's counterparts in other languages.
    pub other_paths: BTreeMap<Language, String>,
    /// First-publication instant. Unset until the ledger is merged in.
    pub pubdate: Option<DateTime<Utc>>,
    /// Last content change, absent if never modified since publication.
    pub moddate: Option<DateTime<Utc>>,
    /// Hex digest of the source file, empty until reconciled.
    pub digest: String,
}

impl Entry {
    /// Build an entry from one manifest block for one language.
    ///
    /// The title is the only mandatory field besides the id; a missing or
    /// empty title is a manifest authoring error and fails the whole run.
    ///
    /// A record without a `destination_path` produces the degenerate path
    /// `/{lang}/.html`. That too is a manifest authoring error, but one for
    /// the caller to catch — the parser preserves it as documented behavior.
    pub fn build(
        id: &str,
        language: Language,
        block: &Localization,
    ) -> Result<Entry, ManifestError> {
        let title = match block.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(ManifestError::MissingTitle {
                    id: id.to_string(),
                    language,
                });
            }
        };

        Ok(Entry {
            id: id.to_string(),
            language,
            title,
            subtitle: block.subtitle.clone(),
            destination_path: destination_path(language, block.destination_path.as_deref()),
            authors: block.authors.clone(),
            other_paths: BTreeMap::new(),
            pubdate: None,
            moddate: None,
            digest: String::new(),
        })
    }

    /// Record where this entry lives in another language's tree.
    pub fn set_cross_language_link(&mut self, language: Language, path: String) {
        self.other_paths.insert(language, path);
    }
}

/// Full destination path for an entry: `/{lang}/{stem}.html`.
pub fn destination_path(language: Language, stem: Option<&str>) -> String {
    format!("/{}/{}.html", language.code(), stem.unwrap_or_default())
}

/// Parse the manifest payload (a JSON array of records).
pub fn parse_manifest(payload: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
    Ok(serde_json::from_str(payload)?)
}
