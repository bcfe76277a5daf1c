//! Shared test utilities for the simple-blog test suite.
//!
//! Builders for the small fixtures the module tests keep needing: parsed
//! manifest records, entries with a known publish date, and strict-format
//! timestamps.

use chrono::{DateTime, Utc};

use crate::entry::{Entry, Language, ManifestRecord};
use crate::ledger::parse_timestamp;

/// Parse a strict-format timestamp, panicking on bad test input.
pub fn ts(s: &str) -> DateTime<Utc> {
    parse_timestamp(s).unwrap_or_else(|e| panic!("bad test timestamp '{s}': {e}"))
}

/// Parse a manifest JSON payload, panicking on bad test input.
pub fn manifest_records(json: &str) -> Vec<ManifestRecord> {
    crate::entry::parse_manifest(json).unwrap_or_else(|e| panic!("bad test manifest: {e}"))
}

/// An entry with a publish date set, destination `/{lang}/{id}.html`.
pub fn dated_entry(id: &str, language: Language, title: &str, pubdate: &str) -> Entry {
    Entry {
        id: id.to_string(),
        language,
        title: title.to_string(),
        subtitle: None,
        destination_path: crate::entry::destination_path(language, Some(id)),
        authors: vec![],
        other_paths: Default::default(),
        pubdate: Some(ts(pubdate)),
        moddate: None,
        digest: String::new(),
    }
}
