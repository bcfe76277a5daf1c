//! The publication/modification-date ledger.
//!
//! `pubdates.json` is the single source of truth for when an entry was first
//! published and when its content last changed. The manifest says nothing
//! about dates — entries are assigned a publication instant the first time a
//! build encounters them, and a modification instant whenever their source
//! file's content digest changes. Both survive across runs through this
//! ledger.
//!
//! # On-disk format
//!
//! A JSON array of records in the fixed field order
//! `{language, id, pubdate, md5, moddate}`:
//!
//! ```json
//! [
//!   {
//!     "language": "en",
//!     "id": "a1",
//!     "pubdate": "2024-05-03T09:12:44Z",
//!     "md5": "5eb63bbbe01eeed093cb22bb8f5acdc3",
//!     "moddate": null
//!   }
//! ]
//! ```
//!
//! Timestamps must be ISO-8601 in either the `Z`-suffixed UTC form or the
//! explicit-offset `±HHMM` form. Anything else fails the load: a corrupt
//! ledger aborts the run instead of being silently partially ignored (the
//! predecessor tool logged and skipped such records, which let corruption
//! hide — that tolerance is deliberately gone).
//!
//! Record order within a language is not significant and not guaranteed to
//! be stable across runs; all lookups go by `(language, id)`.
//!
//! # Concurrency
//!
//! The ledger is read once at the start of a run and written once at the
//! end. Two simultaneous runs racing on the file are not guarded against —
//! known limitation. The save goes through a temp file in the same directory
//! plus a rename, so a crashing run never truncates the previous ledger.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::Language;
use crate::fingerprint;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("malformed timestamp in ledger: '{0}' (expected ISO-8601 'Z' or ±HHMM form)")]
    MalformedTimestamp(String),
    #[error("no ledger record for entry '{id}' in language '{language}'")]
    EntryNotFound { language: Language, id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Temporal metadata for one `(language, id)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub language: Language,
    pub id: String,
    pub pubdate: DateTime<Utc>,
    /// Hex digest of the entry's source bytes at last reconciliation.
    /// Empty for records predating hash tracking.
    pub digest: String,
    /// Unset means "never modified since publication".
    pub moddate: Option<DateTime<Utc>>,
}

/// Serialization twin of [`LedgerRecord`]. Field order here is the on-disk
/// field order.
#[derive(Serialize, Deserialize)]
struct RawRecord {
    language: Language,
    id: String,
    pubdate: String,
    md5: String,
    #[serde(default)]
    moddate: Option<String>,
}

/// Parse a ledger timestamp: `%Y-%m-%dT%H:%M:%SZ` or `%Y-%m-%dT%H:%M:%S±HHMM`.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, LedgerError> {
    if let Some(naive) = s.strip_suffix('Z')
        && let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S")
    {
        return Ok(dt.and_utc());
    }
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| LedgerError::MalformedTimestamp(s.to_string()))
}

/// Render a timestamp in the convention the ledger is written in.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl LedgerRecord {
    fn from_raw(raw: RawRecord) -> Result<LedgerRecord, LedgerError> {
        let moddate = match raw.moddate.as_deref() {
            None | Some("") => None,
            Some(s) => Some(parse_timestamp(s)?),
        };
        Ok(LedgerRecord {
            language: raw.language,
            id: raw.id,
            pubdate: parse_timestamp(&raw.pubdate)?,
            digest: raw.md5,
            moddate,
        })
    }

    fn to_raw(&self) -> RawRecord {
        RawRecord {
            language: self.language,
            id: self.id.clone(),
            pubdate: format_timestamp(&self.pubdate),
            md5: self.digest.clone(),
            moddate: self.moddate.as_ref().map(format_timestamp),
        }
    }
}

/// In-memory ledger: per-language ordered sequences of records.
///
/// Lookups are linear scans — fine at catalog scale (tens to low hundreds of
/// entries), not meant for more.
#[derive(Debug, Default)]
pub struct PubdateLedger {
    records: BTreeMap<Language, Vec<LedgerRecord>>,
}

impl PubdateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ledger file.
    ///
    /// A missing or zero-length file is the first-run state and loads as an
    /// empty ledger. Present-but-malformed content — bad JSON or a timestamp
    /// matching neither accepted form — is fatal.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: Vec<RawRecord> = serde_json::from_str(&content)?;
        let mut ledger = Self::new();
        for r in raw {
            let record = LedgerRecord::from_raw(r)?;
            ledger.records.entry(record.language).or_default().push(record);
        }
        Ok(ledger)
    }

    /// Save every record across every language.
    ///
    /// Written to a temp file next to the target, then renamed over it, so
    /// the previous ledger survives a crash mid-write.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let raw: Vec<RawRecord> = self
            .records
            .values()
            .flatten()
            .map(LedgerRecord::to_raw)
            .collect();
        let json = serde_json::to_string_pretty(&raw)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Tolerant lookup — `None` on miss.
    pub fn lookup(&self, language: Language, id: &str) -> Option<&LedgerRecord> {
        self.records
            .get(&language)?
            .iter()
            .find(|r| r.id == id)
    }

    /// Strict lookup — [`LedgerError::EntryNotFound`] on miss.
    pub fn require(&self, language: Language, id: &str) -> Result<&LedgerRecord, LedgerError> {
        self.lookup(language, id)
            .ok_or_else(|| LedgerError::EntryNotFound {
                language,
                id: id.to_string(),
            })
    }

    /// Assign a publication date to a first-seen entry.
    ///
    /// Creates a record with `pubdate = now` and an empty digest when no
    /// record exists for the key. Idempotent — once the record exists,
    /// further calls within (or across) runs change nothing.
    pub fn ensure_pubdate(&mut self, language: Language, id: &str) {
        if self.lookup(language, id).is_some() {
            return;
        }
        self.records.entry(language).or_default().push(LedgerRecord {
            language,
            id: id.to_string(),
            pubdate: Utc::now(),
            digest: String::new(),
            moddate: None,
        });
    }

    /// Detect a content change and stamp the modification date.
    ///
    /// Digests the raw source bytes. If the stored digest is non-empty and
    /// differs, the entry's content changed: `moddate = now`. The stored
    /// digest is always overwritten with the fresh one — in particular,
    /// recording the first digest for a new entry (or a legacy record that
    /// never had one) is not a modification and sets no moddate.
    pub fn reconcile_moddate(
        &mut self,
        language: Language,
        id: &str,
        source_bytes: &[u8],
    ) -> Result<(), LedgerError> {
        let fresh = fingerprint::digest(source_bytes);
        let record = self
            .records
            .get_mut(&language)
            .and_then(|v| v.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| LedgerError::EntryNotFound {
                language,
                id: id.to_string(),
            })?;

        if !record.digest.is_empty() && record.digest != fresh {
            record.moddate = Some(Utc::now());
        }
        record.digest = fresh;
        Ok(())
    }

    /// Replace the record for the `(language, id)` pair, or append it.
    pub fn upsert(&mut self, record: LedgerRecord) {
        let records = self.records.entry(record.language).or_default();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Total record count across languages.
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
