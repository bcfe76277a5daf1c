//! Per-language entry collections.
//!
//! An [`EntryCollection`] holds all entries of one language, in manifest
//! order until explicitly sorted. It is built fresh each run, has the ledger
//! merged into it, resolves cross-language links against the other
//! language's collection, hands sorted views to the rendering layer, and
//! finally writes its entries' temporal metadata back into the ledger for
//! persistence.

use crate::entry::{Entry, Language, ManifestError, ManifestRecord};
use crate::ledger::{LedgerRecord, PubdateLedger};

/// All entries of one language.
#[derive(Debug)]
pub struct EntryCollection {
    pub language: Language,
    entries: Vec<Entry>,
}

impl EntryCollection {
    /// Build the collection for one language from the manifest.
    ///
    /// Records without a localization block for this language are skipped —
    /// not every posting exists in both languages. A block that exists but
    /// lacks a title fails the whole run: a manifest authoring error must
    /// stop the build, not silently drop the entry.
    pub fn from_manifest(
        records: &[ManifestRecord],
        language: Language,
    ) -> Result<Self, ManifestError> {
        let mut entries = Vec::new();
        for record in records {
            let Some(block) = record.languages.get(language.code()) else {
                continue;
            };
            entries.push(Entry::build(&record.id, language, block)?);
        }
        Ok(EntryCollection { language, entries })
    }

    /// Entry with the given id, if present.
    pub fn by_id(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn by_id_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Copy publish/modified/digest values from the ledger onto entries.
    ///
    /// Entries without a ledger record keep unset dates; the orchestrator
    /// runs the ensure step afterwards (in manifest order) and merges again.
    /// Ledger records without a matching entry are left alone — a posting
    /// removed from the manifest keeps its history.
    pub fn merge_ledger(&mut self, ledger: &PubdateLedger) {
        for entry in &mut self.entries {
            if let Some(record) = ledger.lookup(self.language, &entry.id) {
                entry.pubdate = Some(record.pubdate);
                entry.moddate = record.moddate;
                entry.digest = record.digest.clone();
            }
        }
    }

    /// Record, for every shared id, where the other collection's entry lives.
    ///
    /// Ids present only in `other` are benign no-ops — cross-language
    /// linkage is optional per entry.
    pub fn add_cross_language_links(&mut self, other: &EntryCollection) {
        for other_entry in &other.entries {
            if let Some(entry) = self.by_id_mut(&other_entry.id) {
                entry.set_cross_language_link(
                    other_entry.language,
                    other_entry.destination_path.clone(),
                );
            }
        }
    }

    /// Sort entries by publish date, ascending, in place.
    ///
    /// The sort is stable: ties keep their manifest order, so repeated runs
    /// over unchanged input produce identical page assignments. Entries that
    /// have not been through reconciliation (no pubdate) sort first.
    pub fn sort_by_date(&mut self) {
        self.entries.sort_by_key(|e| e.pubdate);
    }

    /// Entries sorted by publish date, most recent first.
    ///
    /// Stable like [`sort_by_date`](Self::sort_by_date): ties stay in
    /// manifest order, not reversed.
    pub fn by_date_desc(&self) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.pubdate.cmp(&a.pubdate));
        sorted
    }

    /// The `n` most recently published entries.
    pub fn latest(&self, n: usize) -> Vec<&Entry> {
        let mut latest = self.by_date_desc();
        latest.truncate(n);
        latest
    }

    /// Upsert one ledger record per entry with the entry's current values.
    ///
    /// This is how newly assigned publish dates and updated digests flow
    /// back for persistence. Entries without a pubdate have not been through
    /// the ensure step and are skipped.
    pub fn write_back(&self, ledger: &mut PubdateLedger) {
        for entry in &self.entries {
            let Some(pubdate) = entry.pubdate else {
                continue;
            };
            ledger.upsert(LedgerRecord {
                language: entry.language,
                id: entry.id.clone(),
                pubdate,
                digest: entry.digest.clone(),
                moddate: entry.moddate,
            });
        }
    }

    /// Entries in their current order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
