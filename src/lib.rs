//! # Simple Blog
//!
//! A minimal static site generator for bilingual (German/English) blogs.
//! A JSON manifest is the data source: it names every entry and its
//! per-language metadata, entry bodies live in plain `.html.source` files,
//! and publication history is persisted in a small JSON ledger.
//!
//! # Architecture: One Pass, One Ledger
//!
//! Every invocation is a single batch transform:
//!
//! ```text
//! blog.json ─┬→ EntryCollection (de) ─┐
//!            └→ EntryCollection (en) ─┤
//! pubdates.json → PubdateLedger ──────┼→ reconcile dates → cross-link →
//!                                     │  sort → render pages + feeds
//!                                     └→ pubdates.json (rewritten last)
//! ```
//!
//! The interesting part is the date reconciliation: entries get a stable
//! first-publication timestamp the first time a build sees them, and a
//! modification timestamp only when their source file's content digest
//! actually changes. Both survive across runs through the ledger, which is
//! read once at the start of a run and rewritten once at the end — after
//! every page and feed has been written, so a failed run never persists a
//! ledger inconsistent with the output tree.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`entry`] | `Language`, `Entry`, manifest parsing and the destination-path convention |
//! | [`collection`] | per-language entry sets: ledger merge, cross-links, stable date ordering |
//! | [`ledger`] | the publication/modification-date ledger: strict load, reconciliation, save |
//! | [`fingerprint`] | source-file convention, raw-byte content digest, read validation |
//! | [`generate`] | the build pipeline and Maud page rendering (entry pages, paginated overviews) |
//! | [`feed`] | RSS 2.0 feed per language |
//! | [`config`] | flat `config.toml` run configuration |
//!
//! # Design Decisions
//!
//! ## Manifest-Driven, No Persistent Objects
//!
//! Entries have no durable in-process identity across runs; identity is
//! entirely the `(language, id)` pair. Collections are rebuilt from the
//! manifest every invocation and discarded after rendering. The ledger is
//! the only thing that persists, and entries hold a *copy* of its values
//! for the duration of one run — no shared mutable references.
//!
//! ## Fail-Fast Everywhere
//!
//! A missing title, a malformed ledger timestamp, a missing or empty source
//! file: each aborts the whole run with a descriptive error. This is a build
//! tool invoked by a human or CI job, where a clear failure beats a silently
//! incomplete site. (Earlier incarnations of this tool logged and skipped
//! unparseable ledger records; that tolerance is deliberately gone.) The
//! only expected misses are cross-language links and ledger-merge misses —
//! not every posting exists in both languages.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system: malformed markup is a build error, template variables
//! are Rust expressions, and all interpolation is auto-escaped except the
//! deliberately verbatim entry body.
//!
//! ## Single-Threaded By Design
//!
//! A blog of tens to low hundreds of entries renders in milliseconds;
//! lookups are linear scans and the whole run is one thread. Two
//! simultaneous runs racing on the ledger file are not guarded against —
//! known limitation, documented rather than locked around.

pub mod collection;
pub mod config;
pub mod entry;
pub mod feed;
pub mod fingerprint;
pub mod generate;
pub mod ledger;

#[cfg(test)]
pub(crate) mod test_helpers;
