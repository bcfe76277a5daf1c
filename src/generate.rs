//! The single-pass build pipeline and HTML rendering.
//!
//! [`build_site`] is the whole run: manifest → per-language collections →
//! ledger reconciliation → cross-links → sorted rendering → ledger
//! write-back. There is no partial-success mode; any failure aborts before
//! the ledger file is touched, so a failed run never persists a ledger
//! inconsistent with partially-written pages.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── de/
//! │   └── hallo.html               # Entry pages at their destination paths
//! ├── en/
//! │   └── hello.html
//! ├── overview/
//! │   ├── blog-en.html             # Overview page 1 (no suffix)
//! │   ├── blog-en_2.html           # Pages 2..n carry their page number
//! │   └── blog-de.html
//! ├── de.rss                       # One feed per language
//! └── en.rss
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping; only the
//! entry body — authored HTML from the source file — is injected unescaped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use thiserror::Error;

use crate::collection::EntryCollection;
use crate::config::BlogConfig;
use crate::entry::{self, Entry, Language, ManifestError};
use crate::feed::{self, FeedMeta};
use crate::fingerprint::{self, SourceError, SourceFile};
use crate::ledger::{LedgerError, PubdateLedger};

/// Postings per overview page.
const ENTRIES_PER_PAGE: usize = 5;

/// Entries shown in the latest-postings sidebar.
const LATEST_COUNT: usize = 3;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// What a build run produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub entry_pages: usize,
    pub overview_pages: usize,
    pub feeds: usize,
    pub ledger_records: usize,
}

/// What a check run validated.
#[derive(Debug)]
pub struct CheckReport {
    /// Entry count per language, in [`Language::ALL`] order.
    pub entries: Vec<(Language, usize)>,
    pub ledger_records: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full build: reconcile dates, render all pages and feeds, persist
/// the ledger.
pub fn build_site(config: &BlogConfig) -> Result<BuildSummary, GenerateError> {
    let (mut collections, mut ledger, sources) = reconcile(config)?;

    // Cross-link the two collections both directions, then fix the ordering
    // every page derives from.
    {
        let (first, rest) = collections.split_at_mut(1);
        first[0].add_cross_language_links(&rest[0]);
        rest[0].add_cross_language_links(&first[0]);
    }
    for collection in &mut collections {
        collection.sort_by_date();
    }

    create_output_tree(&config.output_dir)?;

    let meta = FeedMeta {
        title: config.title.clone(),
        description: config.description.clone(),
        base_url: config.base_url.clone(),
    };

    let mut summary = BuildSummary::default();
    for collection in &collections {
        summary.entry_pages += write_entry_pages(config, collection, &sources)?;
        summary.overview_pages += write_overview_pages(config, collection)?;
        if !collection.is_empty() {
            write_feed(config, &meta, collection)?;
            summary.feeds += 1;
        }
    }

    // Everything rendered: only now does the ledger hit disk.
    for collection in &collections {
        collection.write_back(&mut ledger);
    }
    ledger.save(&config.ledger)?;
    summary.ledger_records = ledger.len();

    Ok(summary)
}

/// Validate the manifest, ledger, and source files without writing anything.
pub fn check_site(config: &BlogConfig) -> Result<CheckReport, GenerateError> {
    let (collections, ledger, _) = reconcile(config)?;
    Ok(CheckReport {
        entries: collections.iter().map(|c| (c.language, c.len())).collect(),
        ledger_records: ledger.len(),
    })
}

/// Shared front half of build and check: collections built, sources read
/// and validated, dates reconciled against the (in-memory) ledger.
fn reconcile(
    config: &BlogConfig,
) -> Result<
    (
        Vec<EntryCollection>,
        PubdateLedger,
        BTreeMap<(Language, String), SourceFile>,
    ),
    GenerateError,
> {
    let payload = fs::read_to_string(&config.manifest)?;
    let records = entry::parse_manifest(&payload)?;

    let mut collections = Vec::with_capacity(Language::ALL.len());
    for language in Language::ALL {
        collections.push(EntryCollection::from_manifest(&records, language)?);
    }

    let mut ledger = PubdateLedger::load(&config.ledger)?;
    for collection in &mut collections {
        collection.merge_ledger(&ledger);
    }

    // Reconcile in manifest order: assign publish dates to first-seen
    // entries, stamp modification dates where content changed.
    let mut sources = BTreeMap::new();
    for collection in &collections {
        for entry in collection.entries() {
            ledger.ensure_pubdate(entry.language, &entry.id);
            let src = fingerprint::read_source(&config.source_dir, entry.language, &entry.id)?;
            ledger.reconcile_moddate(entry.language, &entry.id, &src.bytes)?;
            sources.insert((entry.language, entry.id.clone()), src);
        }
    }

    // Second merge picks up freshly assigned dates and digests.
    for collection in &mut collections {
        collection.merge_ledger(&ledger);
    }

    Ok((collections, ledger, sources))
}

fn create_output_tree(output_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(output_dir)?;
    for language in Language::ALL {
        fs::create_dir_all(output_dir.join(language.code()))?;
    }
    fs::create_dir_all(output_dir.join("overview"))
}

/// Write one page per entry, in ascending date order with prev/next
/// neighbors (`None` at either end).
fn write_entry_pages(
    config: &BlogConfig,
    collection: &EntryCollection,
    sources: &BTreeMap<(Language, String), SourceFile>,
) -> Result<usize, GenerateError> {
    let entries = collection.entries();
    let latest = collection.latest(LATEST_COUNT);

    for (idx, entry) in entries.iter().enumerate() {
        let prev = (idx > 0).then(|| &entries[idx - 1]);
        let next = entries.get(idx + 1);

        let src = &sources[&(entry.language, entry.id.clone())];
        let page = render_entry_page(entry, &src.text(), prev, next, &latest);

        let rel = entry.destination_path.trim_start_matches('/');
        fs::write(config.output_dir.join(rel), page.into_string())?;
        println!("Generated {}", entry.destination_path);
    }
    Ok(entries.len())
}

/// Write the paginated overview for one language, most recent first,
/// in chunks of [`ENTRIES_PER_PAGE`].
fn write_overview_pages(
    config: &BlogConfig,
    collection: &EntryCollection,
) -> Result<usize, GenerateError> {
    let descending = collection.by_date_desc();
    if descending.is_empty() {
        return Ok(0);
    }
    let latest = collection.latest(LATEST_COUNT);
    let page_count = descending.len().div_ceil(ENTRIES_PER_PAGE);

    for (idx, chunk) in descending.chunks(ENTRIES_PER_PAGE).enumerate() {
        let page_number = idx + 1;
        let page = render_overview_page(collection.language, chunk, page_number, page_count, &latest);
        let filename = overview_filename(collection.language, page_number);
        fs::write(
            config.output_dir.join("overview").join(&filename),
            page.into_string(),
        )?;
        println!("Generated overview/{filename}");
    }
    Ok(page_count)
}

fn write_feed(
    config: &BlogConfig,
    meta: &FeedMeta,
    collection: &EntryCollection,
) -> Result<(), GenerateError> {
    let channel = feed::channel(meta, collection.language, &collection.by_date_desc());
    let path = config
        .output_dir
        .join(format!("{}.rss", collection.language.code()));
    fs::write(&path, channel.to_string())?;
    println!("Generated {}.rss", collection.language.code());
    Ok(())
}

/// Overview page filename: page 1 has no suffix, later pages carry their
/// page number.
fn overview_filename(language: Language, page_number: usize) -> String {
    if page_number > 1 {
        format!("blog-{}_{}.html", language.code(), page_number)
    } else {
        format!("blog-{}.html", language.code())
    }
}

/// Root-relative URL of an overview page.
fn overview_url(language: Language, page_number: usize) -> String {
    format!("/overview/{}", overview_filename(language, page_number))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
fn base_document(title: &str, language: Language, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(language.code()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="alternate" type="application/rss+xml" href={ "/" (language.code()) ".rss" };
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the latest-postings sidebar.
fn render_latest(latest: &[&Entry]) -> Markup {
    html! {
        aside.latest-entries {
            ul {
                @for entry in latest {
                    li {
                        a href=(entry.destination_path) { (entry.title) }
                    }
                }
            }
        }
    }
}

/// Publish date plus the optional modification date.
fn render_dates(entry: &Entry) -> Markup {
    html! {
        p.entry-dates {
            @if let Some(pubdate) = entry.pubdate {
                time.published datetime=(pubdate.format("%Y-%m-%d")) {
                    (pubdate.format("%Y-%m-%d"))
                }
            }
            @if let Some(moddate) = entry.moddate {
                " · "
                time.modified datetime=(moddate.format("%Y-%m-%d")) {
                    (moddate.format("%Y-%m-%d"))
                }
            }
        }
    }
}

fn language_label(language: Language) -> &'static str {
    match language {
        Language::De => "Deutsch",
        Language::En => "English",
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a single entry page.
///
/// `body` is the entry's authored HTML source, injected verbatim. Prev/next
/// point at the date-adjacent entries of the same language; either may be
/// absent at the ends of the sequence.
pub fn render_entry_page(
    entry: &Entry,
    body: &str,
    prev: Option<&Entry>,
    next: Option<&Entry>,
    latest: &[&Entry],
) -> Markup {
    let content = html! {
        article.entry {
            header {
                h1 { (entry.title) }
                @if let Some(subtitle) = &entry.subtitle {
                    p.subtitle { (subtitle) }
                }
                @if !entry.authors.is_empty() {
                    p.authors { (entry.authors.join(", ")) }
                }
                (render_dates(entry))
                @for (language, path) in &entry.other_paths {
                    p.other-language {
                        a href=(path) { (language_label(*language)) }
                    }
                }
            }
            div.entry-body {
                (PreEscaped(body))
            }
            nav.entry-neighbors {
                @if let Some(prev) = prev {
                    a.prev href=(prev.destination_path) { "← " (prev.title) }
                }
                @if let Some(next) = next {
                    a.next href=(next.destination_path) { (next.title) " →" }
                }
            }
        }
        (render_latest(latest))
    };

    base_document(&entry.title, entry.language, content)
}

/// Renders one overview page: a descending-date slice of postings plus
/// pagination links.
pub fn render_overview_page(
    language: Language,
    entries: &[&Entry],
    page_number: usize,
    page_count: usize,
    latest: &[&Entry],
) -> Markup {
    let title = format!("Blog, page {page_number} of {page_count}");

    let content = html! {
        main.overview {
            @for entry in entries {
                article.overview-item {
                    h2 {
                        a href=(entry.destination_path) { (entry.title) }
                    }
                    @if let Some(subtitle) = &entry.subtitle {
                        p.subtitle { (subtitle) }
                    }
                    (render_dates(entry))
                }
            }
            nav.pagination {
                @if page_number > 1 {
                    a.newer href=(overview_url(language, page_number - 1)) { "← newer" }
                }
                span.page-info { "Page " (page_number) " of " (page_count) }
                @if page_number < page_count {
                    a.older href=(overview_url(language, page_number + 1)) { "older →" }
                }
            }
        }
        (render_latest(latest))
    };

    base_document(&title, language, content)
}
