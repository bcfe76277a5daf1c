//! RSS feed generation.
//!
//! One RSS 2.0 feed per language, built from the full descending-date entry
//! sequence. Items carry the entry's title, absolute URL, author list, and a
//! date: the modification date when one exists, the publish date otherwise —
//! so edited postings resurface in feed readers.

use chrono::Utc;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::entry::{Entry, Language};

/// Channel-level metadata, from the run configuration.
#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: String,
    pub description: String,
    /// Absolute URL prefix entries' destination paths are appended to,
    /// without a trailing slash (e.g. `https://blog.example.org`).
    pub base_url: String,
}

/// Build the feed channel for one language.
///
/// `entries` is expected in descending publish-date order; items appear in
/// the given order and the channel's `pubDate` is taken from the first.
pub fn channel(meta: &FeedMeta, language: Language, entries: &[&Entry]) -> Channel {
    let items: Vec<Item> = entries.iter().map(|e| item(meta, e)).collect();

    ChannelBuilder::default()
        .title(&meta.title)
        .link(&meta.base_url)
        .description(&meta.description)
        .language(Some(language.code().to_string()))
        .pub_date(entries.first().and_then(|e| item_date(e)))
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .items(items)
        .build()
}

fn item(meta: &FeedMeta, entry: &Entry) -> Item {
    let url = format!("{}{}", meta.base_url, entry.destination_path);
    let guid = GuidBuilder::default().value(&url).permalink(true).build();

    let mut builder = ItemBuilder::default();
    builder.title(Some(entry.title.clone()));
    builder.link(Some(url));
    builder.guid(Some(guid));
    builder.pub_date(item_date(entry));
    if !entry.authors.is_empty() {
        builder.author(Some(entry.authors.join(", ")));
    }
    if let Some(subtitle) = &entry.subtitle {
        builder.description(Some(subtitle.clone()));
    }
    builder.build()
}

/// Modification date, falling back to the publish date, as RFC 2822.
fn item_date(entry: &Entry) -> Option<String> {
    entry
        .moddate
        .or(entry.pubdate)
        .map(|dt| dt.to_rfc2822())
}
