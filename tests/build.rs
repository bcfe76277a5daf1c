//! End-to-end build tests: full runs against a temp workspace, asserting on
//! the generated tree and the persisted ledger.

use std::fs;
use std::path::Path;

use chrono::Utc;
use simple_blog::config::BlogConfig;
use simple_blog::entry::Language;
use simple_blog::fingerprint;
use simple_blog::generate::{build_site, check_site};
use simple_blog::ledger::PubdateLedger;
use tempfile::TempDir;

struct Workspace {
    tmp: TempDir,
    config: BlogConfig,
}

impl Workspace {
    fn new(manifest_json: &str) -> Workspace {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::write(root.join("blog.json"), manifest_json).unwrap();
        for lang in Language::ALL {
            fs::create_dir_all(root.join("src").join(lang.code())).unwrap();
        }

        let config = BlogConfig {
            title: "Test Blog".into(),
            description: "testing".into(),
            base_url: "https://blog.example.org".into(),
            manifest: root.join("blog.json"),
            ledger: root.join("pubdates.json"),
            source_dir: root.join("src"),
            output_dir: root.join("dist"),
        };
        Workspace { tmp, config }
    }

    fn write_source(&self, language: Language, id: &str, body: &str) {
        let path = self
            .tmp
            .path()
            .join("src")
            .join(language.code())
            .join(format!("{id}.html.source"));
        fs::write(path, body).unwrap();
    }

    fn dist(&self, rel: &str) -> std::path::PathBuf {
        self.config.output_dir.join(rel)
    }

    fn ledger_json(&self) -> serde_json::Value {
        let content = fs::read_to_string(&self.config.ledger).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// First run on a fresh workspace
// =========================================================================

#[test]
fn first_run_single_entry() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"title":"Hello"}}}]"#);
    // Empty ledger file: the first-run state
    fs::write(&ws.config.ledger, "").unwrap();
    ws.write_source(Language::En, "a1", "<p>First post</p>");

    let summary = build_site(&ws.config).unwrap();
    assert_eq!(summary.entry_pages, 1);
    assert_eq!(summary.overview_pages, 1);
    assert_eq!(summary.feeds, 1);
    assert_eq!(summary.ledger_records, 1);

    // Ledger gained one en/a1 record: today's date, digest of the source,
    // no modification date.
    let records = ws.ledger_json();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec["language"], "en");
    assert_eq!(rec["id"], "a1");
    let today = Utc::now().format("%Y-%m-%d").to_string();
    assert!(rec["pubdate"].as_str().unwrap().starts_with(&today));
    assert_eq!(rec["md5"], fingerprint::digest(b"<p>First post</p>"));
    assert!(rec["moddate"].is_null());

    // No destination_path in the manifest: the documented degenerate path
    let page = read(&ws.dist("en/.html"));
    assert!(page.contains("<p>First post</p>"));
    // Single entry: no prev/next neighbors
    assert!(!page.contains(r#"class="prev""#));
    assert!(!page.contains(r#"class="next""#));

    // English-only manifest: no German pages, overview, or feed
    assert!(ws.dist("en.rss").exists());
    assert!(!ws.dist("de.rss").exists());
    assert!(ws.dist("overview/blog-en.html").exists());
    assert!(!ws.dist("overview/blog-de.html").exists());
}

// =========================================================================
// Idempotence and modification detection across runs
// =========================================================================

#[test]
fn repeated_runs_are_idempotent_until_content_changes() {
    let ws = Workspace::new(
        r#"[{"id":"a1","languages":{
            "en":{"title":"Hello","destination_path":"hello"},
            "de":{"title":"Hallo","destination_path":"hallo"}}}]"#,
    );
    ws.write_source(Language::En, "a1", "english body");
    ws.write_source(Language::De, "a1", "german body");

    build_site(&ws.config).unwrap();
    let first = fs::read_to_string(&ws.config.ledger).unwrap();

    // Second run over unchanged input: publish dates stay, nothing modified
    build_site(&ws.config).unwrap();
    let second = fs::read_to_string(&ws.config.ledger).unwrap();
    assert_eq!(first, second);

    // Change one source: only that record gains a moddate and a new digest
    ws.write_source(Language::En, "a1", "english body, edited");
    build_site(&ws.config).unwrap();

    let ledger = PubdateLedger::load(&ws.config.ledger).unwrap();
    let en = ledger.lookup(Language::En, "a1").unwrap();
    assert!(en.moddate.is_some());
    assert_eq!(en.digest, fingerprint::digest(b"english body, edited"));
    let de = ledger.lookup(Language::De, "a1").unwrap();
    assert!(de.moddate.is_none());

    // Publish dates never move
    let before: serde_json::Value = serde_json::from_str(&first).unwrap();
    let en_before = before
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["language"] == "en")
        .unwrap();
    assert_eq!(
        en.pubdate,
        simple_blog::ledger::parse_timestamp(en_before["pubdate"].as_str().unwrap()).unwrap()
    );
}

// =========================================================================
// Cross-language links in rendered output
// =========================================================================

#[test]
fn entry_pages_link_their_counterparts() {
    let ws = Workspace::new(
        r#"[{"id":"a1","languages":{
            "en":{"title":"Hello","destination_path":"hello"},
            "de":{"title":"Hallo","destination_path":"hallo"}}}]"#,
    );
    ws.write_source(Language::En, "a1", "english body");
    ws.write_source(Language::De, "a1", "german body");

    build_site(&ws.config).unwrap();

    let en_page = read(&ws.dist("en/hello.html"));
    assert!(en_page.contains(r#"href="/de/hallo.html""#));
    let de_page = read(&ws.dist("de/hallo.html"));
    assert!(de_page.contains(r#"href="/en/hello.html""#));
}

// =========================================================================
// Pagination
// =========================================================================

#[test]
fn twelve_entries_paginate_five_five_two() {
    // 12 English entries, ledger pre-seeded with distinct descending dates
    // so page assignment is deterministic.
    let mut manifest = Vec::new();
    let mut ledger = Vec::new();
    for i in 1..=12 {
        manifest.push(format!(
            r#"{{"id":"p{i}","languages":{{"en":{{"title":"Post {i}","destination_path":"p{i}"}}}}}}"#
        ));
        ledger.push(format!(
            r#"{{"language":"en","id":"p{i}","pubdate":"2024-01-{i:02}T12:00:00Z","md5":"","moddate":null}}"#
        ));
    }
    let ws = Workspace::new(&format!("[{}]", manifest.join(",")));
    fs::write(&ws.config.ledger, format!("[{}]", ledger.join(","))).unwrap();
    for i in 1..=12 {
        ws.write_source(Language::En, &format!("p{i}"), &format!("body {i}"));
    }

    let summary = build_site(&ws.config).unwrap();
    assert_eq!(summary.entry_pages, 12);
    assert_eq!(summary.overview_pages, 3);

    assert!(ws.dist("overview/blog-en.html").exists());
    assert!(ws.dist("overview/blog-en_2.html").exists());
    assert!(ws.dist("overview/blog-en_3.html").exists());
    assert!(!ws.dist("overview/blog-en_4.html").exists());

    // Descending by date: page 1 holds the five newest, page 3 the two oldest
    let page1 = read(&ws.dist("overview/blog-en.html"));
    for i in 8..=12 {
        assert!(page1.contains(&format!("Post {i}")), "page 1 missing Post {i}");
    }
    assert!(!page1.contains("Post 7"));
    assert!(page1.contains("Page 1 of 3"));

    let page3 = read(&ws.dist("overview/blog-en_3.html"));
    assert!(page3.contains("Post 1"));
    assert!(page3.contains("Post 2"));
    assert!(!page3.contains("Post 3</a>"));
    assert!(page3.contains("Page 3 of 3"));
}

// =========================================================================
// Feeds
// =========================================================================

#[test]
fn feed_lists_entries_with_absolute_urls() {
    let ws = Workspace::new(
        r#"[{"id":"a1","languages":{"en":{"title":"Hello","destination_path":"hello","authors":["jd"]}}}]"#,
    );
    ws.write_source(Language::En, "a1", "body");

    build_site(&ws.config).unwrap();

    let feed = read(&ws.dist("en.rss"));
    assert!(feed.contains("<title>Test Blog</title>"));
    assert!(feed.contains("<link>https://blog.example.org/en/hello.html</link>"));
    assert!(feed.contains("<language>en</language>"));
    assert!(feed.contains("jd"));
}

// =========================================================================
// Failure modes
// =========================================================================

#[test]
fn missing_source_file_aborts_without_touching_ledger() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"title":"Hello"}}}]"#);
    // No source file written

    assert!(build_site(&ws.config).is_err());
    assert!(!ws.config.ledger.exists());
}

#[test]
fn empty_source_file_aborts() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"title":"Hello"}}}]"#);
    ws.write_source(Language::En, "a1", "");

    assert!(build_site(&ws.config).is_err());
}

#[test]
fn missing_title_aborts() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"destination_path":"x"}}}]"#);
    ws.write_source(Language::En, "a1", "body");

    assert!(build_site(&ws.config).is_err());
}

#[test]
fn malformed_ledger_timestamp_aborts() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"title":"Hello"}}}]"#);
    ws.write_source(Language::En, "a1", "body");
    fs::write(
        &ws.config.ledger,
        r#"[{"language":"en","id":"a1","pubdate":"2024-01-05","md5":"","moddate":null}]"#,
    )
    .unwrap();

    assert!(build_site(&ws.config).is_err());
}

// =========================================================================
// Check command semantics
// =========================================================================

#[test]
fn check_validates_without_writing() {
    let ws = Workspace::new(
        r#"[{"id":"a1","languages":{"en":{"title":"Hello","destination_path":"hello"}}}]"#,
    );
    ws.write_source(Language::En, "a1", "body");

    let report = check_site(&ws.config).unwrap();
    assert_eq!(report.entries, vec![(Language::De, 0), (Language::En, 1)]);

    assert!(!ws.config.output_dir.exists());
    assert!(!ws.config.ledger.exists());
}

#[test]
fn check_fails_on_missing_source() {
    let ws = Workspace::new(r#"[{"id":"a1","languages":{"en":{"title":"Hello"}}}]"#);
    assert!(check_site(&ws.config).is_err());
}
