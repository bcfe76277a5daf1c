use clap::{Parser, Subcommand};
use simple_blog::{config, generate};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Static site generator for bilingual blogs")]
#[command(long_about = "\
Static site generator for bilingual blogs

A JSON manifest is the data source. Each record names an entry and its
per-language metadata; entry bodies are plain HTML source files; publication
and modification dates are tracked in a JSON ledger that persists across
runs.

Input layout:

  blog.json                        # Manifest: one record per entry
  pubdates.json                    # Date ledger (created on first build)
  src/
  ├── de/
  │   └── hallo-welt.html.source   # Entry bodies, one file per language
  └── en/
      └── hello-world.html.source

Output layout:

  dist/
  ├── de/hallo-welt.html           # One page per entry
  ├── en/hello-world.html
  ├── overview/blog-en.html        # Paginated overviews (5 per page)
  ├── overview/blog-en_2.html
  ├── de.rss                       # One feed per language
  └── en.rss

An entry first seen by a build gets today's instant as its publication
date. An entry whose source content changed since the last build gets a
modification date. Both live in pubdates.json — keep it under version
control.

Run 'simple-blog gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// File to load configuration from
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Manifest file (overrides config)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Source file directory (overrides config)
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Ledger file (overrides config)
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile dates, render all pages and feeds, persist the ledger
    Build,
    /// Validate manifest, ledger, and source files without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(manifest) = cli.manifest {
        config.manifest = manifest;
    }
    if let Some(source) = cli.source {
        config.source_dir = source;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(ledger) = cli.ledger {
        config.ledger = ledger;
    }

    match cli.command {
        Command::Build => {
            println!("==> Building from {}", config.manifest.display());
            let summary = generate::build_site(&config)?;
            println!(
                "==> Build complete: {} entry pages, {} overview pages, {} feeds → {}",
                summary.entry_pages,
                summary.overview_pages,
                summary.feeds,
                config.output_dir.display()
            );
            println!(
                "==> Ledger saved: {} records → {}",
                summary.ledger_records,
                config.ledger.display()
            );
        }
        Command::Check => {
            println!("==> Checking {}", config.manifest.display());
            let report = generate::check_site(&config)?;
            for (language, count) in &report.entries {
                println!("    {language}: {count} entries");
            }
            println!("    ledger: {} records", report.ledger_records);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
