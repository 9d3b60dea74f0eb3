//! element-inventory command line
//!
//! Opens a page, merges its interactive elements into the inventory file and
//! writes an annotated screenshot. Also replays saved DOM snapshots and
//! prints the page-object catalog.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use element_inventory::inventory::build_catalog;
use element_inventory::{
    BrowserSession, Classification, ConnectionOptions, DomTree, InventoryOptions, InventoryStore, LaunchOptions,
    RunContext, ScanReport, Scanner,
};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "element-inventory")]
#[command(version)]
#[command(about = "Track the interactive elements of a web page across runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON options file (log_level, store_path, screenshot_path, mark_vanished, highlight_all)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Inventory file (default: elements.json)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Open a page, update the inventory and write an annotated screenshot
    Scan {
        /// Page to inspect
        url: String,

        /// Annotated screenshot output (default: screenshot.png)
        #[arg(long, value_name = "PATH")]
        screenshot: Option<PathBuf>,

        /// Leave records of elements missing from the page referenceable
        #[arg(long)]
        keep_vanished: bool,

        /// Only outline tracked elements in the screenshot
        #[arg(long)]
        tracked_only: bool,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Update the inventory from a saved DOM snapshot
    Replay {
        /// Snapshot written by the `snapshot` command
        snapshot: PathBuf,

        /// Leave records of elements missing from the snapshot referenceable
        #[arg(long)]
        keep_vanished: bool,
    },

    /// Save the DOM snapshot of a page for later replay
    Snapshot {
        /// Page to capture
        url: String,

        /// Output file
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Print the page-object catalog of the inventory as JSON
    Catalog,
}

#[derive(Args)]
struct BrowserArgs {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Disable the Chrome sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => InventoryOptions::from_file(path)?,
        None => InventoryOptions::default(),
    };
    if let Some(store) = cli.store {
        options.store_path = store;
    }
    options.log_level = raise_level(options.log_level, cli.verbose);
    init_logging(options.log_level);

    match cli.command {
        Command::Scan {
            url,
            screenshot,
            keep_vanished,
            tracked_only,
            browser,
        } => {
            if let Some(path) = screenshot {
                options.screenshot_path = path;
            }
            if keep_vanished {
                options.mark_vanished = false;
            }
            if tracked_only {
                options.highlight_all = false;
            }

            let context = RunContext::new(options);
            let session = open_session(&browser)?;
            let report = Scanner::new(&context).inspect(&session, &url)?;
            print_summary(&context, &report);
            session.close()?;
        }
        Command::Replay { snapshot, keep_vanished } => {
            if keep_vanished {
                options.mark_vanished = false;
            }

            let context = RunContext::new(options);
            let tree = DomTree::from_file(&snapshot)?;
            let report = Scanner::new(&context).scan(&tree)?;
            print_summary(&context, &report);
        }
        Command::Snapshot { url, output, browser } => {
            let session = open_session(&browser)?;
            session.navigate(&url)?;
            let tree = session.snapshot()?;
            std::fs::write(&output, tree.to_json()?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {} elements to {}", tree.count_elements(), output.display());
            session.close()?;
        }
        Command::Catalog => {
            let inventory = InventoryStore::new(&options.store_path).load_or_empty()?;
            let catalog = build_catalog(&inventory);
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }

    Ok(())
}

fn raise_level(configured: LevelFilter, verbose: u8) -> LevelFilter {
    match verbose {
        0 => configured,
        1 => configured.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) {
    // RUST_LOG still overrides the configured level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn open_session(args: &BrowserArgs) -> Result<BrowserSession> {
    if let Some(ws_url) = &args.ws_endpoint {
        return BrowserSession::connect(ConnectionOptions::new(ws_url.clone()))
            .with_context(|| format!("Failed to connect to {}", ws_url));
    }

    let mut options = LaunchOptions::new().headless(!args.headed).sandbox(!args.no_sandbox);
    if let Some(path) = &args.executable_path {
        options = options.chrome_path(path.clone());
    }

    BrowserSession::launch(options).context("Failed to launch browser")
}

fn print_summary(context: &RunContext, report: &ScanReport) {
    let diff = &report.diff;

    println!(
        "Inventory {}: {} records{}",
        context.options.store_path.display(),
        report.total_records,
        if report.persisted { " (updated)" } else { " (unchanged)" }
    );
    println!(
        "  new: {}, changed: {}, reactivated: {}, unchanged: {}, vanished: {}",
        diff.count(Classification::New),
        diff.count(Classification::Changed),
        diff.count(Classification::Reactivated),
        diff.count(Classification::Unchanged),
        diff.count(Classification::Vanished),
    );
    if report.failures > 0 {
        println!("  skipped {} elements that could not be resolved", report.failures);
    }

    for record in &diff.new_records {
        println!("  + #{} {} '{}' at {}", record.number, record.category, record.label, record.xpath);
    }
    for outcome in diff.modified() {
        println!(
            "  ~ #{} {} at {}: {}",
            outcome.number,
            outcome.category,
            outcome.xpath,
            outcome.changes.join(", ")
        );
    }

    if let Some(path) = &report.screenshot {
        println!("Screenshot: {}", path.display());
    }
}
