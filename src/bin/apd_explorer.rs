//! Command-line front end for the dataset catalog.
//!
//! Usage:
//!   apd-explorer sync
//!   apd-explorer topics --chart
//!   apd-explorer list Agriculture
//!   apd-explorer show Agriculture crop-yields.yml
//!   apd-explorer check-url example.com

use anyhow::{Context, Result, anyhow, bail};
use apd_explorer::{
    DatasetDescriptor, Explorer, ExplorerConfig, LoadedCatalog, SyncReport, render_count_chart,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "apd-explorer")]
#[command(about = "Browse the Awesome Public Datasets catalog")]
struct Cli {
    /// Clone URL of the metadata repository (overrides APD_REMOTE_URL).
    #[arg(long, global = true)]
    remote: Option<String>,
    /// Local checkout directory (overrides APD_CHECKOUT_DIR).
    #[arg(long, global = true)]
    checkout: Option<PathBuf>,
    /// Use the existing checkout without cloning or pulling.
    #[arg(long, global = true)]
    offline: bool,
    /// Timeout for homepage probes, in seconds (overrides APD_HTTP_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or update the metadata checkout.
    Sync,
    /// List topics with their dataset counts.
    Topics {
        /// Also draw a bar chart of datasets per topic.
        #[arg(long)]
        chart: bool,
    },
    /// List the datasets of one topic.
    List { topic: String },
    /// Show one dataset and the status of its homepage.
    Show {
        topic: String,
        dataset: String,
        /// Skip the homepage reachability probe.
        #[arg(long)]
        no_check: bool,
    },
    /// Probe a single URL the way dataset homepages are probed.
    CheckUrl { url: String },
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let explorer = Explorer::new(config)?;

    match &cli.command {
        Commands::Sync => run_sync(&explorer, cli.json),
        Commands::Topics { chart } => {
            let loaded = explorer.catalog()?;
            print_topics(&loaded, *chart, cli.json)?;
            report_diagnostics(&loaded);
            Ok(())
        }
        Commands::List { topic } => {
            let loaded = explorer.catalog()?;
            print_datasets(&loaded, topic, cli.json)?;
            report_diagnostics(&loaded);
            Ok(())
        }
        Commands::Show {
            topic,
            dataset,
            no_check,
        } => {
            let loaded = explorer.catalog()?;
            let descriptor = loaded
                .catalog
                .get(topic, dataset)
                .ok_or_else(|| anyhow!("no dataset '{dataset}' in topic '{topic}'"))?;
            print_dataset(&explorer, dataset, descriptor, !*no_check, cli.json)?;
            report_diagnostics(&loaded);
            Ok(())
        }
        Commands::CheckUrl { url } => {
            let status = explorer.check_url(url);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{status}");
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> Result<ExplorerConfig> {
    let mut config = ExplorerConfig::from_env().context("reading APD_* environment")?;
    if let Some(remote) = &cli.remote {
        config.remote_url = remote.clone();
    }
    if let Some(checkout) = &cli.checkout {
        config.checkout_dir = checkout.clone();
    }
    if cli.offline {
        config.skip_sync = true;
    }
    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            bail!("--timeout-secs must be greater than zero");
        }
        config.http_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn run_sync(explorer: &Explorer, json: bool) -> Result<()> {
    let report = explorer.sync()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let checkout = explorer.config().checkout_dir.display();
    match report {
        SyncReport::Synced { outcome } if outcome.is_fresh() => {
            println!("{checkout}: cloned new checkout")
        }
        SyncReport::Synced { outcome } => println!("{checkout}: {}", outcome.as_str()),
        SyncReport::Skipped => println!("{checkout}: sync skipped"),
        SyncReport::Stale { error } => println!("{checkout}: using stale checkout ({error})"),
    }
    Ok(())
}

fn print_topics(loaded: &LoadedCatalog, chart: bool, json: bool) -> Result<()> {
    let counts = loaded.catalog.category_counts();
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }
    for (topic, count) in &counts {
        println!("{topic} ({count})");
    }
    if chart {
        println!("\nData count by topic\n");
        print!("{}", render_count_chart(&counts, CHART_WIDTH));
    }
    Ok(())
}

fn print_datasets(loaded: &LoadedCatalog, topic: &str, json: bool) -> Result<()> {
    let datasets = loaded
        .catalog
        .category(topic)
        .ok_or_else(|| anyhow!("unknown topic '{topic}'"))?;
    if json {
        let listing: Vec<_> = datasets
            .iter()
            .map(|(file, descriptor)| json!({"file": file, "title": descriptor.display_title(file)}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for (file, descriptor) in datasets {
        println!("{file}\t{}", descriptor.display_title(file));
    }
    Ok(())
}

fn print_dataset(
    explorer: &Explorer,
    file: &str,
    descriptor: &DatasetDescriptor,
    check: bool,
    json: bool,
) -> Result<()> {
    let homepage = if check {
        explorer.homepage_status(descriptor)
    } else {
        None
    };

    if json {
        let fields = serde_json::to_value(descriptor)
            .with_context(|| format!("converting {file} to JSON"))?;
        let value = json!({
            "file": file,
            "title": descriptor.display_title(file),
            "descriptor": fields,
            "homepage_status": homepage,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", descriptor.display_title(file));
    if let Some(image) = descriptor.image() {
        println!("Image: {image}");
    }
    for (label, value) in descriptor.info_rows() {
        println!("{label}: {value}");
    }
    match (homepage, descriptor.homepage()) {
        (Some(status), _) => println!("{status}"),
        (None, Some(url)) => println!("Homepage: {url}"),
        (None, None) => {}
    }
    Ok(())
}

fn report_diagnostics(loaded: &LoadedCatalog) {
    if !loaded.layout_violations.is_empty() {
        eprintln!(
            "Skipped {} files outside the <topic>/<file> layout",
            loaded.layout_violations.len()
        );
    }
    if loaded.parse_failures.is_empty() {
        return;
    }
    eprintln!("Could not parse these files due to yml syntax issues:");
    for path in loaded.failed_paths() {
        eprintln!("  - {}", path.display());
    }
}
