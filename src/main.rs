use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use jma_scraper::app::ports::ObjectStore;
use jma_scraper::args::{parse_location, parse_past_date};
use jma_scraper::config::Config;
use jma_scraper::constants::{DEFAULT_CONFIG_FILE, LOG_DIR};
use jma_scraper::export::{write_csv_to, DestinationName};
use jma_scraper::infra::{FsObjectStore, HttpObjectStore, ReqwestFetcher};
use jma_scraper::logging;
use jma_scraper::pipeline::Pipeline;
use jma_scraper::registry::{Registry, SamplingInterval};
use jma_scraper::storage::SqliteAuditLog;
use jma_scraper::tasks::{self, BatchSummary};

#[derive(Parser)]
#[command(name = "jma_scraper")]
#[command(about = "Japan Meteorological Agency past-observation scraper")]
#[command(version)]
struct Cli {
    /// TOML config file (default: jma_scraper.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides data_root from the config
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one date and export it as CSV
    Fetch {
        #[arg(long, value_parser = parse_location)]
        location: String,
        /// 10m, 1h, 1d, 5d, 10d or the interval key (every_10_minutes, ...)
        #[arg(long)]
        interval: SamplingInterval,
        /// YYYY-MM-DD, must be in the past
        #[arg(long, value_parser = parse_past_date)]
        date: NaiveDate,
        /// Print the CSV to stdout instead of writing under the data root
        #[arg(long)]
        stdout: bool,
    },
    /// Export every date from --end back to --start
    Backfill {
        #[arg(long, value_parser = parse_location)]
        location: String,
        #[arg(long)]
        interval: SamplingInterval,
        #[arg(long, value_parser = parse_past_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_past_date)]
        end: NaiveDate,
    },
    /// Re-run every address whose fetch failed
    RetryFailed,
    /// Upload exported CSV files
    Upload {
        /// A single file; every export under the data root when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Copy into this directory instead of uploading over HTTP
        #[arg(long)]
        to_dir: Option<PathBuf>,
    },
    /// List the known locations
    Sites {
        #[arg(long)]
        json: bool,
    },
}

fn print_summary(label: &str, summary: &BatchSummary) {
    println!("\n📊 {} results:", label);
    println!("   Succeeded: {}", summary.succeeded.len());
    println!("   Failed: {}", summary.failed.len());
    if !summary.failed.is_empty() {
        println!("\n⚠️  Failures:");
        for failure in &summary.failed {
            println!("   - {}: {}", failure.target, failure.reason);
        }
    }
}

fn build_pipeline(config: &Config, audit: SqliteAuditLog) -> anyhow::Result<Pipeline> {
    let fetcher = ReqwestFetcher::new().context("failed to build HTTP client")?;
    Ok(Pipeline::new(
        Registry::builtin(),
        Box::new(fetcher),
        Box::new(audit),
        config.timeout(),
    ))
}

fn open_audit_log(data_root: &Path) -> anyhow::Result<SqliteAuditLog> {
    SqliteAuditLog::open_at_root(data_root)
        .with_context(|| format!("failed to open audit log under {}", data_root.display()))
}

fn object_store(config: &Config, to_dir: Option<PathBuf>) -> anyhow::Result<Box<dyn ObjectStore>> {
    match to_dir {
        Some(dir) => Ok(Box::new(FsObjectStore::new(dir))),
        None => {
            let endpoint = config.upload.endpoint()?;
            Ok(Box::new(HttpObjectStore::new(
                &endpoint,
                &config.upload.bucket,
                config.upload.token.clone(),
                config.timeout(),
            )?))
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let (config_path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = Config::load(&config_path, explicit)?;
    if let Some(data_root) = cli.data_root {
        config.data_root = data_root;
    }
    let data_root = config.data_root.clone();
    let _guard = logging::init_logging(&data_root.join(LOG_DIR));

    match cli.command {
        Commands::Fetch {
            location,
            interval,
            date,
            stdout,
        } => {
            let pipeline = build_pipeline(&config, open_audit_log(&data_root)?)?;
            let site = pipeline.registry().site(&location)?.clone();
            if stdout {
                let records = pipeline.run(&site, date, interval)?;
                write_csv_to(&records, io::stdout().lock())?;
            } else {
                let result = tasks::export_date(&pipeline, &site, date, interval, &data_root)?;
                println!(
                    "✅ Wrote {} records to {}",
                    result.records,
                    result.path.display()
                );
                let key = DestinationName::new(date, &site.en_name, interval).remote_key(&data_root);
                info!("Upload key for this export: {}", key);
            }
        }
        Commands::Backfill {
            location,
            interval,
            start,
            end,
        } => {
            let pipeline = build_pipeline(&config, open_audit_log(&data_root)?)?;
            let site = pipeline.registry().site(&location)?.clone();
            let summary = tasks::backfill_range(
                &pipeline,
                &site,
                interval,
                start,
                end,
                &data_root,
                config.delay(),
            )?;
            print_summary("Backfill", &summary);
        }
        Commands::RetryFailed => {
            let audit = open_audit_log(&data_root)?;
            let addresses = audit.failed_fetch_addresses()?;
            if addresses.is_empty() {
                println!("✅ No failed fetches to retry");
                return Ok(());
            }
            info!("Retrying {} failed addresses", addresses.len());
            let pipeline = build_pipeline(&config, audit)?;
            let summary = tasks::retry_failed(&pipeline, &addresses, &data_root, config.delay());
            print_summary("Retry", &summary);
        }
        Commands::Upload { file, to_dir } => {
            let audit = open_audit_log(&data_root)?;
            let store = object_store(&config, to_dir)?;
            match file {
                Some(file) => {
                    let file_name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .context("upload file has no file name")?;
                    let key = jma_scraper::export::remote_key(&data_root, &file_name);
                    match tasks::upload_file(&audit, store.as_ref(), &file, &key) {
                        Ok(url) => println!("✅ Uploaded to {}", url),
                        Err(e) => {
                            error!("Upload failed: {}", e);
                            println!("❌ Upload failed: {}", e);
                        }
                    }
                }
                None => {
                    let summary = tasks::upload_exports(&audit, store.as_ref(), &data_root)?;
                    print_summary("Upload", &summary);
                }
            }
        }
        Commands::Sites { json } => {
            let registry = Registry::builtin();
            if json {
                println!("{}", serde_json::to_string_pretty(registry.sites())?);
            } else {
                for site in registry.sites() {
                    println!(
                        "{:<10} {:>3}/{:<6} {} ({})",
                        site.en_name, site.region_code, site.station_code, site.display_name, site.schema_class
                    );
                }
            }
        }
    }
    Ok(())
}
