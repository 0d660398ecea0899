//! AINow CLI
//!
//! Local driver for the aggregation library: run passes, curate the baseline,
//! and move datasets in and out as JSON files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ainow::{
    Dashboard,
    error::{AppError, Result},
    models::{
        Breakthrough, Category, Collection, Concern, Config, CuratedRecord, Dataset, Item,
        MajorUpdate, MarketTrend, RecordId, seed,
    },
    pipeline::{Aggregator, ToolQuery, search, search::average_rating},
    storage::{DatasetStorage, LocalStorage, import_file},
};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

/// AINow - Emerging AI tool discovery
#[derive(Parser, Debug)]
#[command(
    name = "ainow",
    version,
    about = "Aggregates emerging AI tools and news into a curated dataset"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Curated baseline file (overrides paths.baseline_file)
    #[arg(short, long)]
    baseline: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one aggregation pass and export the result
    Refresh {
        /// Write here instead of a dated file in the export directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run aggregation passes on an interval
    Watch {
        /// Seconds between passes (default: aggregation.poll_interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many passes
        #[arg(long)]
        passes: Option<usize>,
    },

    /// Export the curated baseline without contacting any source
    Export,

    /// Replace the curated baseline with a dataset file
    Import { file: PathBuf },

    /// Add a record from a JSON file
    Add {
        collection: Collection,
        file: PathBuf,
    },

    /// Replace a record with the contents of a JSON file
    Update {
        collection: Collection,
        id: RecordId,
        file: PathBuf,
    },

    /// Delete a record
    Delete { collection: Collection, id: RecordId },

    /// Search the curated baseline
    Search {
        #[arg(default_value = "")]
        term: String,

        #[arg(long, default_value = "tools")]
        collection: Collection,

        /// Tools only: primary category
        #[arg(long)]
        category: Option<Category>,

        /// Tools only: audience
        #[arg(long)]
        audience: Option<Category>,
    },

    /// Validate configuration and baseline
    Validate,

    /// Show configuration and baseline info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    if let Some(path) = &cli.baseline {
        config.paths.baseline_file = Some(path.clone());
    }

    let export_storage = LocalStorage::new(&config.paths.export_dir);

    match cli.command {
        Command::Refresh { output } => {
            config.validate()?;
            let dashboard = open_dashboard(&config)?;
            let dataset = dashboard.refresh().await;
            report(&dataset);

            let path = match output {
                Some(path) => save_to(&path, &dataset).await?,
                None => dashboard.export(&export_storage).await?,
            };
            log::info!("Dataset written to {}", path.display());
        }

        Command::Watch { interval, passes } => {
            config.validate()?;
            let dashboard = open_dashboard(&config)?;
            let every = Duration::from_secs(
                interval
                    .unwrap_or(config.aggregation.poll_interval_secs)
                    .max(1),
            );
            log::info!("Refreshing every {}s", every.as_secs());

            let mut ticker = tokio::time::interval(every);
            let mut done = 0;
            loop {
                ticker.tick().await;
                let dataset = dashboard.refresh().await;
                report(&dataset);
                let path = dashboard.export(&export_storage).await?;
                log::info!("Dataset written to {}", path.display());

                done += 1;
                if passes.is_some_and(|limit| done >= limit) {
                    break;
                }
            }
        }

        Command::Export => {
            let baseline = load_baseline(&config)?;
            let path = export_storage.export(&baseline).await?;
            log::info!("Baseline exported to {}", path.display());
        }

        Command::Import { file } => {
            let target = baseline_path(&config)?;
            let dataset = import_file(&file).await?;
            save_to(&target, &dataset).await?;
            log::info!(
                "Imported {} tools from {} into {}",
                dataset.new_tools.len(),
                file.display(),
                target.display()
            );
        }

        Command::Add { collection, file } => {
            let value = read_json(&file).await?;
            let id = edit_baseline(&config, |dashboard| add_record(dashboard, collection, value))
                .await?;
            println!("{id}");
        }

        Command::Update {
            collection,
            id,
            file,
        } => {
            let value = read_json(&file).await?;
            edit_baseline(&config, |dashboard| {
                update_record(dashboard, collection, &id, value)
            })
            .await?;
        }

        Command::Delete { collection, id } => {
            edit_baseline(&config, |dashboard| dashboard.delete_item(collection, &id)).await?;
        }

        Command::Search {
            term,
            collection,
            category,
            audience,
        } => {
            let baseline = load_baseline(&config)?;
            match collection {
                Collection::Tools => {
                    let query = ToolQuery {
                        term,
                        category,
                        audience,
                    };
                    let hits = query.apply(&baseline.new_tools);
                    for tool in &hits {
                        println!("{}\t{}\t{}\t{:.1}", tool.id, tool.name, tool.category, tool.rating);
                    }
                    if let Some(avg) = average_rating(&hits) {
                        log::info!("{} tools, average rating {avg:.1}", hits.len());
                    }
                }
                Collection::Updates => print_hits(search::<MajorUpdate>(&baseline.major_updates, &term)),
                Collection::Breakthroughs => {
                    print_hits(search::<Breakthrough>(&baseline.breakthroughs, &term))
                }
                Collection::Concerns => print_hits(search::<Concern>(&baseline.concerns, &term)),
                Collection::Trends => print_hits(search::<MarketTrend>(&baseline.market_trends, &term)),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            match &config.paths.baseline_file {
                Some(path) => {
                    seed::load(path)?;
                    log::info!("✓ Baseline OK ({})", path.display());
                }
                None => log::info!("✓ Using built-in baseline"),
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            let baseline = load_baseline(&config)?;
            let aggregator = Aggregator::from_config(&config)?;

            log::info!("Config: {}", cli.config.display());
            log::info!(
                "Baseline: {}",
                config
                    .paths
                    .baseline_file
                    .as_ref()
                    .map_or("built-in".to_string(), |p| p.display().to_string())
            );
            log::info!("Sources: {}", aggregator.sources().join(", "));
            log::info!("Cache TTL: {}s", aggregator.cache().ttl().as_secs());
            log::info!("Export directory: {}", export_storage.root().display());
            log::info!("Last updated: {}", baseline.metadata.last_updated);
            for collection in Collection::ALL {
                log::info!("{}: {}", collection, baseline.count(collection));
            }
        }
    }

    Ok(())
}

fn load_baseline(config: &Config) -> Result<Dataset> {
    seed::load_or_builtin(config.paths.baseline_file.as_deref())
}

fn open_dashboard(config: &Config) -> Result<Dashboard> {
    let aggregator = Aggregator::from_config(config)?;
    Ok(Dashboard::new(aggregator, load_baseline(config)?))
}

fn baseline_path(config: &Config) -> Result<PathBuf> {
    config.paths.baseline_file.clone().ok_or_else(|| {
        AppError::config("Editing requires a baseline file (--baseline or paths.baseline_file)")
    })
}

/// Load the baseline file, apply `change`, and write it back.
///
/// Nothing is written when loading or the change fails.
async fn edit_baseline<T>(
    config: &Config,
    change: impl FnOnce(&Dashboard) -> Result<T>,
) -> Result<T> {
    let path = baseline_path(config)?;
    let dashboard = open_dashboard(config)?;
    let value = change(&dashboard)?;
    save_to(&path, &dashboard.baseline()).await?;
    log::info!("Baseline saved to {}", path.display());
    Ok(value)
}

async fn save_to(path: &Path, dataset: &Dataset) -> Result<PathBuf> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| AppError::config(format!("Not a file path: {}", path.display())))?
        .to_string_lossy();
    LocalStorage::new(dir).save(&name, dataset).await
}

async fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Parse a record, tolerating a missing id.
fn parse_record<R: DeserializeOwned>(mut value: serde_json::Value) -> Result<R> {
    if let Some(object) = value.as_object_mut() {
        object.entry("id").or_insert(serde_json::json!(0));
    }
    Ok(serde_json::from_value(value)?)
}

fn add_record(
    dashboard: &Dashboard,
    collection: Collection,
    value: serde_json::Value,
) -> Result<RecordId> {
    match collection {
        Collection::Tools => dashboard.create_item(parse_record::<Item>(value)?),
        Collection::Updates => dashboard.create_item(parse_record::<MajorUpdate>(value)?),
        Collection::Breakthroughs => dashboard.create_item(parse_record::<Breakthrough>(value)?),
        Collection::Concerns => dashboard.create_item(parse_record::<Concern>(value)?),
        Collection::Trends => dashboard.create_item(parse_record::<MarketTrend>(value)?),
    }
}

fn update_record(
    dashboard: &Dashboard,
    collection: Collection,
    id: &RecordId,
    value: serde_json::Value,
) -> Result<()> {
    match collection {
        Collection::Tools => dashboard.update_item(id, parse_record::<Item>(value)?),
        Collection::Updates => dashboard.update_item(id, parse_record::<MajorUpdate>(value)?),
        Collection::Breakthroughs => {
            dashboard.update_item(id, parse_record::<Breakthrough>(value)?)
        }
        Collection::Concerns => dashboard.update_item(id, parse_record::<Concern>(value)?),
        Collection::Trends => dashboard.update_item(id, parse_record::<MarketTrend>(value)?),
    }
}

fn print_hits<R: CuratedRecord>(hits: Vec<&R>) {
    for record in &hits {
        let title = record.haystack().first().copied().unwrap_or("");
        println!("{}\t{}", record.id(), title);
    }
    log::info!("{} matches", hits.len());
}

fn report(dataset: &Dataset) {
    for status in &dataset.metadata.source_status {
        log::info!(
            "  {:<14} {:?} ({} items)",
            status.name,
            status.state,
            status.items
        );
    }
    match &dataset.metadata.error {
        Some(error) => log::warn!("Serving fallback data: {error}"),
        None => log::info!(
            "{} tools ({} discovered), {} news, {} feed items",
            dataset.new_tools.len(),
            dataset.summary.indie_tools_found.unwrap_or(0),
            dataset.ai_news.len(),
            dataset.rss_updates.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with_baseline(path: &Path) -> Config {
        let mut config = Config::default();
        config.paths.baseline_file = Some(path.to_path_buf());
        config
    }

    #[tokio::test]
    async fn test_edit_rejects_malformed_baseline_and_keeps_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("baseline.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let config = config_with_baseline(&path);

        let id = seed::builtin().unwrap().concerns[0].id.clone();
        let result = edit_baseline(&config, |dashboard| {
            dashboard.delete_item(Collection::Concerns, &id)
        })
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
    }

    #[tokio::test]
    async fn test_edit_starts_missing_baseline_from_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("baseline.json");
        let config = config_with_baseline(&path);

        let builtin = seed::builtin().unwrap();
        let id = builtin.concerns[0].id.clone();
        edit_baseline(&config, |dashboard| {
            dashboard.delete_item(Collection::Concerns, &id)
        })
        .await
        .unwrap();

        let saved = seed::load(&path).unwrap();
        assert_eq!(saved.concerns.len(), builtin.concerns.len() - 1);
    }

    #[tokio::test]
    async fn test_failed_edit_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("baseline.json");
        let config = config_with_baseline(&path);

        let missing = RecordId::from("no-such-id");
        let result = edit_baseline(&config, |dashboard| {
            dashboard.delete_item(Collection::Trends, &missing)
        })
        .await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
