//! Command implementations for the catalog CLI.
//!
//! Each invocation loads configuration, initializes logging, opens storage
//! and runs one command, printing the result as pretty JSON on stdout.
//! Logs go to stderr.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use catalog_core::{CatalogService, CatalogStore, ReindexEngine, TransactionalRepository};
use catalog_storage::Storage;
use catalog_types::{CreateItem, CreatePlace, CreateStyle, CreateTopic, Settings};

use crate::cli::{
    AdminCommands, Cli, Commands, ItemCommands, PlaceCommands, StyleCommands, TopicCommands,
};

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open storage at the configured path, creating parent directories.
pub fn open_storage(settings: &Settings) -> Result<Arc<Storage>> {
    let db_path = settings.expanded_db_path();

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let storage = Storage::open(&db_path).context("Failed to open storage")?;
    Ok(Arc::new(storage))
}

/// Entry point used by `main`.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(
        cli.config.as_deref(),
        cli.db_path.as_deref(),
        cli.log_level.as_deref(),
    )?;
    init_logging(&settings.log_level)?;

    info!(db_path = %settings.db_path, "Catalog starting");
    let storage = open_storage(&settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Admin(cmd) => handle_admin(&storage, cmd, &mut out),
        command => {
            let engine = ReindexEngine::from_settings(&settings.reindex);
            let service = CatalogService::with_engine(CatalogStore::new(storage), engine);
            execute(&service, command, &mut out)
        }
    }
}

/// Run one catalog command and write its JSON result to `out`.
pub fn execute<R, W>(service: &CatalogService<R>, command: Commands, out: &mut W) -> Result<()>
where
    R: TransactionalRepository,
    W: Write,
{
    match command {
        Commands::Topic(cmd) => handle_topic(service, cmd, out),
        Commands::Style(StyleCommands::Create { name, topic }) => {
            let style = service.create_style(CreateStyle::new(name, topic))?;
            print_json(out, &style)
        }
        Commands::Place(PlaceCommands::Create { name, style }) => {
            let place = service.create_place(CreatePlace::new(name, style))?;
            print_json(out, &place)
        }
        Commands::Item(cmd) => handle_item(service, cmd, out),
        Commands::Tree => print_json(out, &service.catalog_tree()?),
        Commands::History { topic } => print_json(out, &service.topic_history(topic)?),
        Commands::Admin(_) => anyhow::bail!("Admin commands operate on storage directly"),
    }
}

fn handle_topic<R, W>(service: &CatalogService<R>, cmd: TopicCommands, out: &mut W) -> Result<()>
where
    R: TransactionalRepository,
    W: Write,
{
    match cmd {
        TopicCommands::Create { name } => {
            print_json(out, &service.create_topic(CreateTopic::new(name))?)
        }
        TopicCommands::List => print_json(out, &service.list_topics()?),
        TopicCommands::Show { id } => print_json(out, &service.get_topic(id)?),
        TopicCommands::Delete { id } => print_json(out, &service.delete_topic(id)?),
        TopicCommands::Reindex => {
            let changes = service.reindex_topics()?;
            print_json(out, &json!({ "changes": changes }))
        }
    }
}

fn handle_item<R, W>(service: &CatalogService<R>, cmd: ItemCommands, out: &mut W) -> Result<()>
where
    R: TransactionalRepository,
    W: Write,
{
    match cmd {
        ItemCommands::Create {
            name,
            place,
            alias,
            width,
            height,
            image_url,
            playground,
        } => {
            let mut request = CreateItem::new(name, place);
            request.alias = alias;
            request.width = width;
            request.height = height;
            request.image_url = image_url;
            if let Some(raw) = playground {
                request.playground = Some(parse_json(&raw)?);
            }
            print_json(out, &service.create_item(request)?)
        }
        ItemCommands::Show { id } => print_json(out, &service.get_item(id)?),
        ItemCommands::Playground { id, json } => {
            let playground = parse_json(&json)?;
            print_json(out, &service.update_item_playground(id, playground)?)
        }
        ItemCommands::Delete { id } => print_json(out, &service.delete_item(id)?),
    }
}

/// Handle admin commands against storage.
pub fn handle_admin<W: Write>(storage: &Storage, cmd: AdminCommands, out: &mut W) -> Result<()> {
    match cmd {
        AdminCommands::Stats => {
            let stats = storage.get_stats().context("Failed to read storage stats")?;
            print_json(
                out,
                &json!({
                    "entries": stats.entries,
                    "disk_usage_bytes": stats.disk_usage_bytes,
                }),
            )
        }
        AdminCommands::Compact { cf } => {
            match cf.as_deref() {
                Some(name) => storage
                    .compact_cf(name)
                    .with_context(|| format!("Failed to compact column family {}", name))?,
                None => storage.compact().context("Failed to compact storage")?,
            }
            print_json(out, &json!({ "compacted": cf.unwrap_or_else(|| "all".to_string()) }))
        }
    }
}

fn parse_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("Playground must be valid JSON")
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to write output")?;
    writeln!(out)?;
    Ok(())
}
