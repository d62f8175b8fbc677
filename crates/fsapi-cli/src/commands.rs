use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use colored::Colorize;
use fsapi_core::StorageCoordinator;
use fsapi_server::{AppState, FsapiServer, ServerConfig};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    debug!(bind = %config.bind_addr, storage = ?config.storage_location, "loaded configuration");
    if let Command::Serve(args) = cli.command {
        return cmd_serve(config, args).await;
    }

    // Everything else talks to the stores directly rather than over HTTP.
    let storage = AppState::connect(&config).await?.storage;
    match cli.command {
        Command::Ls(args) => cmd_ls(&storage, args, &cli.format).await,
        Command::Put(args) => cmd_put(&storage, args).await,
        Command::Cat(args) => cmd_cat(&storage, args, &cli.format).await,
        Command::Rm(args) => cmd_rm(&storage, args, &cli.format).await,
        Command::Gc(args) => cmd_gc(&storage, args, &cli.format).await,
        Command::Serve(_) => Ok(()),
    }
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    if args.redis_url.is_some() {
        config.redis_url = args.redis_url;
    }
    if args.storage.is_some() {
        config.storage_location = args.storage;
    }
    let server = FsapiServer::connect(config).await?;
    server.serve().await?;
    Ok(())
}

async fn cmd_ls(storage: &StorageCoordinator, args: LsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut keys = storage.list(&args.prefix).await?;
    keys.sort();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&keys)?),
        OutputFormat::Text => {
            for key in &keys {
                println!("{key}");
            }
        }
    }
    Ok(())
}

async fn cmd_put(storage: &StorageCoordinator, args: PutArgs) -> anyhow::Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let id = storage.put(&args.path, Bytes::from(data)).await?;
    println!("{} Stored {} ({})", "✓".green().bold(), args.path.bold(), id.to_string().dimmed());
    Ok(())
}

async fn cmd_cat(storage: &StorageCoordinator, args: CatArgs, format: &OutputFormat) -> anyhow::Result<()> {
    if args.info {
        let info = storage.info(&args.path).await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
            OutputFormat::Text => {
                println!("Path: {}", info.path.bold());
                if let Some(size) = info.size {
                    println!("Size: {size} bytes");
                }
                if let Some(created_at) = info.created_at {
                    println!("Created: {}", created_at.to_rfc3339());
                }
            }
        }
        return Ok(());
    }
    let data = storage.get(&args.path).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

async fn cmd_rm(storage: &StorageCoordinator, args: RmArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let report = storage.delete_by_prefix(&args.prefix).await?;
    if let OutputFormat::Json = format {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "key": f.key, "error": f.error }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "removed": report.removed,
                "failures": failures,
            }))?
        );
        return Ok(());
    }
    for key in &report.removed {
        println!("  {} {}", "deleted:".red(), key);
    }
    for failure in &report.failures {
        println!("  {} {} ({})", "failed:".yellow(), failure.key, failure.error);
    }
    if report.matched() == 0 {
        println!("No paths match {}.", args.prefix.bold());
    }
    Ok(())
}

async fn cmd_gc(storage: &StorageCoordinator, args: GcArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let report = storage
        .sweep_orphans(Duration::from_secs(args.min_age_secs))
        .await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "scanned": report.scanned,
                "referenced": report.referenced,
                "removed": report.removed,
                "skipped_recent": report.skipped_recent,
                "partials_removed": report.partials_removed,
            })
        ),
        OutputFormat::Text => {
            println!("{} GC: {} orphaned blobs removed.", "✓".green(), report.removed);
            println!(
                "  scanned {}, referenced {}, too recent {}, partial writes removed {}",
                report.scanned, report.referenced, report.skipped_recent, report.partials_removed
            );
        }
    }
    Ok(())
}
