mod cli;

use nfoforge::{
    config::{self, Config},
    library::Library,
    metadata::{Scraper, TmdbProvider},
    nfo::BriefView,
    scanner::{ScanProgress, Scanner},
    server::{self, AppContext},
};
use nfoforge_common::VideoCategory;
use nfoforge_probe::HdrProber;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn build_library(config: &Config) -> Result<Arc<Library>> {
    let scanner = Scanner::new(HdrProber::new(config.tools.ffprobe_path.clone()));

    let provider =
        TmdbProvider::new(&config.provider).context("Failed to create TMDB client")?;
    let scraper = Scraper::new(Arc::new(provider), config.scrape_settings());
    if !scraper.provider().is_available() {
        tracing::warn!("No TMDB API key configured, scraping will fail");
    }

    Ok(Arc::new(Library::new(&config.library, scanner, scraper)))
}

/// Initial scan and periodic TV episode updates.
async fn run_background(library: Arc<Library>, scan_on_start: bool, interval_secs: u64) {
    let shutdown = library.shutdown_token();

    if scan_on_start {
        tracing::info!("Scanning all libraries on start");
        library.scan_all_and_wait(false).await;
    }

    if interval_secs == 0 {
        return;
    }

    tracing::info!("Auto updating TV shows every {}s", interval_secs);
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                library.scan_and_wait(VideoCategory::TvShow, false).await;
                let updated = library.auto_update_tv().await;
                tracing::debug!("Auto update touched {} shows", updated);
            }
        }
    }
}

/// Wait for the background task, logging a panic or abort instead of
/// dropping it. Returns whether the task ended normally.
async fn join_background(handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Background task did not finish cleanly");
            false
        }
    }
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting nfoforge");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let library = build_library(&config)?;

    let background = tokio::spawn(run_background(
        Arc::clone(&library),
        config.library.scan_on_start,
        config.library.auto_update_interval_secs,
    ));

    let server_result = server::start_server(AppContext::new(Arc::clone(&library), config)).await;

    tracing::info!("Shutting down...");
    library.shutdown();
    join_background(background).await;

    server_result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "nfoforge=trace,nfoforge_probe=debug,tower_http=debug".to_string()
        } else {
            "nfoforge=debug,nfoforge_probe=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Scan {
            video_type,
            force_detect_hdr,
            json,
        } => scan_once(video_type, force_detect_hdr, json, cli.config.as_deref()),
        Commands::Probe { file } => probe_file(&file, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate { config } => {
            validate_config(config.as_deref().or(cli.config.as_deref()))
        }
        Commands::Version => {
            println!("nfoforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn scan_once(
    category: VideoCategory,
    force_hdr_probe: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let roots = config.library.roots(category);
    if roots.is_empty() {
        anyhow::bail!("No {} library paths configured", category);
    }

    let scanner = Scanner::new(HdrProber::new(config.tools.ffprobe_path.clone()));
    let progress = ScanProgress::default();
    let records = scanner.scan(
        category,
        roots,
        force_hdr_probe,
        &progress,
        &CancellationToken::new(),
    )?;

    let views: Vec<BriefView> = records
        .iter()
        .enumerate()
        .map(|(id, r)| BriefView::new(id, r))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in &views {
        let mark = if view.completed { "✓" } else { "✗" };
        println!(
            "{} [{}] {} (nfo: {}, poster: {}, fanart: {}, clearlogo: {}, {})",
            mark,
            view.id,
            view.video_path.display(),
            view.nfo_status,
            view.poster_status,
            view.fanart_status,
            view.clearlogo_status,
            view.hdr_type,
        );
    }

    let complete = views.iter().filter(|v| v.completed).count();
    println!();
    println!(
        "{} records, {} complete, {} incomplete",
        views.len(),
        complete,
        views.len() - complete
    );

    Ok(())
}

fn probe_file(file: &Path, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let prober = HdrProber::new(config.tools.ffprobe_path);
    let hdr = prober
        .probe(file)
        .with_context(|| format!("Failed to probe {:?}", file))?;

    println!("File: {}", file.display());
    println!("HDR: {}", hdr);
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = nfoforge_probe::check_tools(config.tools.ffprobe_path.as_deref());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffprobe is missing. HDR detection will report SDR for every video.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  Provider: {} ({})",
                config.provider.base_url,
                if config.provider.api_key.is_empty() {
                    "no API key"
                } else {
                    "API key set"
                }
            );
            for category in VideoCategory::ALL {
                println!(
                    "  {} paths: {}",
                    category,
                    config.library.roots(category).len()
                );
            }
            println!("  Scan on start: {}", config.library.scan_on_start);
            println!(
                "  Auto update interval: {}s",
                config.library.auto_update_interval_secs
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
