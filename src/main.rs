//! Image Gleaner main entry point
//!
//! Command-line front end: scans a page, downloads its images, or watches it
//! and renders the overlay to the terminal.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use image_gleaner::config::{load_config_with_hash, Config};
use image_gleaner::notify::{Banner, BannerBoard, NOTIFICATION_TITLE};
use image_gleaner::session::{HostCapabilities, ScanOutcome, Session, SessionCommand, SessionEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Image Gleaner: finds image links on a page and downloads them
///
/// PAGE is an http(s) URL or the path of a local HTML file.
#[derive(Parser, Debug)]
#[command(name = "image-gleaner")]
#[command(version)]
#[command(about = "Find and download the images a page links to", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the page once and list its image links
    Scan { page: String },

    /// Download every image the page currently links to
    Download { page: String },

    /// Keep scanning the page and accept commands on stdin
    Watch { page: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    match cli.command {
        Command::Scan { page } => handle_scan(&config, &page).await,
        Command::Download { page } => handle_download(&config, &page).await,
        Command::Watch { page } => handle_watch(&config, &page).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_gleaner=info,warn"),
            1 => EnvFilter::new("image_gleaner=debug,info"),
            2 => EnvFilter::new("image_gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn render_banner(banner: &Banner) {
    eprintln!("[{}] {}", NOTIFICATION_TITLE, banner.message);
}

/// Builds a session for the page with everything the host offers
fn open_session(config: &Config, page: &str) -> anyhow::Result<(Session, HostCapabilities)> {
    let banners =
        BannerBoard::new(config.notifications.display_time()).with_renderer(Arc::new(render_banner));
    Session::open(config, page, banners).with_context(|| format!("Failed to open {}", page))
}

/// Handles `scan`: one scan, then prints the gate verdict and the candidates
async fn handle_scan(config: &Config, page: &str) -> anyhow::Result<()> {
    let (mut session, _) = open_session(config, page)?;

    match session.scan_cycle().await {
        ScanOutcome::Unavailable => bail!("Could not load {}", session.location()),
        ScanOutcome::Disallowed => {
            println!("{}: host is not on the allow-list", session.location());
        }
        ScanOutcome::Scanned { candidates, .. } => {
            println!("{}: {}", session.location(), session.overlay().bulk());
            for (index, url) in candidates.iter().enumerate() {
                println!("  [{}] {}", index, url);
            }
        }
    }

    Ok(())
}

/// Handles `download`: a bulk download of what the page shows right now
///
/// Fails when any image could not be saved.
async fn handle_download(config: &Config, page: &str) -> anyhow::Result<()> {
    let (mut session, _) = open_session(config, page)?;

    match session.scan_cycle().await {
        ScanOutcome::Unavailable => bail!("Could not load {}", session.location()),
        ScanOutcome::Disallowed => bail!("{}: host is not on the allow-list", session.location()),
        ScanOutcome::Scanned { .. } => {}
    }

    tracing::info!(
        "Downloading with the {} provider",
        session.coordinator().provider_name()
    );
    let Some(handle) = session.activate_bulk().await else {
        println!("No images to download on {}", session.location());
        return Ok(());
    };

    let report = handle.wait().await;
    session.coordinator().flush().await;

    match report {
        Some(report) if report.had_failure() => bail!(
            "{} of {} images could not be downloaded",
            report.failed,
            report.total
        ),
        Some(report) => {
            println!(
                "Saved {} images to {}",
                report.succeeded(),
                config.download.output_dir
            );
            Ok(())
        }
        None => bail!("Download batch ended before reporting"),
    }
}

/// Handles `watch`: runs the session until ctrl-c or `quit`
async fn handle_watch(config: &Config, page: &str) -> anyhow::Result<()> {
    let (session, capabilities) = open_session(config, page)?;
    let coordinator = session.coordinator().clone();

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::channel(16);

    tokio::spawn(render_events(event_rx));

    // Holding a sender here also keeps the session alive without stdin commands
    let quit_tx = command_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = quit_tx.send(SessionCommand::Quit).await;
        }
    });

    if capabilities.command_menu {
        println!("Commands: scan, all, get <n>, list, quit");
        tokio::spawn(read_commands(command_tx));
    }

    session.with_events(event_tx).run(command_rx).await;
    coordinator.flush().await;

    Ok(())
}

/// Forwards stdin lines to the session as commands
async fn read_commands(commands: mpsc::Sender<SessionCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                let _ = commands.send(SessionCommand::Quit).await;
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to read command: {}", e);
                return;
            }
        };

        match parse_command(&line) {
            Some(command) => {
                if commands.send(command).await.is_err() {
                    return;
                }
            }
            None if line.trim().is_empty() => {}
            None => eprintln!("Unknown command: {}", line.trim()),
        }
    }
}

fn parse_command(line: &str) -> Option<SessionCommand> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("scan", None) => SessionCommand::Scan,
        ("all", None) => SessionCommand::DownloadAll,
        ("list", None) => SessionCommand::ListLinks,
        ("quit" | "exit", None) => SessionCommand::Quit,
        ("get", Some(index)) => SessionCommand::DownloadLink(index.parse().ok()?),
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(command)
}

/// Prints overlay changes to stdout
async fn render_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::ControlsAdded(controls) => {
                for control in controls {
                    println!("+ [Download] {}", control.url);
                }
            }
            SessionEvent::ControlsRemoved(count) => {
                println!("- {} link controls detached", count);
            }
            SessionEvent::BulkChanged(bulk) => println!("* {}", bulk),
            SessionEvent::Disallowed(host) => {
                println!("* host {:?} is not on the allow-list", host);
            }
            SessionEvent::PageUnavailable(_) => {}
            SessionEvent::BatchStarted { id, total } => {
                println!("> batch {} started with {} images", id, total);
            }
            SessionEvent::Links(links) => {
                if links.is_empty() {
                    println!("No link controls");
                }
                for (index, link) in links.iter().enumerate() {
                    println!("  [{}] {}", index, link.url);
                }
            }
            SessionEvent::UnknownLink(index) => println!("No link control [{}]", index),
        }
    }
}
