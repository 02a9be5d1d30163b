//! Session: keeps the overlay of one page in sync and dispatches user actions
//!
//! A session scans the page once at start, then on every tick of the scan
//! interval and on manual request. Scans never touch download state, and
//! downloads never hold up scans.

mod capabilities;

pub use capabilities::HostCapabilities;

use crate::config::Config;
use crate::download::{BatchHandle, DownloadCoordinator, DownloadOutcome};
use crate::notify::{BannerBoard, Notifier};
use crate::overlay::{BulkControl, LinkControl, Overlay};
use crate::page::{build_http_client, open_source, Document, PageSource};
use crate::scanner::{scan, CandidateSet, ScanRules};
use crate::url::is_domain_allowed;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// User actions a running session reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Scan right away (only with a command menu)
    Scan,
    /// Activate the bulk control
    DownloadAll,
    /// Activate the link control with this index
    DownloadLink(usize),
    /// Report the current link controls
    ListLinks,
    Quit,
}

/// Changes a front end may want to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// New link controls were attached, in attach order
    ControlsAdded(Vec<LinkControl>),
    /// Controls for vanished anchors were detached
    ControlsRemoved(usize),
    /// The bulk control's counter or visibility changed
    BulkChanged(BulkControl),
    /// The page host is not on the allow-list
    Disallowed(String),
    /// The page could not be loaded this cycle
    PageUnavailable(String),
    /// A batch was dispatched
    BatchStarted { id: u64, total: usize },
    /// Answer to [`SessionCommand::ListLinks`]
    Links(Vec<LinkControl>),
    /// A link index that has no control
    UnknownLink(usize),
}

/// Result of one scan cycle
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The page host is not on the allow-list; the bulk control is hidden
    Disallowed,
    /// The page could not be loaded; nothing changed
    Unavailable,
    /// The overlay was synced with the page
    Scanned {
        candidates: CandidateSet,
        added: usize,
        removed: usize,
    },
}

/// The watcher for one page
pub struct Session {
    source: Box<dyn PageSource>,
    allow_list: Vec<String>,
    rules: ScanRules,
    overlay: Overlay,
    coordinator: Arc<DownloadCoordinator>,
    notifier: Arc<dyn Notifier>,
    scan_interval: Duration,
    command_menu: bool,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl Session {
    /// Creates a session for a page
    ///
    /// The session starts without a command menu and without an event
    /// channel.
    pub fn new(
        source: Box<dyn PageSource>,
        config: &Config,
        coordinator: Arc<DownloadCoordinator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let rules = ScanRules::from(&config.scanner);
        Self {
            source,
            allow_list: config.scanner.allowed_domains.clone(),
            overlay: Overlay::new(rules.clone()),
            rules,
            coordinator,
            notifier,
            scan_interval: config.scanner.scan_interval(),
            command_menu: false,
            events: None,
        }
    }

    /// Wires a session from configuration and host capabilities
    ///
    /// Notifications fall back to `banners` and downloads to the best-effort
    /// provider when the corresponding capability is missing.
    pub fn from_config(
        source: Box<dyn PageSource>,
        config: &Config,
        capabilities: &HostCapabilities,
        client: &Client,
        banners: BannerBoard,
    ) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(capabilities.notifier(banners));
        let provider =
            capabilities.download_provider(client, Path::new(&config.download.output_dir));
        let coordinator = Arc::new(DownloadCoordinator::new(
            provider,
            notifier.clone(),
            config.download.stagger(),
        ));

        Self::new(source, config, coordinator, notifier).with_command_menu(capabilities.command_menu)
    }

    /// Opens a session for a page location with the capabilities the host offers
    ///
    /// `page` is an `http(s)://` URL or the path of a local HTML file.
    pub fn open(
        config: &Config,
        page: &str,
        banners: BannerBoard,
    ) -> crate::Result<(Self, HostCapabilities)> {
        let client = build_http_client(&config.user_agent)?;
        let source = open_source(page, &client)?;
        let capabilities = HostCapabilities::probe(config, &client);

        let session = Self::from_config(source, config, &capabilities, &client, banners);
        Ok((session, capabilities))
    }

    pub fn with_command_menu(mut self, enabled: bool) -> Self {
        self.command_menu = enabled;
        self
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn coordinator(&self) -> &Arc<DownloadCoordinator> {
        &self.coordinator
    }

    pub fn location(&self) -> String {
        self.source.location()
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            // A front end that went away just stops receiving
            let _ = events.send(event);
        }
    }

    fn hide_bulk(&mut self) {
        if self.overlay.hide_bulk_control() {
            self.emit(SessionEvent::BulkChanged(self.overlay.bulk().clone()));
        }
    }

    fn refresh_bulk(&mut self, candidates: &CandidateSet) {
        if self.overlay.refresh_bulk_control(candidates) {
            self.emit(SessionEvent::BulkChanged(self.overlay.bulk().clone()));
        }
    }

    /// Reloads the page and applies the domain gate
    async fn load_gated(&mut self) -> Result<Document, ScanOutcome> {
        let document = match self.source.load().await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping scan of {}: {}", self.source.location(), e);
                self.emit(SessionEvent::PageUnavailable(e.to_string()));
                return Err(ScanOutcome::Unavailable);
            }
        };

        let host = document.host();
        if !is_domain_allowed(&host, &self.allow_list) {
            tracing::debug!("Host {:?} is not on the allow-list", host);
            self.hide_bulk();
            self.emit(SessionEvent::Disallowed(host));
            return Err(ScanOutcome::Disallowed);
        }

        Ok(document)
    }

    /// Runs one scan: reload, gate, bind link controls, refresh the counter
    pub async fn scan_cycle(&mut self) -> ScanOutcome {
        let document = match self.load_gated().await {
            Ok(document) => document,
            Err(outcome) => return outcome,
        };

        let removed = self.overlay.retain_anchors(&document);
        if removed > 0 {
            self.emit(SessionEvent::ControlsRemoved(removed));
        }

        let before = self.overlay.link_controls().len();
        let added = self.overlay.bind_document(&document);
        if added > 0 {
            let new_controls = self.overlay.link_controls()[before..].to_vec();
            self.emit(SessionEvent::ControlsAdded(new_controls));
        }

        let candidates = scan(&document, &self.rules);
        self.refresh_bulk(&candidates);

        tracing::debug!(
            "Scanned {}: {} candidates, {} controls added, {} removed",
            self.source.location(),
            candidates.len(),
            added,
            removed
        );

        ScanOutcome::Scanned {
            candidates,
            added,
            removed,
        }
    }

    /// Downloads the image behind the `index`th link control
    ///
    /// Returns `None` when there is no such control. The download runs on
    /// its own task.
    pub fn activate_link(&self, index: usize) -> Option<JoinHandle<DownloadOutcome>> {
        let url = self.overlay.activate_link(index)?;
        let coordinator = self.coordinator.clone();

        Some(tokio::spawn(async move {
            coordinator.download_one(&url).await
        }))
    }

    /// Downloads every image currently on the page
    ///
    /// The candidate set is recomputed from a fresh load at activation time.
    /// Nothing happens when the page cannot be loaded, its host is not
    /// allowed, or it has no image links.
    pub async fn activate_bulk(&mut self) -> Option<BatchHandle> {
        let document = self.load_gated().await.ok()?;

        let candidates = scan(&document, &self.rules);
        self.refresh_bulk(&candidates);
        if candidates.is_empty() {
            return None;
        }

        self.notifier.notify(&format!(
            "Starting download of {} images...",
            candidates.len()
        ));

        let handle = self.coordinator.download_batch(candidates.into_urls())?;
        self.emit(SessionEvent::BatchStarted {
            id: handle.id(),
            total: handle.total(),
        });
        Some(handle)
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Scan => {
                if self.command_menu {
                    self.scan_cycle().await;
                } else {
                    tracing::debug!("Manual scan requested without a command menu");
                }
            }
            SessionCommand::DownloadAll => {
                self.activate_bulk().await;
            }
            SessionCommand::DownloadLink(index) => {
                if self.activate_link(index).is_none() {
                    self.emit(SessionEvent::UnknownLink(index));
                }
            }
            SessionCommand::ListLinks => {
                self.emit(SessionEvent::Links(self.overlay.link_controls().to_vec()));
            }
            SessionCommand::Quit => {}
        }
    }

    /// Runs the session until `Quit` arrives or every command sender is gone
    ///
    /// Batches still in flight keep running after this returns.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        tracing::info!("Watching {}", self.source.location());
        self.scan_cycle().await;

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.scan_interval, self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.scan_cycle().await;
                }
                command = commands.recv() => match command {
                    Some(SessionCommand::Quit) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
            }
        }

        tracing::info!("Stopped watching {}", self.source.location());
    }
}
