use crate::config::{Config, DownloadMode};
use crate::download::{BestEffortProvider, DownloadProvider, HttpDownloadProvider};
use crate::notify::{BannerBoard, CommandNotifier, Notifications};
use reqwest::Client;
use std::fmt;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

/// What the host environment offers beyond the basics
///
/// Every capability is optional. Missing ones are replaced by fallbacks:
/// banners instead of desktop notifications, best-effort downloads instead
/// of downloads with completion reporting, no manual scan command.
#[derive(Clone, Default)]
pub struct HostCapabilities {
    /// Desktop notification command
    pub native_notifications: Option<CommandNotifier>,

    /// Download provider that reports real completion
    pub privileged_downloads: Option<Arc<dyn DownloadProvider>>,

    /// Whether the user can issue commands such as a manual scan
    pub command_menu: bool,
}

impl HostCapabilities {
    /// Detects capabilities from configuration and the environment
    pub fn probe(config: &Config, client: &Client) -> Self {
        let native_notifications = CommandNotifier::from_config(&config.notifications);

        let privileged_downloads: Option<Arc<dyn DownloadProvider>> = match config.download.mode {
            DownloadMode::Http => Some(Arc::new(HttpDownloadProvider::new(
                client.clone(),
                &config.download.output_dir,
            ))),
            DownloadMode::BestEffort => None,
        };

        let capabilities = Self {
            native_notifications,
            privileged_downloads,
            command_menu: io::stdin().is_terminal(),
        };
        tracing::debug!("Host capabilities: {:?}", capabilities);
        capabilities
    }

    /// Builds the notifier, falling back to banners
    pub fn notifier(&self, banners: BannerBoard) -> Notifications {
        Notifications::new(self.native_notifications.clone(), banners)
    }

    /// Returns the privileged provider, or a best-effort one writing to `output_dir`
    pub fn download_provider(&self, client: &Client, output_dir: &Path) -> Arc<dyn DownloadProvider> {
        match &self.privileged_downloads {
            Some(provider) => provider.clone(),
            None => Arc::new(BestEffortProvider::new(Arc::new(HttpDownloadProvider::new(
                client.clone(),
                output_dir,
            )))),
        }
    }
}

impl fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCapabilities")
            .field(
                "native_notifications",
                &self.native_notifications.as_ref().map(|n| n.program().to_path_buf()),
            )
            .field(
                "privileged_downloads",
                &self.privileged_downloads.as_ref().map(|p| p.name()),
            )
            .field("command_menu", &self.command_menu)
            .finish()
    }
}
