use serde::Deserialize;
use std::time::Duration;

/// Allow-list entry that enables scanning on every host
pub const WILDCARD_DOMAIN: &str = "*";

/// Main configuration structure for Image Gleaner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Link scanning configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Hosts on which scanning is active (`"*"` for all)
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Anchors carrying this class link to a detail page, not a raw image
    #[serde(rename = "thumbnail-class")]
    pub thumbnail_class: String,

    /// Time between periodic scans (milliseconds)
    #[serde(rename = "scan-interval")]
    pub scan_interval: u64,
}

impl ScannerConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec![WILDCARD_DOMAIN.to_string()],
            thumbnail_class: "fileThumb".to_string(),
            scan_interval: 2000,
        }
    }
}

/// How downloaded files reach the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadMode {
    /// Stream each image and report its real outcome
    Http,
    /// Hand each image off and report success immediately
    BestEffort,
}

/// Download behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory images are saved into
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Delay between successive batch item submissions (milliseconds)
    pub stagger: u64,

    /// Which download provider to use
    pub mode: DownloadMode,
}

impl DownloadConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: "./downloads".to_string(),
            stagger: 500,
            mode: DownloadMode::Http,
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays on screen (milliseconds)
    #[serde(rename = "display-time")]
    pub display_time: u64,

    /// Desktop notification program. `None` probes `PATH` for `notify-send`,
    /// an empty string disables native notifications.
    pub command: Option<String>,
}

impl NotificationConfig {
    pub fn display_time(&self) -> Duration {
        Duration::from_millis(self.display_time)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_time: 5000,
            command: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name sent in the User-Agent header
    pub name: String,

    /// Version sent in the User-Agent header
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "ImageGleaner".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
