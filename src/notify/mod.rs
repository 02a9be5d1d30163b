//! User notifications
//!
//! Messages reach the user through one of two backends:
//! - a desktop notification command, when the host provides one
//! - an on-page banner that fades out after the display time
//!
//! The backend is chosen per message from the capabilities handed in at
//! construction. A desktop command that fails to start falls back to a banner.

mod banner;
mod native;

pub use banner::{Banner, BannerBoard, BannerPhase, BannerRenderer, FADE_TIME};
pub use native::{CommandNotifier, DEFAULT_NOTIFY_PROGRAM};

/// Title attached to every notification
pub const NOTIFICATION_TITLE: &str = "Image Downloader";

/// Shows a transient message to the user
///
/// Implementations must not block and must tolerate many concurrent calls.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that prefers desktop notifications and falls back to banners
#[derive(Debug, Clone)]
pub struct Notifications {
    native: Option<CommandNotifier>,
    banners: BannerBoard,
}

impl Notifications {
    pub fn new(native: Option<CommandNotifier>, banners: BannerBoard) -> Self {
        Self { native, banners }
    }

    /// Banner-only notifier
    pub fn banners_only(banners: BannerBoard) -> Self {
        Self::new(None, banners)
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    pub fn banner_board(&self) -> &BannerBoard {
        &self.banners
    }
}

impl Notifier for Notifications {
    fn notify(&self, message: &str) {
        if let Some(native) = &self.native {
            match native.show(message) {
                Ok(()) => {
                    tracing::debug!("Desktop notification sent: {}", message);
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        "Desktop notification via {} failed ({}), showing banner instead",
                        native.program().display(),
                        e
                    );
                }
            }
        }

        self.banners.show(message);
    }
}
