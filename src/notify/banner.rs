use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How long a banner takes to fade out once its display time is over
pub const FADE_TIME: Duration = Duration::from_millis(300);

/// Lifecycle phase of a banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerPhase {
    /// Fully shown
    Visible,
    /// Display time elapsed, fading out
    Fading,
}

/// A transient message shown on the page overlay
#[derive(Debug, Clone)]
pub struct Banner {
    pub id: u64,
    pub message: String,
    pub phase: BannerPhase,
    pub shown_at: DateTime<Utc>,
}

/// Callback invoked once when a banner first appears
pub type BannerRenderer = Arc<dyn Fn(&Banner) + Send + Sync>;

#[derive(Debug)]
struct LiveBanner {
    id: u64,
    message: String,
    shown_at: DateTime<Utc>,
    created: Instant,
}

#[derive(Debug, Default)]
struct BoardState {
    next_id: u64,
    banners: Vec<LiveBanner>,
}

/// The set of banners currently on screen
///
/// Each banner stays visible for the display time, fades for
/// [`FADE_TIME`], and then removes itself. Any number of banners may be
/// live at once. Expiry is evaluated against the tokio clock whenever the
/// board is observed, so no timer task is needed per banner.
#[derive(Clone)]
pub struct BannerBoard {
    state: Arc<Mutex<BoardState>>,
    display_time: Duration,
    renderer: Option<BannerRenderer>,
}

impl fmt::Debug for BannerBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerBoard")
            .field("display_time", &self.display_time)
            .field("live", &self.len())
            .finish()
    }
}

impl BannerBoard {
    pub fn new(display_time: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::default())),
            display_time,
            renderer: None,
        }
    }

    /// Sets the callback that draws newly shown banners
    pub fn with_renderer(mut self, renderer: BannerRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Puts a new banner on screen and returns its id
    pub fn show(&self, message: &str) -> u64 {
        let banner = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            let now = Instant::now();
            prune(&mut state.banners, now, self.display_time);

            let id = state.next_id;
            state.next_id += 1;

            let live = LiveBanner {
                id,
                message: message.to_string(),
                shown_at: Utc::now(),
                created: now,
            };
            let banner = Banner {
                id,
                message: live.message.clone(),
                phase: BannerPhase::Visible,
                shown_at: live.shown_at,
            };
            state.banners.push(live);
            banner
        };

        tracing::debug!("Banner {} shown: {}", banner.id, banner.message);
        if let Some(renderer) = &self.renderer {
            renderer(&banner);
        }
        banner.id
    }

    /// Returns the banners still on screen, dropping expired ones
    pub fn banners(&self) -> Vec<Banner> {
        let now = Instant::now();
        let display_time = self.display_time;
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        prune(&mut state.banners, now, display_time);

        state
            .banners
            .iter()
            .map(|b| Banner {
                id: b.id,
                message: b.message.clone(),
                phase: if now.duration_since(b.created) < display_time {
                    BannerPhase::Visible
                } else {
                    BannerPhase::Fading
                },
                shown_at: b.shown_at,
            })
            .collect()
    }

    /// Number of banners still on screen
    pub fn len(&self) -> usize {
        self.banners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops banners whose display and fade time have both elapsed
fn prune(banners: &mut Vec<LiveBanner>, now: Instant, display_time: Duration) {
    banners.retain(|b| now.duration_since(b.created) < display_time + FADE_TIME);
}
