use crate::page::AnchorKey;
use std::fmt;

/// Visibility of the bulk download control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkState {
    #[default]
    Hidden,
    Visible,
}

/// The page-wide "Bulk Download (N)" control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkControl {
    pub state: BulkState,
    pub count: usize,
}

impl BulkControl {
    pub fn is_visible(&self) -> bool {
        self.state == BulkState::Visible
    }

    /// The counter shown inside the label
    pub fn counter_text(&self) -> String {
        self.count.to_string()
    }

    pub fn label(&self) -> String {
        format!("Bulk Download ({})", self.counter_text())
    }

    /// Applies a new candidate count, returning true if anything changed
    pub(crate) fn update(&mut self, count: usize) -> bool {
        let state = if count == 0 {
            BulkState::Hidden
        } else {
            BulkState::Visible
        };
        let changed = self.state != state || self.count != count;
        self.state = state;
        self.count = count;
        changed
    }
}

impl fmt::Display for BulkControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            BulkState::Visible => write!(f, "{}", self.label()),
            BulkState::Hidden => write!(f, "(bulk download hidden)"),
        }
    }
}

/// A download control placed right after one image anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkControl {
    /// The anchor the control is attached to
    pub anchor: AnchorKey,

    /// Image URL downloaded when the control is activated
    pub url: String,
}
