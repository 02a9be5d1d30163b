//! Overlay: the controls injected into the watched page
//!
//! The overlay keeps one download control per image anchor and a single
//! bulk control whose counter tracks the current candidate set. It holds
//! state only; the binary decides how to render it.

mod controls;

pub use controls::{BulkControl, BulkState, LinkControl};

use crate::page::{Anchor, AnchorKey, Document};
use crate::scanner::{CandidateSet, ScanRules};
use std::collections::HashSet;

/// Per-link and bulk controls for one page
#[derive(Debug, Clone)]
pub struct Overlay {
    rules: ScanRules,
    links: Vec<LinkControl>,
    bound: HashSet<AnchorKey>,
    bulk: BulkControl,
}

impl Overlay {
    pub fn new(rules: ScanRules) -> Self {
        Self {
            rules,
            links: Vec::new(),
            bound: HashSet::new(),
            bulk: BulkControl::default(),
        }
    }

    /// Attaches a download control after an image anchor
    ///
    /// Binding the same anchor again does nothing. Anchors that are excluded
    /// or do not link to an image get no control.
    ///
    /// # Returns
    ///
    /// `true` if a new control was attached
    pub fn bind_link_button(&mut self, anchor: &Anchor) -> bool {
        if !self.rules.accepts(anchor) || self.bound.contains(&anchor.key) {
            return false;
        }

        self.bound.insert(anchor.key.clone());
        self.links.push(LinkControl {
            anchor: anchor.key.clone(),
            url: anchor.target().to_string(),
        });
        tracing::debug!("Attached download control to {}", anchor.key);
        true
    }

    /// Binds every anchor of the document, returning how many controls are new
    pub fn bind_document(&mut self, document: &Document) -> usize {
        document
            .anchors
            .iter()
            .filter(|anchor| self.bind_link_button(anchor))
            .count()
    }

    /// Detaches controls whose anchors are gone from the document
    ///
    /// Returns how many controls were removed.
    pub fn retain_anchors(&mut self, document: &Document) -> usize {
        let present: HashSet<&AnchorKey> = document.anchors.iter().map(|a| &a.key).collect();
        let before = self.links.len();

        self.links.retain(|control| present.contains(&control.anchor));
        self.bound.retain(|key| present.contains(key));

        before - self.links.len()
    }

    /// Sets the bulk counter from a fresh scan
    ///
    /// The control is hidden when the set is empty and visible otherwise.
    /// Returns true if the counter or visibility changed.
    pub fn refresh_bulk_control(&mut self, candidates: &CandidateSet) -> bool {
        let changed = self.bulk.update(candidates.len());
        if changed {
            tracing::info!("Bulk control now {}", self.bulk);
        }
        changed
    }

    /// Hides the bulk control, as on a page outside the allow-list
    pub fn hide_bulk_control(&mut self) -> bool {
        self.bulk.update(0)
    }

    /// Returns the URL to download for the `index`th link control
    ///
    /// The activation never navigates to the link; the caller only downloads.
    pub fn activate_link(&self, index: usize) -> Option<String> {
        self.links.get(index).map(|control| control.url.clone())
    }

    pub fn bulk(&self) -> &BulkControl {
        &self.bulk
    }

    /// Link controls in the order they were attached
    pub fn link_controls(&self) -> &[LinkControl] {
        &self.links
    }

    pub fn is_bound(&self, key: &AnchorKey) -> bool {
        self.bound.contains(key)
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(ScanRules::default())
    }
}
