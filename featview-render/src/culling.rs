//! Off-screen culling of features.
//!
//! Tracks which features have left the visible x window so the positional
//! phase can hide them once and then skip them until they come back.

use std::collections::HashSet;

use featview_core::{FeatureKey, Span};

/// Visibility transition for one feature in one positional pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// On screen now and on the previous pass
    Visible,
    /// Back on screen after having exited
    Entered,
    /// Left the window on this pass
    ExitedNow,
    /// Still off screen, nothing to do
    Skip,
}

impl Visibility {
    pub fn should_draw(self) -> bool {
        matches!(self, Visibility::Visible | Visibility::Entered)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullingStats {
    pub exits: u64,
    pub entries: u64,
}

#[derive(Debug, Default)]
pub struct OffscreenTracker {
    offscreen: HashSet<FeatureKey>,
    stats: CullingStats,
}

impl OffscreenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `key` given its span and the visible `[lo, hi]` window.
    pub fn observe(&mut self, key: FeatureKey, span: Span, lo: f64, hi: f64) -> Visibility {
        let on_screen = span.clip(lo, hi).is_some();
        let was_offscreen = self.offscreen.contains(&key);
        match (on_screen, was_offscreen) {
            (true, false) => Visibility::Visible,
            (true, true) => {
                self.offscreen.remove(&key);
                self.stats.entries += 1;
                Visibility::Entered
            }
            (false, false) => {
                self.offscreen.insert(key);
                self.stats.exits += 1;
                Visibility::ExitedNow
            }
            (false, true) => Visibility::Skip,
        }
    }

    pub fn is_offscreen(&self, key: &FeatureKey) -> bool {
        self.offscreen.contains(key)
    }

    pub fn offscreen_count(&self) -> usize {
        self.offscreen.len()
    }

    pub fn stats(&self) -> CullingStats {
        self.stats
    }

    /// Forget features of traces that are no longer drawn.
    pub fn retain<F: FnMut(&FeatureKey) -> bool>(&mut self, keep: F) {
        self.offscreen.retain(keep);
    }

    pub fn clear(&mut self) {
        self.offscreen.clear();
        self.stats = CullingStats::default();
    }
}
