//! Selection publishing.
//!
//! Clicks produce a [`SelectionContext`] (or `None` to clear). Contexts are
//! pushed into a single-slot channel: a newer publish replaces the pending
//! one, and delivery happens only once the slot has been quiet for the
//! debounce interval. Time is passed in explicitly so callers drive it from
//! their own clock.

use serde::{Deserialize, Serialize};

use featview_core::{FeatureKey, Span, TraceId};

pub const SELECTION_DEBOUNCE_MS: u64 = 300;

/// Feature selected by a click and the range it highlights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionContext {
    pub trace: TraceId,
    pub feature: usize,
    pub range: Span,
}

impl SelectionContext {
    pub fn new(key: FeatureKey, range: Span) -> Self {
        Self { trace: key.trace, feature: key.index, range }
    }

    pub fn key(&self) -> FeatureKey {
        FeatureKey::new(self.trace, self.feature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    selection: Option<SelectionContext>,
    due_ms: u64,
}

#[derive(Debug)]
pub struct SelectionChannel {
    debounce_ms: u64,
    pending: Option<Pending>,
    delivered: Option<SelectionContext>,
}

impl Default for SelectionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionChannel {
    pub fn new() -> Self {
        Self::with_debounce(SELECTION_DEBOUNCE_MS)
    }

    pub fn with_debounce(debounce_ms: u64) -> Self {
        Self { debounce_ms, pending: None, delivered: None }
    }

    /// Replace whatever is pending and restart the quiet period.
    pub fn publish(&mut self, selection: Option<SelectionContext>, now_ms: u64) {
        self.pending = Some(Pending {
            selection,
            due_ms: now_ms.saturating_add(self.debounce_ms),
        });
    }

    /// Deliver the pending value once its quiet period has elapsed.
    ///
    /// Returns `Some(value)` exactly once per settled publish, where the
    /// value itself is `None` for a cleared selection.
    pub fn poll(&mut self, now_ms: u64) -> Option<Option<SelectionContext>> {
        match self.pending {
            Some(pending) if now_ms >= pending.due_ms => {
                self.pending = None;
                self.delivered = pending.selection;
                Some(pending.selection)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last delivered selection.
    pub fn current(&self) -> Option<&SelectionContext> {
        self.delivered.as_ref()
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.delivered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(index: usize, start: f64) -> SelectionContext {
        SelectionContext::new(FeatureKey::new(0, index), Span::new(start, start + 1.0))
    }

    #[test]
    fn test_most_recent_wins() {
        let mut channel = SelectionChannel::new();
        channel.publish(Some(ctx(0, 1.5)), 0);
        channel.publish(Some(ctx(1, 4.5)), 100);
        assert_eq!(channel.poll(350), None);
        assert_eq!(channel.poll(400), Some(Some(ctx(1, 4.5))));
        assert_eq!(channel.poll(1000), None);
        assert_eq!(channel.current(), Some(&ctx(1, 4.5)));
    }

    #[test]
    fn test_clear_is_delivered() {
        let mut channel = SelectionChannel::with_debounce(10);
        channel.publish(Some(ctx(0, 1.5)), 0);
        channel.poll(10);
        channel.publish(None, 20);
        assert!(channel.is_pending());
        assert_eq!(channel.poll(30), Some(None));
        assert_eq!(channel.current(), None);
    }

    #[test]
    fn test_serializes_with_range() {
        let json = serde_json::to_value(ctx(2, 9.5)).unwrap();
        assert_eq!(json["trace"], 0);
        assert_eq!(json["feature"], 2);
        assert_eq!(json["range"]["start"], 9.5);
        assert_eq!(json["range"]["end"], 10.5);
    }
}
