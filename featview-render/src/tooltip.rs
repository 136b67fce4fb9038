//! Hover tooltips.
//!
//! The controller holds at most one tooltip. Content depends on the feature
//! kind; the box is placed at a fixed offset from the pointer and hidden as
//! soon as the pointer leaves the feature.

use std::fmt;

use featview_core::feature::{Dssp, Locus, Pin, Poly};
use featview_core::{Feature, FeatureKey, FeatureKind, InternalTrace};

/// Offset of the tooltip box from the pointer, in pixels
pub const TOOLTIP_OFFSET: (f64, f64) = (12.0, 12.0);

/// Kind-specific part of a tooltip
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipDetail {
    Range { start: i64, end: i64 },
    Sample { position: i64, value: Option<f64> },
    Position { position: i64 },
    Structure { code: char, start: i64, end: i64 },
}

impl fmt::Display for TooltipDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TooltipDetail::Range { start, end } if start == end => write!(f, "Position: {}", start),
            TooltipDetail::Range { start, end } => write!(f, "Range: {}-{}", start, end),
            TooltipDetail::Sample { position, value: Some(v) } => write!(f, "Position: {}, value: {}", position, v),
            TooltipDetail::Sample { position, value: None } => write!(f, "Position: {}", position),
            TooltipDetail::Position { position } => write!(f, "Position: {}", position),
            TooltipDetail::Structure { code, start, end } => write!(f, "DSSP {}: {}-{}", code, start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub key: FeatureKey,
    pub trace: String,
    pub label: Option<String>,
    pub kind: FeatureKind,
    pub detail: TooltipDetail,
    /// Top-left corner of the box
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    /// Plain-text body, one line per field. The trace line carries its id.
    pub fn text(&self) -> String {
        let mut lines = vec![format!("Trace: {} ({})", self.trace, self.key.trace)];
        if let Some(label) = &self.label {
            lines.push(format!("Feature: {}", label));
        } else {
            lines.push(format!("Feature: {}", self.kind));
        }
        lines.push(self.detail.to_string());
        lines.join("\n")
    }
}

fn detail_for(feature: &Feature, pointer_position: i64) -> TooltipDetail {
    match feature {
        Feature::Locus(Locus { start, end, .. }) => TooltipDetail::Range { start: *start, end: *end },
        Feature::Continuous(c) => TooltipDetail::Sample {
            position: pointer_position,
            value: c.value_at(pointer_position),
        },
        Feature::Pin(Pin { position, .. }) | Feature::Poly(Poly { position, .. }) => {
            TooltipDetail::Position { position: *position }
        }
        Feature::Dssp(Dssp { start, end, code, .. }) => TooltipDetail::Structure {
            code: code.letter(),
            start: *start,
            end: *end,
        },
    }
}

#[derive(Debug, Default)]
pub struct TooltipController {
    current: Option<Tooltip>,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(&mut self, trace: &InternalTrace, index: usize, pointer: (f64, f64), pointer_position: i64) {
        let Some(feature) = trace.feature(index) else {
            log::debug!("Hover on missing feature {} of trace {}", index, trace.id);
            self.current = None;
            return;
        };
        self.current = Some(Tooltip {
            key: FeatureKey::new(trace.id, index),
            trace: trace.label.clone(),
            label: feature.label().map(str::to_string),
            kind: feature.kind(),
            detail: detail_for(feature, pointer_position),
            x: pointer.0 + TOOLTIP_OFFSET.0,
            y: pointer.1 + TOOLTIP_OFFSET.1,
        });
    }

    /// Follow the pointer; continuous features also refresh the sample shown.
    pub fn on_move(&mut self, trace: &InternalTrace, index: usize, pointer: (f64, f64), pointer_position: i64) {
        let key = FeatureKey::new(trace.id, index);
        match self.current.as_mut() {
            Some(tooltip) if tooltip.key == key => {
                tooltip.x = pointer.0 + TOOLTIP_OFFSET.0;
                tooltip.y = pointer.1 + TOOLTIP_OFFSET.1;
                if let Some(feature) = trace.feature(index) {
                    tooltip.detail = detail_for(feature, pointer_position);
                }
            }
            _ => self.on_enter(trace, index, pointer, pointer_position),
        }
    }

    pub fn on_leave(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featview_core::feature::Continuous;
    use featview_core::{FeatureStyle, Trace, TraceModel};

    fn model() -> TraceModel {
        let locus = Feature::Locus(Locus {
            start: 2,
            end: 4,
            height: None,
            style: FeatureStyle { label: Some("domain".into()), ..Default::default() },
        });
        let curve = Feature::Continuous(Continuous {
            values: vec![1.0, 2.5, 3.0],
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        });
        TraceModel::from_traces(vec![Trace::new("Domains").with_features(vec![locus, curve])])
    }

    #[test]
    fn test_locus_tooltip_and_leave() {
        let model = model();
        let trace = model.get_trace(0).unwrap();
        let mut controller = TooltipController::new();
        controller.on_enter(trace, 0, (100.0, 20.0), 3);
        let tip = controller.current().unwrap();
        assert_eq!((tip.x, tip.y), (112.0, 32.0));
        assert_eq!(tip.text(), "Trace: Domains (0)\nFeature: domain\nRange: 2-4");
        controller.on_leave();
        assert!(!controller.is_visible());
    }

    #[test]
    fn test_continuous_sample_follows_pointer() {
        let model = model();
        let trace = model.get_trace(0).unwrap();
        let mut controller = TooltipController::new();
        controller.on_enter(trace, 1, (0.0, 0.0), 1);
        controller.on_move(trace, 1, (10.0, 0.0), 2);
        let tip = controller.current().unwrap();
        assert_eq!(tip.detail, TooltipDetail::Sample { position: 2, value: Some(2.5) });
        assert_eq!(tip.x, 22.0);
        assert!(tip.text().ends_with("Position: 2, value: 2.5"));
    }

    #[test]
    fn test_nested_trace_is_named_by_id() {
        let pin = Feature::Pin(Pin { position: 5, radius: None, adjust_to_width: false, style: FeatureStyle::default() });
        let model = TraceModel::from_traces(vec![
            Trace::new("Parent").with_nested(vec![Trace::new("Child").with_features(vec![pin])])
        ]);
        let child = model.get_trace(1).unwrap();
        let mut controller = TooltipController::new();
        controller.on_enter(child, 0, (0.0, 0.0), 5);
        assert_eq!(controller.current().unwrap().text(), "Trace: Child (1)\nFeature: pin\nPosition: 5");
    }
}
