use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::Feature;

pub type TraceId = u32;

/// Per-trace sizing, grid and zero-line configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TraceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    #[serde(default)]
    pub grid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grid_y_values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_line_width: Option<f64>,
    #[serde(default)]
    pub zero_line: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_line_width: Option<f64>,
}

impl TraceOptions {
    pub const FALLBACK_LINE_HEIGHT: f64 = 32.0;
    pub const FALLBACK_CONTENT_SIZE: f64 = 16.0;

    /// Clamp negative or inconsistent sizes, warning once per fix.
    pub fn sanitize(&mut self) {
        if matches!(self.line_height, Some(lh) if lh < 0.0) {
            log::warn!("Line height cannot be negative, setting to {}", Self::FALLBACK_LINE_HEIGHT);
            self.line_height = Some(Self::FALLBACK_LINE_HEIGHT);
        }
        if matches!(self.content_size, Some(cs) if cs < 0.0) {
            log::warn!("Content size cannot be negative, setting to {}", Self::FALLBACK_CONTENT_SIZE);
            self.content_size = Some(Self::FALLBACK_CONTENT_SIZE);
        }
        if let (Some(cs), Some(lh)) = (self.content_size, self.line_height) {
            if cs > lh {
                log::warn!("Content size cannot be bigger than line height, setting to line height");
                self.content_size = Some(lh);
            }
        }
        if matches!(self.margin_top, Some(m) if m < 0.0) {
            log::warn!("Trace margin top cannot be negative, setting to 0");
            self.margin_top = Some(0.0);
        }
        if matches!(self.margin_bottom, Some(m) if m < 0.0) {
            log::warn!("Trace margin bottom cannot be negative, setting to 0");
            self.margin_bottom = Some(0.0);
        }
    }
}

/// How a trace's band relates to its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracePosition {
    /// The band is tall enough to stack every direct child's line.
    Dodge,
}

/// Externally supplied row definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub label: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TraceOptions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Trace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<TracePosition>,
}

impl Trace {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            features: Vec::new(),
            options: None,
            nested: Vec::new(),
            position: None,
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_options(mut self, options: TraceOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_nested(mut self, nested: Vec<Trace>) -> Self {
        self.nested = nested;
        self
    }

    /// Number of traces in this subtree, root included.
    pub fn count(&self) -> usize {
        1 + self.nested.iter().map(Trace::count).sum::<usize>()
    }
}

/// Numeric value range a trace's continuous content is scaled over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub const DEFAULT: Domain = Domain { min: -1.0, max: 1.0 };

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Derive the domain from continuous features, zero line and grid values.
    pub fn from_trace(features: &[Feature], options: Option<&TraceOptions>) -> Domain {
        let mut bounds: Option<(f64, f64)> = None;
        let mut include = |lo: f64, hi: f64| {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        };
        for feature in features {
            if let Feature::Continuous(c) = feature {
                if let Some((lo, hi)) = c.value_range() {
                    include(lo, hi);
                }
            }
        }
        if let Some(options) = options {
            if options.zero_line {
                include(0.0, 0.0);
            }
            if options.grid {
                for &v in &options.grid_y_values {
                    include(v, v);
                }
            }
        }
        match bounds {
            Some((min, max)) if !(min == 0.0 && max == 0.0) => Domain { min, max },
            _ => Domain::DEFAULT,
        }
    }
}

/// Identifies one feature by owning trace and position in its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey {
    pub trace: TraceId,
    pub index: usize,
}

impl FeatureKey {
    pub fn new(trace: TraceId, index: usize) -> Self {
        Self { trace, index }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-feature-{}", self.trace, self.index)
    }
}

/// Flattened trace owned by the trace model
#[derive(Debug, Clone, PartialEq)]
pub struct InternalTrace {
    pub id: TraceId,
    pub label: String,
    pub features: Vec<Feature>,
    pub options: Option<TraceOptions>,
    pub position: Option<TracePosition>,
    pub level: usize,
    pub expanded: bool,
    pub show: bool,
    pub domain: Domain,
}

impl InternalTrace {
    pub fn line_height(&self) -> Option<f64> {
        self.options.as_ref().and_then(|o| o.line_height).filter(|&v| v > 0.0)
    }

    pub fn content_size(&self) -> Option<f64> {
        self.options.as_ref().and_then(|o| o.content_size).filter(|&v| v > 0.0)
    }

    pub fn margin_top(&self) -> f64 {
        self.options.as_ref().and_then(|o| o.margin_top).unwrap_or(0.0)
    }

    pub fn margin_bottom(&self) -> f64 {
        self.options.as_ref().and_then(|o| o.margin_bottom).unwrap_or(0.0)
    }

    pub fn is_dodge(&self) -> bool {
        self.position == Some(TracePosition::Dodge)
    }

    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Continuous, FeatureStyle};

    fn continuous(values: Vec<f64>) -> Feature {
        Feature::Continuous(Continuous {
            values,
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        })
    }

    #[test]
    fn test_domain_from_values() {
        let d = Domain::from_trace(&[continuous(vec![1.0, 4.0, 2.0])], None);
        assert_eq!(d, Domain { min: 1.0, max: 4.0 });
    }

    #[test]
    fn test_domain_zero_line_widens() {
        let opts = TraceOptions { zero_line: true, ..Default::default() };
        let d = Domain::from_trace(&[continuous(vec![1.0, 4.0])], Some(&opts));
        assert_eq!(d, Domain { min: 0.0, max: 4.0 });
    }

    #[test]
    fn test_domain_grid_values_only_when_grid_enabled() {
        let mut opts = TraceOptions { grid_y_values: vec![-5.0, 10.0], ..Default::default() };
        let features = [continuous(vec![1.0, 2.0])];
        assert_eq!(Domain::from_trace(&features, Some(&opts)), Domain { min: 1.0, max: 2.0 });
        opts.grid = true;
        assert_eq!(Domain::from_trace(&features, Some(&opts)), Domain { min: -5.0, max: 10.0 });
    }

    #[test]
    fn test_domain_collapsed_and_empty() {
        assert_eq!(Domain::from_trace(&[continuous(vec![0.0, 0.0])], None), Domain::DEFAULT);
        assert_eq!(Domain::from_trace(&[], None), Domain::DEFAULT);
        // Non-zero flat range is kept as-is
        assert_eq!(Domain::from_trace(&[continuous(vec![3.0])], None), Domain { min: 3.0, max: 3.0 });
    }

    #[test]
    fn test_options_sanitize() {
        let mut o = TraceOptions { line_height: Some(-5.0), content_size: Some(-1.0), ..Default::default() };
        o.sanitize();
        assert_eq!(o.line_height, Some(32.0));
        assert_eq!(o.content_size, Some(16.0));

        let mut o = TraceOptions { line_height: Some(20.0), content_size: Some(24.0), margin_top: Some(-3.0), ..Default::default() };
        o.sanitize();
        assert_eq!(o.content_size, Some(20.0));
        assert_eq!(o.margin_top, Some(0.0));
    }

    #[test]
    fn test_trace_json() {
        let json = r#"{
            "label": "root",
            "options": {"line-height": 40, "zero-line": true},
            "position": "dodge",
            "nested": [{"label": "child", "features": []}]
        }"#;
        let trace: Trace = serde_json::from_str(json).unwrap();
        assert_eq!(trace.count(), 2);
        assert_eq!(trace.position, Some(TracePosition::Dodge));
        assert_eq!(trace.options.as_ref().and_then(|o| o.line_height), Some(40.0));
        assert_eq!(FeatureKey::new(3, 1).to_string(), "3-feature-1");
    }
}
