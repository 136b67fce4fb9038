//! Feature marks placed within a trace row.
//!
//! Features are a closed sum type: every consumer matches on [`Feature`]
//! exhaustively, so adding a shape is a compile-checked change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive span in sequence coordinates, half-cell aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Intersection with a domain window, `None` when they do not overlap.
    pub fn clip(&self, lo: f64, hi: f64) -> Option<Span> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        if end < start {
            None
        } else {
            Some(Span { start, end })
        }
    }
}

/// Presentation attributes shared by every feature kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locus {
    pub start: i64,
    pub end: i64,
    /// Fixed pixel height; content-size is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub style: FeatureStyle,
}

/// Interpolation between consecutive continuous samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    #[serde(rename = "linear", alias = "curveLinear")]
    Linear,
    #[default]
    #[serde(rename = "step", alias = "curveStep")]
    Step,
    #[serde(rename = "stepBefore", alias = "curveStepBefore")]
    StepBefore,
    #[serde(rename = "stepAfter", alias = "curveStepAfter")]
    StepAfter,
    #[serde(rename = "basis", alias = "curveBasis")]
    Basis,
    #[serde(rename = "monotoneX", alias = "curveMonotoneX")]
    MonotoneX,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuous {
    /// Sample at position `i + 1` is `values[i]`.
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, rename = "curveType", skip_serializing_if = "Option::is_none")]
    pub curve_type: Option<CurveType>,
    #[serde(default, rename = "showArea")]
    pub show_area: bool,
    #[serde(flatten)]
    pub style: FeatureStyle,
}

impl Continuous {
    /// Value range of this feature, explicit bounds taking precedence.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let data_min = self.values.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.min(v)))
        });
        let data_max = self.values.iter().copied().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        });
        let min = self.min.or(data_min)?;
        let max = self.max.or(data_max)?;
        Some((min, max))
    }

    /// Sample at a 1-based sequence position.
    pub fn value_at(&self, position: i64) -> Option<f64> {
        if position < 1 {
            return None;
        }
        self.values.get((position - 1) as usize).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, rename = "adjustToWidth")]
    pub adjust_to_width: bool,
    #[serde(flatten)]
    pub style: FeatureStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poly {
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, rename = "adjustToWidth")]
    pub adjust_to_width: bool,
    #[serde(flatten)]
    pub style: FeatureStyle,
}

impl Poly {
    pub const DEFAULT_SIDES: u32 = 3;

    pub fn sides(&self) -> u32 {
        self.sides.filter(|&s| s >= 3).unwrap_or(Self::DEFAULT_SIDES)
    }
}

/// DSSP secondary-structure assignment letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DsspCode {
    #[serde(rename = "H")]
    AlphaHelix,
    #[serde(rename = "G")]
    Helix310,
    #[serde(rename = "I")]
    PiHelix,
    #[serde(rename = "P")]
    Polyproline,
    #[serde(rename = "E")]
    Strand,
    #[serde(rename = "B")]
    Bridge,
    #[serde(rename = "T")]
    Turn,
    #[serde(rename = "S")]
    Bend,
    #[serde(rename = "C", alias = "-", alias = " ", alias = "L")]
    Coil,
}

/// Glyph family a DSSP code is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsspShape {
    Helix,
    Turn,
    Sheet,
    Coil,
}

impl DsspCode {
    pub fn shape(self) -> DsspShape {
        match self {
            DsspCode::AlphaHelix | DsspCode::Helix310 | DsspCode::PiHelix => DsspShape::Helix,
            DsspCode::Turn | DsspCode::Bend => DsspShape::Turn,
            DsspCode::Strand | DsspCode::Bridge => DsspShape::Sheet,
            DsspCode::Polyproline | DsspCode::Coil => DsspShape::Coil,
        }
    }

    pub fn letter(self) -> char {
        match self {
            DsspCode::AlphaHelix => 'H',
            DsspCode::Helix310 => 'G',
            DsspCode::PiHelix => 'I',
            DsspCode::Polyproline => 'P',
            DsspCode::Strand => 'E',
            DsspCode::Bridge => 'B',
            DsspCode::Turn => 'T',
            DsspCode::Bend => 'S',
            DsspCode::Coil => 'C',
        }
    }
}

impl DsspShape {
    pub fn as_str(self) -> &'static str {
        match self {
            DsspShape::Helix => "helix",
            DsspShape::Turn => "turn",
            DsspShape::Sheet => "sheet",
            DsspShape::Coil => "coil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dssp {
    pub start: i64,
    pub end: i64,
    pub code: DsspCode,
    #[serde(flatten)]
    pub style: FeatureStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Locus,
    Continuous,
    Pin,
    Poly,
    Dssp,
}

impl FeatureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Locus => "locus",
            FeatureKind::Continuous => "continuous",
            FeatureKind::Pin => "pin",
            FeatureKind::Poly => "poly",
            FeatureKind::Dssp => "dssp",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graphical mark within a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Feature {
    Locus(Locus),
    Continuous(Continuous),
    Pin(Pin),
    Poly(Poly),
    Dssp(Dssp),
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Locus(_) => FeatureKind::Locus,
            Feature::Continuous(_) => FeatureKind::Continuous,
            Feature::Pin(_) => FeatureKind::Pin,
            Feature::Poly(_) => FeatureKind::Poly,
            Feature::Dssp(_) => FeatureKind::Dssp,
        }
    }

    pub fn style(&self) -> &FeatureStyle {
        match self {
            Feature::Locus(f) => &f.style,
            Feature::Continuous(f) => &f.style,
            Feature::Pin(f) => &f.style,
            Feature::Poly(f) => &f.style,
            Feature::Dssp(f) => &f.style,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.style().label.as_deref()
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, Feature::Continuous(_))
    }

    /// Horizontal extent in sequence coordinates, cell edges included.
    pub fn span(&self) -> Span {
        match self {
            Feature::Locus(Locus { start, end, .. }) | Feature::Dssp(Dssp { start, end, .. }) => {
                Span::new(*start as f64 - 0.5, *end as f64 + 0.5)
            }
            Feature::Continuous(c) => Span::new(0.5, c.values.len() as f64 + 0.5),
            Feature::Pin(Pin { position, .. }) | Feature::Poly(Poly { position, .. }) => {
                Span::new(*position as f64 - 0.5, *position as f64 + 0.5)
            }
        }
    }

    /// Range highlighted when this feature is clicked at `pointer_position`.
    ///
    /// Continuous features select the single cell under the pointer; every
    /// other kind selects its own span.
    pub fn selection_range(&self, pointer_position: i64) -> Span {
        match self {
            Feature::Continuous(_) => {
                Span::new(pointer_position as f64 - 0.5, pointer_position as f64 + 0.5)
            }
            Feature::Locus(_) | Feature::Pin(_) | Feature::Poly(_) | Feature::Dssp(_) => self.span(),
        }
    }

    /// Clamp invalid geometry in place, logging one warning per fix.
    pub(crate) fn sanitize(&mut self, content_size: Option<f64>) {
        match self {
            Feature::Locus(locus) => {
                clamp_bounds("Locus", &mut locus.start, &mut locus.end);
                if let Some(height) = locus.height.as_mut() {
                    if *height < 0.0 {
                        log::warn!("Locus height cannot be negative, setting to 1");
                        *height = 1.0;
                    }
                    if let Some(cs) = content_size {
                        if *height > cs {
                            log::warn!("Locus height cannot be bigger than content size, setting to content size");
                            *height = cs;
                        }
                    }
                }
            }
            Feature::Dssp(dssp) => clamp_bounds("DSSP", &mut dssp.start, &mut dssp.end),
            Feature::Continuous(_) | Feature::Pin(_) | Feature::Poly(_) => {}
        }
    }
}

fn clamp_bounds(kind: &str, start: &mut i64, end: &mut i64) {
    if *start < 0 {
        log::warn!("{} start cannot be negative, setting to 0", kind);
        *start = 0;
    }
    if *end < 0 {
        log::warn!("{} end cannot be negative, setting to 0", kind);
        *end = 0;
    }
    if *start > *end {
        log::warn!("{} start {} is after end {}, swapping", kind, start, end);
        std::mem::swap(start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_json_shapes() {
        let json = r##"[
            {"type": "locus", "start": 2, "end": 4, "color": "#ff0000", "label": "dom"},
            {"type": "continuous", "values": [1.0, 3.0, 2.0], "curveType": "curveBasis", "showArea": true},
            {"type": "pin", "position": 10, "adjustToWidth": true},
            {"type": "poly", "position": 4, "sides": 5},
            {"type": "dssp", "start": 1, "end": 8, "code": "H", "stroke-color": "#000"}
        ]"##;
        let features: Vec<Feature> = serde_json::from_str(json).unwrap();
        assert_eq!(features.len(), 5);
        assert_eq!(features[0].kind(), FeatureKind::Locus);
        assert_eq!(features[0].style().color.as_deref(), Some("#ff0000"));
        assert_eq!(features[0].label(), Some("dom"));
        match &features[1] {
            Feature::Continuous(c) => {
                assert_eq!(c.curve_type, Some(CurveType::Basis));
                assert!(c.show_area);
            }
            other => panic!("unexpected feature {:?}", other),
        }
        match &features[4] {
            Feature::Dssp(d) => {
                assert_eq!(d.code.shape(), DsspShape::Helix);
                assert_eq!(d.style.stroke_color.as_deref(), Some("#000"));
            }
            other => panic!("unexpected feature {:?}", other),
        }
    }

    #[test]
    fn test_dssp_code_aliases() {
        let codes: Vec<DsspCode> = serde_json::from_str(r#"["-", "C", "E", "T", "G"]"#).unwrap();
        let shapes: Vec<DsspShape> = codes.iter().map(|c| c.shape()).collect();
        assert_eq!(
            shapes,
            vec![DsspShape::Coil, DsspShape::Coil, DsspShape::Sheet, DsspShape::Turn, DsspShape::Helix]
        );
    }

    #[test]
    fn test_spans_and_selection() {
        let pin = Feature::Pin(Pin { position: 10, radius: None, adjust_to_width: false, style: FeatureStyle::default() });
        assert_eq!(pin.selection_range(3), Span::new(9.5, 10.5));

        let cont = Feature::Continuous(Continuous {
            values: vec![0.0; 20],
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        });
        assert_eq!(cont.span(), Span::new(0.5, 20.5));
        assert_eq!(cont.selection_range(7), Span::new(6.5, 7.5));
    }

    #[test]
    fn test_sanitize_locus() {
        let mut f = Feature::Locus(Locus { start: -3, end: -1, height: Some(-2.0), style: FeatureStyle::default() });
        f.sanitize(Some(16.0));
        assert_eq!(f, Feature::Locus(Locus { start: 0, end: 0, height: Some(1.0), style: FeatureStyle::default() }));

        let mut tall = Feature::Locus(Locus { start: 4, end: 2, height: Some(40.0), style: FeatureStyle::default() });
        tall.sanitize(Some(16.0));
        assert_eq!(tall, Feature::Locus(Locus { start: 2, end: 4, height: Some(16.0), style: FeatureStyle::default() }));
    }

    #[test]
    fn test_value_range_prefers_explicit_bounds() {
        let c = Continuous {
            values: vec![2.0, -1.0, 5.0],
            min: Some(-10.0),
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        };
        assert_eq!(c.value_range(), Some((-10.0, 5.0)));
        assert_eq!(c.value_at(3), Some(5.0));
        assert_eq!(c.value_at(0), None);
        assert_eq!(c.value_at(4), None);
    }

    #[test]
    fn test_span_clip() {
        let span = Span::new(1.5, 4.5);
        assert_eq!(span.clip(0.0, 9.0), Some(span));
        assert_eq!(span.clip(3.0, 9.0), Some(Span::new(3.0, 4.5)));
        assert_eq!(span.clip(5.0, 9.0), None);
    }
}
