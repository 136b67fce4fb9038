//! Scale engine
//!
//! Horizontal positions use a continuous [`LinearScale`] over
//! `[0, length + 1]`. Rows use an [`OrdinalScale`] whose keys are the
//! sequence row plus each visible trace, mapped to cumulative pixel offsets
//! derived from per-trace margins and line heights.

use std::fmt;

use crate::error::Result;
use crate::model::TraceModel;
use crate::settings::Settings;
use crate::trace::{Domain, InternalTrace, TraceId};

/// Continuous numeric-to-pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl Default for LinearScale {
    fn default() -> Self {
        Self { domain: (0.0, 1.0), range: (0.0, 1.0) }
    }
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Pixel width of one sequence position.
    pub fn cell_width(&self) -> f64 {
        self.apply(1.0) - self.apply(0.0)
    }

    /// Domain as seen through a zoom transform applied to the range.
    pub fn rescale(&self, transform: &ZoomTransform) -> LinearScale {
        let (r0, r1) = self.range;
        let d0 = self.invert(transform.invert_x(r0));
        let d1 = self.invert(transform.invert_x(r1));
        LinearScale { domain: (d0, d1), range: self.range }
    }
}

/// Horizontal zoom: scale factor `k` and pixel translation `tx`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub tx: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, tx: 0.0 };

    pub fn new(k: f64, tx: f64) -> Self {
        Self { k, tx }
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.tx
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.tx) / self.k
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Key of one row in the vertical scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Sequence,
    Trace(TraceId),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Sequence => f.write_str("sequence"),
            RowKey::Trace(id) => write!(f, "{}", id),
        }
    }
}

/// Vertical content box of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub y: f64,
    pub line_height: f64,
    pub content_size: f64,
}

impl Band {
    pub fn center(&self) -> f64 {
        self.y + self.line_height / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center() - self.content_size / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center() + self.content_size / 2.0
    }

    /// Map a value in `domain` onto the band, larger values higher up.
    pub fn rescale_value(&self, value: f64, domain: &Domain) -> f64 {
        let width = domain.width();
        if width == 0.0 || !width.is_finite() {
            return self.center();
        }
        self.bottom() + (value - domain.min) / width * (self.top() - self.bottom())
    }

    /// Inverse of [`Band::rescale_value`].
    pub fn invert_value(&self, pixel: f64, domain: &Domain) -> f64 {
        let span = self.top() - self.bottom();
        if span == 0.0 {
            return domain.midpoint();
        }
        domain.min + (pixel - self.bottom()) / span * domain.width()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Row {
    key: RowKey,
    offset: f64,
    line_height: f64,
    content_size: f64,
}

/// Vertical row layout: every key's pixel offset plus the plot bottom
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrdinalScale {
    rows: Vec<Row>,
    bottom: f64,
}

impl OrdinalScale {
    pub fn domain(&self) -> Vec<RowKey> {
        self.rows.iter().map(|r| r.key).collect()
    }

    /// Offsets for every key followed by the plot bottom.
    pub fn range(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.offset).chain(std::iter::once(self.bottom)).collect()
    }

    pub fn position(&self, key: RowKey) -> Option<f64> {
        self.rows.iter().find(|r| r.key == key).map(|r| r.offset)
    }

    pub fn band(&self, key: RowKey) -> Option<Band> {
        self.rows.iter().find(|r| r.key == key).map(|r| Band {
            y: r.offset,
            line_height: r.line_height,
            content_size: r.content_size,
        })
    }

    /// Y position of the x axis.
    pub fn axis_position(&self) -> f64 {
        self.bottom
    }

    /// Row whose band contains `y`, if any.
    pub fn row_at(&self, y: f64) -> Option<RowKey> {
        self.rows
            .iter()
            .filter(|r| r.line_height > 0.0)
            .find(|r| y >= r.offset && y < r.offset + r.line_height)
            .map(|r| r.key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Height a trace occupies; dodge parents stack their children's lines.
pub fn row_height(model: &TraceModel, trace: &InternalTrace, settings: &Settings) -> Result<f64> {
    let own = |t: &InternalTrace| t.line_height().unwrap_or(settings.line_height);
    let children = model.child_ids(trace.id);
    if trace.is_dodge() && !children.is_empty() {
        let mut total = 0.0;
        for &child in children {
            total += own(model.get_trace(child)?);
        }
        Ok(total)
    } else {
        Ok(own(trace))
    }
}

/// Rebuild the vertical scale for `visible`.
///
/// Every id is resolved before anything is laid out, so a missing trace
/// surfaces as an error without a partial result.
pub fn recompute_y_scale(
    visible: &[TraceId],
    model: &TraceModel,
    settings: &Settings,
    sequence_shown: bool,
) -> Result<OrdinalScale> {
    let traces = visible
        .iter()
        .map(|&id| model.get_trace(id))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(traces.len() + 1);
    let sequence_height = if sequence_shown { settings.line_height } else { 0.0 };
    rows.push(Row {
        key: RowKey::Sequence,
        offset: settings.margin_top,
        line_height: sequence_height,
        content_size: settings.content_size.min(sequence_height),
    });

    let first_margin = traces.first().map(|t| t.margin_top()).unwrap_or(0.0);
    let mut offset = settings.margin_top + sequence_height + first_margin;

    for (i, trace) in traces.iter().enumerate() {
        let line_height = row_height(model, trace, settings)?;
        let content_size = trace.content_size().unwrap_or(settings.content_size).min(line_height);
        rows.push(Row {
            key: RowKey::Trace(trace.id),
            offset,
            line_height,
            content_size,
        });
        let next_margin = traces.get(i + 1).map(|t| t.margin_top()).unwrap_or(0.0);
        offset += trace.margin_bottom() + next_margin + line_height;
    }

    Ok(OrdinalScale { rows, bottom: offset })
}
