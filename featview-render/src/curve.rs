//! SVG path construction for lines, areas and interpolating curves.

use std::fmt::Write;

use featview_core::CurveType;

/// Accumulates SVG path commands
#[derive(Debug, Default, Clone)]
pub struct PathBuilder {
    d: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.d, "M{},{}", fmt_num(x), fmt_num(y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.d, "L{},{}", fmt_num(x), fmt_num(y));
    }

    pub fn bezier_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let _ = write!(
            self.d,
            "C{},{},{},{},{},{}",
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            fmt_num(x),
            fmt_num(y)
        );
    }

    pub fn close(&mut self) {
        self.d.push('Z');
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn finish(self) -> String {
        self.d
    }
}

/// Compact number formatting: three decimals at most, no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Path through `points` using the given interpolation.
pub fn line_path(points: &[(f64, f64)], curve: CurveType) -> String {
    let mut path = PathBuilder::new();
    trace_curve(&mut path, points, curve);
    path.finish()
}

/// Closed area between the curve through `points` and the baseline `y0`.
pub fn area_path(points: &[(f64, f64)], y0: f64, curve: CurveType) -> String {
    let mut path = PathBuilder::new();
    trace_curve(&mut path, points, curve);
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        path.line_to(last.0, y0);
        path.line_to(first.0, y0);
        path.close();
    }
    path.finish()
}

fn trace_curve(path: &mut PathBuilder, points: &[(f64, f64)], curve: CurveType) {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    match curve {
        CurveType::Linear => linear(path, &finite),
        CurveType::Step => step(path, &finite, 0.5),
        CurveType::StepBefore => step(path, &finite, 0.0),
        CurveType::StepAfter => step(path, &finite, 1.0),
        CurveType::Basis => basis(path, &finite),
        CurveType::MonotoneX => monotone_x(path, &finite),
    }
}

fn linear(path: &mut PathBuilder, points: &[(f64, f64)]) {
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(x, y);
        } else {
            path.line_to(x, y);
        }
    }
}

/// Step interpolation; `t` places the vertical riser between samples.
fn step(path: &mut PathBuilder, points: &[(f64, f64)], t: f64) {
    let mut prev: Option<(f64, f64)> = None;
    for &(x, y) in points {
        match prev {
            None => path.move_to(x, y),
            Some((x0, y0)) => {
                if t <= 0.0 {
                    path.line_to(x0, y);
                    path.line_to(x, y);
                } else if t >= 1.0 {
                    path.line_to(x, y0);
                    path.line_to(x, y);
                } else {
                    let x1 = x0 * (1.0 - t) + x * t;
                    path.line_to(x1, y0);
                    path.line_to(x1, y);
                    path.line_to(x, y);
                }
            }
        }
        prev = Some((x, y));
    }
}

/// Uniform cubic B-spline through the control points, clamped at the ends.
fn basis(path: &mut PathBuilder, points: &[(f64, f64)]) {
    match points.len() {
        0 => {}
        1 => path.move_to(points[0].0, points[0].1),
        2 => {
            path.move_to(points[0].0, points[0].1);
            path.line_to(points[1].0, points[1].1);
        }
        _ => {
            let (mut x0, mut y0) = points[0];
            let (mut x1, mut y1) = points[1];
            path.move_to(x0, y0);
            for (i, &(x, y)) in points.iter().enumerate().skip(2) {
                if i == 2 {
                    path.line_to((5.0 * x0 + x1) / 6.0, (5.0 * y0 + y1) / 6.0);
                }
                basis_segment(path, (x0, y0), (x1, y1), (x, y));
                x0 = x1;
                y0 = y1;
                x1 = x;
                y1 = y;
            }
            basis_segment(path, (x0, y0), (x1, y1), (x1, y1));
            path.line_to(x1, y1);
        }
    }
}

fn basis_segment(path: &mut PathBuilder, p0: (f64, f64), p1: (f64, f64), p: (f64, f64)) {
    path.bezier_to(
        (2.0 * p0.0 + p1.0) / 3.0,
        (2.0 * p0.1 + p1.1) / 3.0,
        (p0.0 + 2.0 * p1.0) / 3.0,
        (p0.1 + 2.0 * p1.1) / 3.0,
        (p0.0 + 4.0 * p1.0 + p.0) / 6.0,
        (p0.1 + 4.0 * p1.1 + p.1) / 6.0,
    );
}

/// Monotone cubic interpolation in x (Fritsch-Carlson tangents).
fn monotone_x(path: &mut PathBuilder, points: &[(f64, f64)]) {
    // Coincident x values carry no slope information
    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last().map_or(true, |last: &(f64, f64)| last.0 != p.0) {
            pts.push(p);
        }
    }
    let n = pts.len();
    if n < 3 {
        linear(path, &pts);
        return;
    }

    let secants: Vec<f64> = pts
        .windows(2)
        .map(|w| (w[1].1 - w[0].1) / (w[1].0 - w[0].0))
        .collect();

    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        let (s0, s1) = (secants[i - 1], secants[i]);
        let h0 = pts[i].0 - pts[i - 1].0;
        let h1 = pts[i + 1].0 - pts[i].0;
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        tangents[i] = if t.is_nan() { 0.0 } else { t };
    }
    let end_slope = |h: f64, s: f64, t: f64| {
        if h == 0.0 {
            t
        } else {
            (3.0 * s - t) / 2.0
        }
    };
    tangents[0] = end_slope(pts[1].0 - pts[0].0, secants[0], tangents[1]);
    tangents[n - 1] = end_slope(pts[n - 1].0 - pts[n - 2].0, secants[n - 2], tangents[n - 2]);

    path.move_to(pts[0].0, pts[0].1);
    for i in 1..n {
        let (x0, y0) = pts[i - 1];
        let (x1, y1) = pts[i];
        let dx = (x1 - x0) / 3.0;
        path.bezier_to(
            x0 + dx,
            y0 + dx * tangents[i - 1],
            x1 - dx,
            y1 - dx * tangents[i],
            x1,
            y1,
        );
    }
}

fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(150.0), "150");
        assert_eq!(fmt_num(1.23456), "1.235");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn test_linear_and_steps() {
        let pts = [(0.0, 10.0), (10.0, 20.0)];
        assert_eq!(line_path(&pts, CurveType::Linear), "M0,10L10,20");
        assert_eq!(line_path(&pts, CurveType::Step), "M0,10L5,10L5,20L10,20");
        assert_eq!(line_path(&pts, CurveType::StepBefore), "M0,10L0,20L10,20");
        assert_eq!(line_path(&pts, CurveType::StepAfter), "M0,10L10,10L10,20");
    }

    #[test]
    fn test_basis_shape() {
        let pts = [(0.0, 0.0), (6.0, 6.0), (12.0, 0.0)];
        let d = line_path(&pts, CurveType::Basis);
        assert!(d.starts_with("M0,0L1,1C"));
        assert!(d.ends_with("L12,0"));
        assert_eq!(d.matches('C').count(), 2);
    }

    #[test]
    fn test_monotone_stays_within_bounds() {
        let pts = [(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0)];
        let d = line_path(&pts, CurveType::MonotoneX);
        assert!(d.starts_with("M0,0C"));
        assert_eq!(d.matches('C').count(), 3);
        // A flat middle segment keeps zero tangents
        assert!(d.contains("C1.333,1,1.667,1,2,1"));
    }

    #[test]
    fn test_area_closes_on_baseline() {
        let pts = [(0.0, 5.0), (10.0, 2.0)];
        assert_eq!(area_path(&pts, 20.0, CurveType::Linear), "M0,5L10,2L10,20L0,20Z");
        assert_eq!(area_path(&[], 20.0, CurveType::Linear), "");
    }
}
