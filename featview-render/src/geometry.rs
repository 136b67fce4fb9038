//! Per-kind feature geometry, computed from the scales without touching
//! the scene.

use std::f64::consts::PI;

use featview_core::feature::{Continuous, Locus};
use featview_core::{Band, Domain, LinearScale};

use crate::curve::fmt_num;

/// Horizontal padding between a locus edge and its label
pub const LABEL_PADDING: f64 = 4.0;
pub const DEFAULT_PIN_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocusGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
    pub label_y: f64,
}

impl LocusGeometry {
    pub fn compute(locus: &Locus, x: &LinearScale, band: &Band) -> Self {
        let cell = x.cell_width();
        let cs = band.content_size;
        let (y, height) = match locus.height {
            Some(h) => (band.top() + (cs - h) / 2.0, h),
            None => (band.top(), cs),
        };
        let left = x.apply(locus.start as f64 - 0.5);
        Self {
            x: left,
            y,
            width: cell * (locus.end - locus.start + 1) as f64,
            height,
            label_x: left + LABEL_PADDING,
            label_y: band.center(),
        }
    }

    /// Labels are shown only when they fit inside the box with padding.
    pub fn label_fits(&self, label_width: f64) -> bool {
        label_width + 2.0 * LABEL_PADDING < self.width
    }
}

/// Radius for pins and polygons.
pub fn mark_radius(adjust_to_width: bool, radius: Option<f64>, content_size: f64, cell_width: f64) -> f64 {
    if adjust_to_width {
        content_size.min(cell_width) / 2.0
    } else {
        radius.filter(|r| *r > 0.0).unwrap_or(DEFAULT_PIN_RADIUS)
    }
}

/// Vertices of a regular polygon inscribed in a circle, flat side down.
pub fn polygon_points(cx: f64, cy: f64, radius: f64, sides: u32) -> Vec<(f64, f64)> {
    let sides = sides.max(3);
    let angle = 2.0 * PI / sides as f64;
    let rotation = PI / 2.0 - PI / sides as f64;
    (0..sides)
        .map(|i| {
            let a = i as f64 * angle + rotation;
            (cx + radius * a.cos(), cy + radius * a.sin())
        })
        .collect()
}

/// Arrow polygon for a beta sheet spanning `[x_start, x_end]` in pixels.
pub fn sheet_arrow(x_start: f64, x_end: f64, center: f64, content_size: f64) -> [(f64, f64); 7] {
    let head_width = content_size / 2.0;
    let body_width = (x_end - x_start) - head_width;
    let body_height = content_size / 2.0;
    let body_y = center - body_height / 2.0;
    let head_height = content_size;
    let head_y = center - head_height / 2.0;
    let neck = x_start + body_width;
    [
        (x_start, body_y),
        (neck, body_y),
        (neck, head_y),
        (x_end, head_y + head_height / 2.0),
        (neck, head_y + head_height),
        (neck, body_y + body_height),
        (x_start, body_y + body_height),
    ]
}

/// Sample points in sequence coordinates, edge values repeated half a cell out.
pub fn continuous_points(feature: &Continuous) -> Vec<(f64, f64)> {
    let values = &feature.values;
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(values.len() + 2);
    points.push((0.5, first));
    points.extend(values.iter().enumerate().map(|(i, &v)| ((i + 1) as f64, v)));
    points.push((values.len() as f64 + 0.5, last));
    points
}

/// Map sequence/value points to pixels through the row's band.
pub fn project_points(points: &[(f64, f64)], x: &LinearScale, band: &Band, domain: &Domain) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(p, v)| (x.apply(p), band.rescale_value(v, domain)))
        .collect()
}

/// `x,y x,y ...` for polygon `points` attributes.
pub fn format_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use featview_core::FeatureStyle;

    fn band() -> Band {
        Band { y: 32.0, line_height: 32.0, content_size: 16.0 }
    }

    fn locus(start: i64, end: i64, height: Option<f64>) -> Locus {
        Locus { start, end, height, style: FeatureStyle::default() }
    }

    #[test]
    fn test_locus_box() {
        let x = LinearScale::new((0.0, 9.0), (0.0, 900.0));
        let g = LocusGeometry::compute(&locus(2, 4, None), &x, &band());
        assert_eq!(g.x, 150.0);
        assert_eq!(g.width, 300.0);
        assert_eq!(g.y, 40.0);
        assert_eq!(g.height, 16.0);
        assert_eq!(g.label_x, 154.0);
        assert_eq!(g.label_y, 48.0);
        assert!(g.label_fits(200.0));
        assert!(!g.label_fits(293.0));

        let single = LocusGeometry::compute(&locus(5, 5, Some(8.0)), &x, &band());
        assert_eq!(single.width, x.cell_width());
        assert_eq!(single.y, 44.0);
    }

    #[test]
    fn test_mark_radius() {
        assert_eq!(mark_radius(true, Some(20.0), 16.0, 10.0), 5.0);
        assert_eq!(mark_radius(false, None, 16.0, 10.0), 8.0);
        assert_eq!(mark_radius(false, Some(3.0), 16.0, 10.0), 3.0);
    }

    #[test]
    fn test_triangle_points_down_flat() {
        let pts = polygon_points(0.0, 0.0, 10.0, 3);
        assert_eq!(pts.len(), 3);
        // Rotation puts two vertices at the same height
        assert!((pts[0].1 - pts[1].1).abs() < 1e-9);
    }

    #[test]
    fn test_sheet_arrow() {
        let pts = sheet_arrow(0.0, 100.0, 50.0, 16.0);
        assert_eq!(pts[0], (0.0, 46.0));
        assert_eq!(pts[1], (92.0, 46.0));
        assert_eq!(pts[2], (92.0, 42.0));
        assert_eq!(pts[3], (100.0, 50.0));
        assert_eq!(pts[4], (92.0, 58.0));
        assert_eq!(pts[6], (0.0, 54.0));
        assert_eq!(format_points(&pts[..2]), "0,46 92,46");
    }

    #[test]
    fn test_continuous_points() {
        let c = Continuous {
            values: vec![1.0, 4.0, 2.0],
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        };
        let pts = continuous_points(&c);
        assert_eq!(pts, vec![(0.5, 1.0), (1.0, 1.0), (2.0, 4.0), (3.0, 2.0), (3.5, 2.0)]);
    }
}
