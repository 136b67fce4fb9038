/*!
# Secondary-structure glyphs

Helices and turns are drawn by tiling a small glyph along the feature at a
fixed bit width proportional to the content size, mirroring every other
tile. Sheets are a single arrow. Coils are a smoothed random walk whose
samples persist per feature between passes, so panning does not make the
noise jump.
*/

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use featview_core::{Domain, DsspShape, FeatureKey, LinearScale};

/// Glyph scaling for one DSSP shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Tile width as a multiple of content size
    pub bit_width: f64,
    /// Horizontal glyph scale as a multiple of the tile width
    pub x_scale: f64,
    /// Vertical glyph scale as a multiple of content size
    pub y_scale: f64,
    /// Vertical offset from the row centre in pixels
    pub center: f64,
}

pub fn metrics(shape: DsspShape) -> GlyphMetrics {
    match shape {
        DsspShape::Helix => GlyphMetrics { bit_width: 0.25, x_scale: 0.5, y_scale: 0.119, center: -4.0 },
        DsspShape::Turn => GlyphMetrics { bit_width: 0.8, x_scale: 0.033, y_scale: 0.035, center: 5.8 },
        DsspShape::Sheet => GlyphMetrics { bit_width: 4.0, x_scale: 0.0, y_scale: 0.0, center: 0.0 },
        DsspShape::Coil => GlyphMetrics { bit_width: 0.3, x_scale: 0.0, y_scale: 0.0, center: 0.0 },
    }
}

/// One helix ribbon twist in glyph space, about 2 units wide
pub const HELIX_GLYPH: &str =
    "M-1,-34C-0.4,-34 0.4,34 1,34L1,42C0.4,42 -0.4,-26 -1,-26Z";

/// Half-loop of a turn in glyph space, about 30 units wide
pub const TURN_GLYPH: &str =
    "M-15,0A15,14 0 0,1 15,0L11,0A11,10 0 0,0 -11,0Z";

pub fn glyph_path(shape: DsspShape) -> Option<&'static str> {
    match shape {
        DsspShape::Helix => Some(HELIX_GLYPH),
        DsspShape::Turn => Some(TURN_GLYPH),
        DsspShape::Sheet | DsspShape::Coil => None,
    }
}

/// Tile layout of one DSSP feature over its visible part
#[derive(Debug, Clone, PartialEq)]
pub struct DsspTiling {
    pub start_point: f64,
    pub end_point: f64,
    /// Pixel width of the visible part
    pub total_width: f64,
    pub bit_width: f64,
    /// Tile origins in sequence coordinates
    pub x_positions: Vec<f64>,
}

impl DsspTiling {
    /// Tile `[start_point, end_point]` (already clipped to the window).
    pub fn compute(shape: DsspShape, start_point: f64, end_point: f64, x: &LinearScale, content_size: f64) -> Self {
        let total_width = x.apply(end_point) - x.apply(start_point);
        let residues = end_point - start_point;
        let width_per_residue = if residues > 0.0 { total_width / residues } else { 0.0 };
        let bit_width = content_size * metrics(shape).bit_width;

        let mut x_positions = Vec::new();
        if bit_width > 0.0 && width_per_residue > 0.0 && total_width.is_finite() {
            let count = (total_width / bit_width + 1.0).floor().max(0.0) as usize;
            let occupancy = bit_width / width_per_residue;
            x_positions.extend((0..count).map(|i| start_point + i as f64 * occupancy));
        }
        if x_positions.len() < 2 {
            x_positions.push(end_point);
        }

        Self { start_point, end_point, total_width, bit_width, x_positions }
    }

    /// Transform for tile `index`: every other tile is mirrored horizontally.
    pub fn tile_transform(&self, shape: DsspShape, index: usize, x: &LinearScale, center: f64, content_size: f64) -> String {
        let m = metrics(shape);
        let x_scale = self.bit_width * m.x_scale;
        let flipped = if index % 2 == 0 { x_scale } else { -x_scale };
        let y_scale = content_size * m.y_scale;
        let position = self.x_positions.get(index).copied().unwrap_or(self.end_point);
        format!(
            "translate({}, {}) scale({}, {})",
            crate::curve::fmt_num(x.apply(position)),
            crate::curve::fmt_num(center + m.center),
            crate::curve::fmt_num(flipped),
            crate::curve::fmt_num(y_scale)
        )
    }
}

/// Alternating tile opacity.
pub fn tile_opacity(opacity: Option<f64>, index: usize) -> f64 {
    match (opacity, index % 2 == 0) {
        (Some(o), true) => (o - 0.2).max(0.0),
        (Some(o), false) => o,
        (None, true) => 0.5,
        (None, false) => 0.7,
    }
}

/// Stroke width for coil dashes.
pub fn coil_stroke_width(content_size: f64) -> f64 {
    (content_size / 8.0).clamp(3.0, 16.0)
}

/// Persistent random walk samples per coil feature
#[derive(Debug)]
pub struct CoilNoise {
    buffers: HashMap<FeatureKey, Vec<f64>>,
    rng: StdRng,
    seed: Option<u64>,
}

impl CoilNoise {
    pub fn new(seed: Option<u64>) -> Self {
        Self { buffers: HashMap::new(), rng: Self::rng_for(seed), seed }
    }

    fn rng_for(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Reseed and forget every buffer if `seed` differs from the current one.
    pub fn reseed(&mut self, seed: Option<u64>) {
        if seed != self.seed {
            self.seed = seed;
            self.rng = Self::rng_for(seed);
            self.buffers.clear();
        }
    }

    /// Resize the buffer for `key` to `len` samples and return it.
    ///
    /// New samples are drawn uniformly from the domain and inserted before
    /// the last one; extra samples are dropped from the end. The first and
    /// last samples are always the domain midpoint.
    pub fn samples(&mut self, key: FeatureKey, len: usize, domain: &Domain) -> &[f64] {
        let mid = domain.midpoint();
        let (lo, hi) = if domain.min <= domain.max { (domain.min, domain.max) } else { (domain.max, domain.min) };
        let rng = &mut self.rng;
        let buffer = self.buffers.entry(key).or_default();
        while buffer.len() < len {
            let value = if hi > lo { rng.gen_range(lo..hi) } else { lo };
            let at = buffer.len().saturating_sub(1);
            buffer.insert(at, value);
        }
        buffer.truncate(len);
        if let Some(first) = buffer.first_mut() {
            *first = mid;
        }
        if let Some(last) = buffer.last_mut() {
            *last = mid;
        }
        buffer
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helix_tiling() {
        // 10px per residue, content size 16 -> 4px tiles
        let x = LinearScale::new((0.0, 100.0), (0.0, 1000.0));
        let tiling = DsspTiling::compute(DsspShape::Helix, 0.5, 4.5, &x, 16.0);
        assert_eq!(tiling.total_width, 40.0);
        assert_eq!(tiling.bit_width, 4.0);
        assert_eq!(tiling.x_positions.len(), 11);
        assert!((tiling.x_positions[1] - 0.9).abs() < 1e-9);
        assert_eq!(
            tiling.tile_transform(DsspShape::Helix, 1, &x, 50.0, 16.0),
            "translate(9, 46) scale(-2, 1.904)"
        );
    }

    #[test]
    fn test_narrow_tiling_keeps_two_points() {
        let x = LinearScale::new((0.0, 100.0), (0.0, 100.0));
        let tiling = DsspTiling::compute(DsspShape::Sheet, 2.0, 2.5, &x, 16.0);
        assert_eq!(tiling.x_positions, vec![2.0, 2.5]);
    }

    #[test]
    fn test_tile_opacity_alternates() {
        assert_eq!(tile_opacity(None, 0), 0.5);
        assert_eq!(tile_opacity(None, 1), 0.7);
        assert!((tile_opacity(Some(0.9), 0) - 0.7).abs() < 1e-12);
        assert_eq!(tile_opacity(Some(0.9), 3), 0.9);
        assert_eq!(coil_stroke_width(16.0), 3.0);
        assert_eq!(coil_stroke_width(200.0), 16.0);
    }

    #[test]
    fn test_coil_buffer_persists_and_pins_midpoint() {
        let domain = Domain { min: 0.0, max: 10.0 };
        let key = FeatureKey::new(0, 0);
        let mut noise = CoilNoise::new(Some(7));

        let first = noise.samples(key, 6, &domain).to_vec();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0], 5.0);
        assert_eq!(first[5], 5.0);
        assert!(first.iter().all(|v| (0.0..=10.0).contains(v)));

        // Shrinking keeps the leading samples
        let shrunk = noise.samples(key, 4, &domain).to_vec();
        assert_eq!(&shrunk[..3], &first[..3]);
        assert_eq!(shrunk[3], 5.0);

        let mut again = CoilNoise::new(Some(7));
        assert_eq!(again.samples(key, 6, &domain), first.as_slice());
    }
}
