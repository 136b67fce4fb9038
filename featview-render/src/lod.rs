/*!
# Level of Detail

The sequence row switches between two tiers depending on how many pixels a
single position gets:
- Residues: one letter per cell, optionally over a coloured background
- Dots: evenly spaced placeholders once a glyph no longer fits its cell
*/

use featview_core::LinearScale;

/// Spacing between dots, in glyph widths
const DOT_SPACING: f64 = 2.0;

/// Level of detail for the sequence row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodLevel {
    /// One residue letter per cell
    Residues,
    /// Placeholder dots, letters would overlap
    Dots,
}

impl LodLevel {
    pub fn determine(x: &LinearScale, char_width: f64) -> LodLevel {
        if char_width + 0.5 > x.cell_width() {
            LodLevel::Dots
        } else {
            LodLevel::Residues
        }
    }
}

/// Dot centres in sequence coordinates for the visible window.
pub fn dot_positions(x: &LinearScale, char_width: f64) -> Vec<f64> {
    let cell = x.cell_width();
    if cell <= 0.0 || !cell.is_finite() || char_width <= 0.0 {
        return Vec::new();
    }
    // Positions covered by one dot, plus one cell of gap
    let step = DOT_SPACING * char_width / cell + 1.0;
    let mut positions = Vec::new();
    let (lo, hi) = x.domain;
    let mut p = lo;
    while p < hi {
        positions.push(p + step / 2.0);
        p += step;
    }
    positions
}
