//! Colour parsing and residue colour schemes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or one of a handful of CSS names.
    pub fn parse(s: &str) -> Option<Rgb> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex_rgb(hex);
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => BLACK,
            "white" => WHITE,
            "red" => Rgb::new(255, 0, 0),
            "green" => Rgb::new(0, 128, 0),
            "blue" => Rgb::new(0, 0, 255),
            "orange" => Rgb::new(255, 165, 0),
            "gray" | "grey" => Rgb::new(128, 128, 128),
            "dimgray" | "dimgrey" => Rgb::new(105, 105, 105),
            "lightgray" | "lightgrey" => Rgb::new(211, 211, 211),
            "steelblue" => Rgb::new(70, 130, 180),
            _ => return None,
        };
        Some(named)
    }

    /// HSL lightness in `[0, 1]`.
    pub fn lightness(&self) -> f64 {
        let max = self.r.max(self.g).max(self.b) as f64 / 255.0;
        let min = self.r.min(self.g).min(self.b) as f64 / 255.0;
        (max + min) / 2.0
    }

    /// Darken by `0.7^k` per channel.
    pub fn darker(&self, k: f64) -> Rgb {
        let f = 0.7_f64.powf(k);
        let scale = |c: u8| (c as f64 * f).round().clamp(0.0, 255.0) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Black or white, whichever reads on top of this colour.
    pub fn contrast_text(&self) -> Rgb {
        if self.lightness() > 0.5 {
            BLACK
        } else {
            WHITE
        }
    }
}

fn parse_hex_rgb(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

/// Darkened copy of a CSS colour string; unparseable input comes back as-is.
pub fn darker_css(color: &str, k: f64) -> String {
    Rgb::parse(color)
        .map(|c| c.darker(k).to_hex())
        .unwrap_or_else(|| color.to_string())
}

/// Background and foreground for one residue cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueColors {
    pub background: &'static str,
    pub color: &'static str,
}

const fn rc(background: &'static str, color: &'static str) -> ResidueColors {
    ResidueColors { background, color }
}

/// Named residue colouring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    None,
    #[serde(alias = "ClustalX", alias = "clustal")]
    Clustalx,
}

impl ColorScheme {
    /// Colours for `residue`, unknown letters falling back to `X`.
    pub fn residue(self, residue: char) -> Option<ResidueColors> {
        match self {
            ColorScheme::None => None,
            ColorScheme::Clustalx => Some(clustalx(residue.to_ascii_uppercase())),
        }
    }
}

fn clustalx(residue: char) -> ResidueColors {
    const ORANGE: ResidueColors = rc("#FFA500", "#000000");
    match residue {
        'A' => rc("#FFBF00", "#000000"),
        'R' | 'K' => rc("#FF0000", "#FFFFFF"),
        'N' => rc("#00FFFF", "#000000"),
        'D' => rc("#0000FF", "#FFFFFF"),
        'C' => rc("#FFFF00", "#000000"),
        'Q' | 'S' | 'T' => rc("#00FF00", "#000000"),
        'E' => rc("#FF00FF", "#FFFFFF"),
        'G' => rc("#808080", "#FFFFFF"),
        'H' => rc("#008000", "#FFFFFF"),
        'P' => rc("#800080", "#FFFFFF"),
        '-' => rc("#FFFFFF", "#000000"),
        _ => ORANGE,
    }
}
