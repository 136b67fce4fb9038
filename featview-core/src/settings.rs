//! Viewer-wide settings.
//!
//! One [`Settings`] value per viewer. Updates arrive as [`PartialSettings`],
//! are merged over the current value and validated, and the result replaces
//! the old settings wholesale.

use serde::{Deserialize, Serialize};

use crate::colors::ColorScheme;

/// How tall residue background cells are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundHeight {
    #[default]
    #[serde(rename = "100%")]
    Full,
    #[serde(rename = "content-size")]
    ContentSize,
    #[serde(rename = "line-height")]
    LineHeight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,

    pub background_color: String,
    pub plot_background_color: String,
    pub grid_line_color: String,
    pub text_color: String,

    pub content_size: f64,
    pub line_height: f64,

    pub x_axis_show: bool,
    pub sequence_show: bool,
    pub sequence_background_color: ColorScheme,
    pub sequence_background_height: BackgroundHeight,
    pub sequence_background_opacity: f64,

    /// Estimated glyph width in pixels for residues and labels
    pub char_width: f64,
    /// Fixed seed for coil noise, entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coil_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 30.0,
            margin_left: 0.0,
            background_color: "transparent".to_string(),
            plot_background_color: "transparent".to_string(),
            grid_line_color: "dimgray".to_string(),
            text_color: "black".to_string(),
            content_size: Self::DEFAULT_CONTENT_SIZE,
            line_height: Self::DEFAULT_LINE_HEIGHT,
            x_axis_show: true,
            sequence_show: true,
            sequence_background_color: ColorScheme::None,
            sequence_background_height: BackgroundHeight::Full,
            sequence_background_opacity: 0.5,
            char_width: Self::DEFAULT_CHAR_WIDTH,
            coil_seed: None,
        }
    }
}

impl Settings {
    pub const DEFAULT_LINE_HEIGHT: f64 = 32.0;
    pub const DEFAULT_CONTENT_SIZE: f64 = 16.0;
    pub const DEFAULT_CHAR_WIDTH: f64 = 8.0;
    /// Tick label height reserved below the plot when the axis is shown
    pub const AXIS_LABEL_HEIGHT: f64 = 12.0;

    /// Shallow merge of `partial` over `self`, validated.
    pub fn merged(&self, partial: &PartialSettings) -> Settings {
        let mut settings = self.clone();
        partial.apply_to(&mut settings);
        settings.validate();
        settings
    }

    /// Clamp out-of-range values in place, logging each fix.
    pub fn validate(&mut self) {
        if self.line_height < 0.0 {
            log::warn!("Line height cannot be negative, setting to {}", Self::DEFAULT_LINE_HEIGHT);
            self.line_height = Self::DEFAULT_LINE_HEIGHT;
        }
        if self.content_size < 0.0 {
            log::warn!("Content size cannot be negative, setting to {}", Self::DEFAULT_CONTENT_SIZE);
            self.content_size = Self::DEFAULT_CONTENT_SIZE;
        }
        if self.content_size > self.line_height {
            log::warn!("Content size cannot be bigger than line height, setting to line height");
            self.content_size = self.line_height;
        }
        for (name, margin) in [
            ("top", &mut self.margin_top),
            ("right", &mut self.margin_right),
            ("bottom", &mut self.margin_bottom),
            ("left", &mut self.margin_left),
        ] {
            if *margin < 0.0 || !margin.is_finite() {
                log::warn!("Margin {} cannot be negative, setting to 0", name);
                *margin = 0.0;
            }
        }
        if self.x_axis_show && self.margin_bottom < Self::AXIS_LABEL_HEIGHT + 6.0 {
            self.margin_bottom = Self::AXIS_LABEL_HEIGHT + 6.0;
        }
        if !(0.0..=1.0).contains(&self.sequence_background_opacity) {
            log::warn!("Sequence background opacity must be within [0, 1], clamping");
            self.sequence_background_opacity = self.sequence_background_opacity.clamp(0.0, 1.0);
        }
        if self.char_width <= 0.0 || !self.char_width.is_finite() {
            log::warn!("Char width must be positive, setting to {}", Self::DEFAULT_CHAR_WIDTH);
            self.char_width = Self::DEFAULT_CHAR_WIDTH;
        }
    }
}

/// Settings update where every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PartialSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_line_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_background_color: Option<ColorScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_background_height: Option<BackgroundHeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_background_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coil_seed: Option<u64>,
}

impl PartialSettings {
    pub fn apply_to(&self, settings: &mut Settings) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &self.$field {
                    settings.$field = value.clone();
                })*
            };
        }
        merge!(
            margin_top,
            margin_right,
            margin_bottom,
            margin_left,
            background_color,
            plot_background_color,
            grid_line_color,
            text_color,
            content_size,
            line_height,
            x_axis_show,
            sequence_show,
            sequence_background_color,
            sequence_background_height,
            sequence_background_opacity,
            char_width,
        );
        if self.coil_seed.is_some() {
            settings.coil_seed = self.coil_seed;
        }
    }

    /// Fields set in `other` override those set here.
    pub fn overlay(mut self, other: PartialSettings) -> PartialSettings {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            margin_top,
            margin_right,
            margin_bottom,
            margin_left,
            background_color,
            plot_background_color,
            grid_line_color,
            text_color,
            content_size,
            line_height,
            x_axis_show,
            sequence_show,
            sequence_background_color,
            sequence_background_height,
            sequence_background_opacity,
            char_width,
            coil_seed,
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut settings = Settings::default();
        let before = settings.clone();
        settings.validate();
        assert_eq!(settings, before);
    }

    #[test]
    fn test_merge_and_validate() {
        let partial: PartialSettings = serde_json::from_str(
            r#"{"line-height": -5, "content-size": 40, "margin-left": -10, "sequence-background-height": "content-size"}"#,
        )
        .unwrap();
        let settings = Settings::default().merged(&partial);
        assert_eq!(settings.line_height, 32.0);
        assert_eq!(settings.content_size, 32.0);
        assert_eq!(settings.margin_left, 0.0);
        assert_eq!(settings.sequence_background_height, BackgroundHeight::ContentSize);
        assert_eq!(settings.text_color, "black");
    }

    #[test]
    fn test_axis_reserves_bottom_margin() {
        let partial = PartialSettings { margin_bottom: Some(2.0), ..Default::default() };
        assert_eq!(Settings::default().merged(&partial).margin_bottom, 18.0);
        let hidden = PartialSettings { margin_bottom: Some(2.0), x_axis_show: Some(false), ..Default::default() };
        assert_eq!(Settings::default().merged(&hidden).margin_bottom, 2.0);
    }

    #[test]
    fn test_overlay_prefers_later_values() {
        let base = PartialSettings { line_height: Some(40.0), text_color: Some("red".into()), ..Default::default() };
        let top = PartialSettings { line_height: Some(20.0), ..Default::default() };
        let merged = base.overlay(top);
        assert_eq!(merged.line_height, Some(20.0));
        assert_eq!(merged.text_color.as_deref(), Some("red"));
    }
}
