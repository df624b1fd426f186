use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::render::compose::{Placement, PlacementTable};
use crate::render::glow::GlowStyle;
use crate::render::surface::FontRole;

/// A glow text anchored at its center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlowLabel {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Font to use.
    pub font: FontRole,
    /// Glow parameters (includes the size).
    pub glow: GlowStyle,
}

impl GlowLabel {
    fn body(x: f64, y: f64, main_alpha: u8) -> Self {
        Self {
            x,
            y,
            font: FontRole::Body,
            glow: GlowStyle {
                size_px: 29.0,
                glow_alpha: 5,
                radius: 5,
                main_alpha,
                ..GlowStyle::default()
            },
        }
    }
}

/// Positions of the total and the four per-score labels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoreLabels {
    /// Sum of the four scores.
    pub total: GlowLabel,
    /// "Eye Score: N".
    pub eye: GlowLabel,
    /// "Brain Score: N".
    pub brain: GlowLabel,
    /// "Stomach Score: N".
    pub stomach: GlowLabel,
    /// "Bleeding Score: N".
    pub bleeding: GlowLabel,
}

impl Default for ScoreLabels {
    fn default() -> Self {
        Self {
            total: GlowLabel {
                x: 830.0,
                y: 1620.0,
                font: FontRole::Display,
                glow: GlowStyle {
                    size_px: 115.0,
                    glow_alpha: 5,
                    radius: 5,
                    main_alpha: 200,
                    ..GlowStyle::default()
                },
            },
            eye: GlowLabel::body(305.0, 1610.0, 200),
            brain: GlowLabel::body(330.0, 1560.0, 200),
            stomach: GlowLabel::body(365.0, 1660.0, 200),
            bleeding: GlowLabel::body(380.0, 1710.0, 191),
        }
    }
}

/// Plain text anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelStyle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Font size in pixels.
    pub size_px: f32,
    /// Font to use.
    pub font: FontRole,
    /// Straight-alpha color.
    pub rgba: [u8; 4],
}

/// Background status lines.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StatusStyle {
    /// While the per-kind background loads.
    pub loading: LabelStyle,
    /// When the per-kind background failed.
    pub missing: LabelStyle,
}

impl Default for StatusStyle {
    fn default() -> Self {
        let base = LabelStyle {
            x: 20.0,
            y: 20.0,
            size_px: 14.0,
            font: FontRole::Body,
            rgba: [255, 255, 255, 255],
        };
        Self {
            loading: base,
            missing: LabelStyle {
                rgba: [255, 100, 100, 255],
                ..base
            },
        }
    }
}

/// Font file locations, as asset template paths.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontPaths {
    /// Display face.
    pub display: String,
    /// Body face.
    pub body: String,
}

impl Default for FontPaths {
    fn default() -> Self {
        Self {
            display: "./media/fonts/MatrixtypeDisplayBold-6R4e6.ttf".to_string(),
            body: "./media/fonts/dogica.ttf".to_string(),
        }
    }
}

/// Complete card layout. Every field has a default matching the classic 1078x1915 card, so a
/// JSON file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardLayout {
    /// Output size.
    pub canvas: Canvas,
    /// Solid color used when no background image is available.
    pub clear_rgba: [u8; 4],
    /// Creature placement presets.
    pub placements: PlacementTable,
    /// Score text.
    pub scores: ScoreLabels,
    /// Background status lines.
    pub status: StatusStyle,
    /// Idle prompt.
    pub prompt: LabelStyle,
    /// Font files.
    pub fonts: FontPaths,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1078,
                height: 1915,
            },
            clear_rgba: [0, 0, 0, 255],
            placements: PlacementTable::default(),
            scores: ScoreLabels::default(),
            status: StatusStyle::default(),
            prompt: LabelStyle {
                x: 30.0,
                y: 40.0,
                size_px: 18.0,
                font: FontRole::Body,
                rgba: [255, 255, 255, 255],
            },
            fonts: FontPaths::default(),
        }
    }
}

impl CardLayout {
    /// Parse and validate a JSON layout.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        let layout: Self = serde_json::from_str(s).map_err(|e| CardError::serde(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a JSON layout file.
    pub fn from_json_file(path: &Path) -> CardResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read layout '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Pretty JSON form (useful as a starting point for custom layouts).
    pub fn to_json_pretty(&self) -> CardResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CardError::serde(e.to_string()))
    }

    /// Reject layouts the renderer cannot honor.
    pub fn validate(&self) -> CardResult<()> {
        self.canvas.validate()?;

        for (name, p) in [
            ("large", self.placements.large),
            ("standard", self.placements.standard),
        ] {
            validate_placement(name, p)?;
        }

        let s = &self.scores;
        for label in [&s.total, &s.eye, &s.brain, &s.stomach, &s.bleeding] {
            if !label.x.is_finite() || !label.y.is_finite() {
                return Err(CardError::validation("score label position must be finite"));
            }
            validate_size(label.glow.size_px)?;
            if label.glow.radius > 32 {
                return Err(CardError::validation("glow radius must be <= 32"));
            }
        }
        for label in [&self.status.loading, &self.status.missing, &self.prompt] {
            if !label.x.is_finite() || !label.y.is_finite() {
                return Err(CardError::validation("label position must be finite"));
            }
            validate_size(label.size_px)?;
        }
        Ok(())
    }
}

fn validate_placement(name: &str, p: Placement) -> CardResult<()> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return Err(CardError::validation(format!(
            "placement '{name}' offset must be finite"
        )));
    }
    if !p.scale.is_finite() || p.scale <= 0.0 {
        return Err(CardError::validation(format!(
            "placement '{name}' scale must be finite and > 0"
        )));
    }
    Ok(())
}

fn validate_size(size_px: f32) -> CardResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(CardError::validation("text size_px must be finite and > 0"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/layout.rs"]
mod tests;
