use crate::foundation::core::Point;
use crate::foundation::error::CardResult;
use crate::render::surface::{FontAsset, Surface, TextAnchor, TextStyle};

/// Parameters of the glow text effect.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlowStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Halo color.
    pub glow_rgb: [u8; 3],
    /// Halo alpha, applied to every offset copy.
    pub glow_alpha: u8,
    /// Halo half-width in pixels (square neighborhood).
    pub radius: u32,
    /// Foreground color.
    pub main_rgb: [u8; 3],
    /// Foreground alpha.
    pub main_alpha: u8,
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self {
            size_px: 100.0,
            glow_rgb: [255, 255, 255],
            glow_alpha: 60,
            radius: 4,
            main_rgb: [255, 255, 255],
            main_alpha: 220,
        }
    }
}

/// Every integer offset in `[-radius, radius]^2` except the origin, row by row.
pub fn glow_offsets(radius: u32) -> impl Iterator<Item = (i32, i32)> {
    let r = radius as i32;
    (-r..=r)
        .flat_map(move |dx| (-r..=r).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
}

/// Draw `text` centered on `at`: one low-alpha copy per glow offset, then the main copy on top.
pub fn draw_glowing_text<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    at: Point,
    font: Option<&FontAsset>,
    style: &GlowStyle,
) -> CardResult<()> {
    let [gr, gg, gb] = style.glow_rgb;
    let glow = TextStyle {
        font,
        size_px: style.size_px,
        rgba: [gr, gg, gb, style.glow_alpha],
        anchor: TextAnchor::Center,
    };
    for (dx, dy) in glow_offsets(style.radius) {
        let p = Point::new(at.x + f64::from(dx), at.y + f64::from(dy));
        surface.draw_text(text, p, &glow)?;
    }

    let [mr, mg, mb] = style.main_rgb;
    let main = TextStyle {
        rgba: [mr, mg, mb, style.main_alpha],
        ..glow
    };
    surface.draw_text(text, at, &main)
}

#[cfg(test)]
#[path = "../../tests/unit/render/glow.rs"]
mod tests;
