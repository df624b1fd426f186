use crate::assets::decode::PreparedImage;
use crate::assets::tracker::{SlotKey, SlotTable};
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::CardResult;
use crate::render::glow::draw_glowing_text;
use crate::render::surface::{FontBook, Surface, TextAnchor, TextStyle};
use crate::resolve::parts::DRAW_ORDER;
use crate::scene::creature::{CreatureKind, GenerationRequest};
use crate::session::layout::{CardLayout, LabelStyle};

/// Text shown before any creature has been generated.
pub const IDLE_PROMPT: &str = "Enter a creature kind and scores, then submit.";
/// Status line while the per-kind background is loading.
pub const STATUS_LOADING: &str = "Loading final card...";
/// Status line when the per-kind background failed to load.
pub const STATUS_MISSING: &str = "Final card missing (using fallback bg)";

/// Where the creature layers go: top-left offset plus a uniform scale of the canvas size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Layer size as a fraction of the canvas size.
    pub scale: f64,
}

impl Placement {
    /// Destination rectangle on `canvas`.
    pub fn rect(self, canvas: Canvas) -> Rect {
        let w = f64::from(canvas.width) * self.scale;
        let h = f64::from(canvas.height) * self.scale;
        Rect::new(self.x, self.y, self.x + w, self.y + h)
    }
}

/// The two placement presets.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlacementTable {
    /// Wolves and spiders.
    pub large: Placement,
    /// Every other kind.
    pub standard: Placement,
}

impl Default for PlacementTable {
    fn default() -> Self {
        Self {
            large: Placement {
                x: 200.0,
                y: 300.0,
                scale: 0.65,
            },
            standard: Placement {
                x: 250.0,
                y: 370.0,
                scale: 0.58,
            },
        }
    }
}

/// Static preset lookup by kind.
pub fn placement_for(kind: CreatureKind, table: &PlacementTable) -> Placement {
    match kind {
        CreatureKind::Wolf | CreatureKind::Spider => table.large,
        CreatureKind::Cat | CreatureKind::Demon | CreatureKind::Mummy | CreatureKind::Lava => {
            table.standard
        }
    }
}

/// Everything one frame reads. Borrowed; rendering never mutates it.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    /// Active request, `None` while idle.
    pub request: Option<&'a GenerationRequest>,
    /// Current slot state.
    pub slots: &'a SlotTable,
    /// Shared fallback background, if it loaded.
    pub fallback_background: Option<&'a PreparedImage>,
    /// Loaded fonts.
    pub fonts: &'a FontBook,
}

/// Draw one frame from whatever has loaded so far.
///
/// Order: background, creature layers in [`DRAW_ORDER`], score text, background status line.
/// Slots without an image are skipped.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    view: &FrameView<'_>,
    layout: &CardLayout,
) -> CardResult<()> {
    let canvas = surface.canvas();

    surface.clear(layout.clear_rgba)?;
    let background = view
        .slots
        .get(SlotKey::Background)
        .image()
        .or(view.fallback_background);
    if let Some(bg) = background {
        surface.draw_image(bg, canvas.rect())?;
    }

    let Some(req) = view.request else {
        return draw_label(surface, view.fonts, &layout.prompt, IDLE_PROMPT);
    };

    let dest = placement_for(req.kind, &layout.placements).rect(canvas);
    for part in DRAW_ORDER {
        if let Some(img) = view.slots.get(SlotKey::Part(part)).image() {
            surface.draw_image(img, dest)?;
        }
    }

    draw_scores(surface, view.fonts, req, layout)?;
    draw_status(surface, view, layout)
}

fn draw_scores<S: Surface + ?Sized>(
    surface: &mut S,
    fonts: &FontBook,
    req: &GenerationRequest,
    layout: &CardLayout,
) -> CardResult<()> {
    let s = &req.scores;
    let t = &layout.scores;
    let lines = [
        (&t.total, s.total().to_string()),
        (&t.eye, format!("Eye Score: {}", s.eye)),
        (&t.brain, format!("Brain Score: {}", s.brain)),
        (&t.stomach, format!("Stomach Score: {}", s.stomach)),
        (&t.bleeding, format!("Bleeding Score: {}", s.bleeding)),
    ];
    for (slot, text) in lines {
        draw_glowing_text(
            surface,
            &text,
            Point::new(slot.x, slot.y),
            fonts.get(slot.font),
            &slot.glow,
        )?;
    }
    Ok(())
}

fn draw_status<S: Surface + ?Sized>(
    surface: &mut S,
    view: &FrameView<'_>,
    layout: &CardLayout,
) -> CardResult<()> {
    let bg = view.slots.get(SlotKey::Background);
    if bg.is_loading() {
        draw_label(surface, view.fonts, &layout.status.loading, STATUS_LOADING)
    } else if bg.error_path().is_some() {
        draw_label(surface, view.fonts, &layout.status.missing, STATUS_MISSING)
    } else {
        Ok(())
    }
}

fn draw_label<S: Surface + ?Sized>(
    surface: &mut S,
    fonts: &FontBook,
    label: &LabelStyle,
    text: &str,
) -> CardResult<()> {
    let style = TextStyle {
        font: fonts.get(label.font),
        size_px: label.size_px,
        rgba: label.rgba,
        anchor: TextAnchor::TopLeft,
    };
    surface.draw_text(text, Point::new(label.x, label.y), &style)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
