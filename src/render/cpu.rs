use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Canvas, Point, Rect, Vec2, unpremultiply_rgba8_in_place};
use crate::foundation::error::{CardError, CardResult};
use crate::render::surface::{FontAsset, Surface, TextAnchor, TextStyle};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`; `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode as PNG (straight alpha), creating parent directories as needed.
    pub fn write_png(&self, path: &Path) -> CardResult<()> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }

        image::save_buffer_with_format(
            path,
            &data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Parley brush. Fill color is set per draw call, so layouts carry no color of their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    font: String,
    text: String,
    size_bits: u32,
}

struct ShapedText {
    layout: parley::Layout<TextBrush>,
    width: f64,
    height: f64,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Font registration happens once per font key; layouts are cached per frame so the glow effect's
/// many offset copies share one shaping pass.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: HashMap<String, String>,
    render_fonts: HashMap<String, vello_cpu::peniko::FontData>,
    layouts: HashMap<LayoutKey, Arc<ShapedText>>,
    broken_fonts: HashSet<String>,
}

impl TextLayoutEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            render_fonts: HashMap::new(),
            layouts: HashMap::new(),
            broken_fonts: HashSet::new(),
        }
    }

    fn family_for(&mut self, font: &FontAsset) -> CardResult<String> {
        if let Some(name) = self.families.get(&font.key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CardError::render(format!("no font families registered from '{}'", font.key))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CardError::render("registered font family has no name"))?
            .to_string();

        self.families.insert(font.key.clone(), family_name.clone());
        Ok(family_name)
    }

    fn render_font_for(&mut self, font: &FontAsset) -> vello_cpu::peniko::FontData {
        self.render_fonts
            .entry(font.key.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    fn shape(&mut self, text: &str, font: &FontAsset, size_px: f32) -> CardResult<Arc<ShapedText>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CardError::validation("text size_px must be finite and > 0"));
        }

        let key = LayoutKey {
            font: font.key.clone(),
            text: text.to_string(),
            size_bits: size_px.to_bits(),
        };
        if let Some(shaped) = self.layouts.get(&key) {
            return Ok(Arc::clone(shaped));
        }

        let family_name = self.family_for(font)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let shaped = Arc::new(ShapedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            layout,
        });
        self.layouts.insert(key, Arc::clone(&shaped));
        Ok(shaped)
    }

    fn end_frame(&mut self) {
        self.layouts.clear();
    }
}

struct CachedPaint {
    // Holding the storage keeps its address (the cache key) from being reused.
    storage: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// CPU raster surface powered by `vello_cpu`, with `parley` text shaping.
pub struct CpuSurface {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    images: HashMap<usize, CachedPaint>,
    text: TextLayoutEngine,
}

impl CpuSurface {
    /// Create a surface of the given size.
    pub fn new(canvas: Canvas) -> CardResult<Self> {
        canvas.validate()?;
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            images: HashMap::new(),
            text: TextLayoutEngine::new(),
        })
    }

    /// Rasterize everything drawn since the last [`Surface::clear`] and read it back.
    pub fn snapshot(&mut self) -> CardResult<FrameRGBA> {
        let (w, h) = canvas_u16(self.canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn paint_for(&mut self, image: &PreparedImage) -> CardResult<vello_cpu::Image> {
        let id = image.storage_id();
        if let Some(cached) = self.images.get(&id) {
            return Ok(cached.paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.images.insert(
            id,
            CachedPaint {
                storage: Arc::clone(&image.rgba8_premul),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    /// Drop cached paints whose source image is no longer referenced anywhere else.
    fn prune_images(&mut self) {
        self.images.retain(|_, cached| Arc::strong_count(&cached.storage) > 1);
    }
}

impl Surface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, rgba: [u8; 4]) -> CardResult<()> {
        self.prune_images();
        self.text.end_frame();

        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let [r, g, b, a] = rgba;
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));
        Ok(())
    }

    fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> CardResult<()> {
        if image.width == 0 || image.height == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        let paint = self.paint_for(image)?;
        let sx = dest.width() / f64::from(image.width);
        let sy = dest.height() / f64::from(image.height);
        let tr = Affine::translate(Vec2::new(dest.x0, dest.y0)) * Affine::scale_non_uniform(sx, sy);

        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle<'_>) -> CardResult<()> {
        let Some(font) = style.font else {
            tracing::trace!(text, "no font loaded; skipping text");
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        if self.text.broken_fonts.contains(&font.key) {
            return Ok(());
        }
        let shaped = match self.text.shape(text, font, style.size_px) {
            Ok(shaped) => shaped,
            Err(e) => {
                tracing::warn!(font = %font.key, error = %e, "cannot shape text; font disabled");
                self.text.broken_fonts.insert(font.key.clone());
                return Ok(());
            }
        };
        let render_font = self.text.render_font_for(font);
        let origin = match style.anchor {
            TextAnchor::TopLeft => Vec2::new(at.x, at.y),
            TextAnchor::Center => Vec2::new(at.x - shaped.width / 2.0, at.y - shaped.height / 2.0),
        };

        let [r, g, b, a] = style.rgba;
        self.ctx.set_transform(affine_to_cpu(Affine::translate(origin)));
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&render_font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

fn canvas_u16(canvas: Canvas) -> CardResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| CardError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| CardError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CardError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CardError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CardError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
