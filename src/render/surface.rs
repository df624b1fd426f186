use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::CardResult;

/// Which font a piece of card text uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    /// Large pixel display face (total score).
    Display,
    /// Small body face (score labels, status lines).
    Body,
}

/// Raw font file bytes plus a stable cache key (usually the asset path).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontAsset {
    /// Cache key; two assets with the same key must hold the same bytes.
    pub key: String,
    /// TTF/OTF bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Fonts available to a session. Missing fonts make the matching text silently absent.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    /// Face for [`FontRole::Display`].
    pub display: Option<FontAsset>,
    /// Face for [`FontRole::Body`].
    pub body: Option<FontAsset>,
}

impl FontBook {
    /// Font for `role`, if it was loaded.
    pub fn get(&self, role: FontRole) -> Option<&FontAsset> {
        match role {
            FontRole::Display => self.display.as_ref(),
            FontRole::Body => self.body.as_ref(),
        }
    }
}

/// How a text position is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Position is the center of the text box.
    Center,
    /// Position is the top-left corner of the text box.
    TopLeft,
}

/// Styling for one text draw.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle<'a> {
    /// Font to shape with; `None` skips the draw.
    pub font: Option<&'a FontAsset>,
    /// Font size in pixels.
    pub size_px: f32,
    /// Straight-alpha fill color.
    pub rgba: [u8; 4],
    /// Anchor for the draw position.
    pub anchor: TextAnchor,
}

/// A drawable target. The composition engine only talks to this trait.
///
/// A frame starts with [`Surface::clear`]; later calls paint over earlier ones.
pub trait Surface {
    /// Surface size in pixels.
    fn canvas(&self) -> Canvas;

    /// Start a new frame filled with `rgba` (straight alpha).
    fn clear(&mut self, rgba: [u8; 4]) -> CardResult<()>;

    /// Draw `image` scaled to fill `dest`.
    fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> CardResult<()>;

    /// Draw a single line of text.
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle<'_>) -> CardResult<()>;
}
