//! monstercard composites a layered creature portrait card.
//!
//! A request names a creature kind and four scores. Each body part is graded from one score into a
//! quality tier, which picks the part's artwork. The session loads the seven layers concurrently,
//! redraws whatever has arrived on every tick, and only exports once nothing is left loading:
//!
//! - Validate a [`RawRequest`] (or a share-link query) into a [`GenerationRequest`]
//! - Submit it to a [`CardSession`], which resolves paths and starts the loads
//! - [`CardSession::tick`] a [`Surface`] until settled, then [`CardSession::export_png`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset fetching, decoding and per-slot load tracking.
pub mod assets;
/// Drawing: the surface seam, the card composition engine and the CPU raster backend.
pub mod render;
/// Score grading and asset path resolution.
pub mod resolve;
/// Request model and share links.
pub mod scene;
/// Session lifecycle and card layout configuration.
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Vec2, premul_rgba8};
pub use crate::foundation::error::{CardError, CardResult};

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::loader::{AssetLoader, FsLoader, MemoryLoader};
pub use crate::assets::tracker::{AssetTracker, Generation, SlotKey};
pub use crate::render::compose::{FrameView, render};
pub use crate::render::cpu::{CpuSurface, FrameRGBA};
pub use crate::render::surface::{FontAsset, FontBook, FontRole, Surface, TextAnchor, TextStyle};
pub use crate::resolve::parts::{
    AssetPaths, DRAW_ORDER, PartKey, ResolvedParts, resolve, resolve_with,
};
pub use crate::resolve::quality::{QualityTier, classify};
pub use crate::scene::creature::{CreatureKind, GenerationRequest, RawRequest, ScoreSet};
pub use crate::scene::query::{from_query, to_query};
pub use crate::session::controller::{CardSession, SessionOpts, SessionState};
pub use crate::session::layout::CardLayout;
