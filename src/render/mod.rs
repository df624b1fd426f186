//! Drawing: the surface seam, the card composition engine and the CPU raster backend.

/// Back-to-front card composition.
pub mod compose;
/// CPU raster surface (`vello_cpu` + `parley`) and frame readback.
pub mod cpu;
/// Glow-effect text primitive.
pub mod glow;
/// Drawable surface trait and font handles.
pub mod surface;

#[cfg(test)]
#[path = "../../tests/unit/render/support.rs"]
pub(crate) mod test_support;
