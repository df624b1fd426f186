/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// Byte fetching seam and the filesystem implementation.
pub mod loader;
/// Per-slot async load state with generation tagging.
pub mod tracker;

#[cfg(test)]
#[path = "../../tests/unit/assets/support.rs"]
pub(crate) mod test_support;
