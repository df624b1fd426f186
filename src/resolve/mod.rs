/// Score -> quality tier.
pub mod quality;
/// (kind, scores) -> per-part asset paths.
pub mod parts;
