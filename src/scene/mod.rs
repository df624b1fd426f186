/// Creature kinds, score sets and validated generation requests.
pub mod creature;
/// Share-link query encoding for generation requests.
pub mod query;
