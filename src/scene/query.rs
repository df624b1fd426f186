use url::form_urlencoded;

use crate::foundation::error::CardResult;
use crate::scene::creature::{GenerationRequest, RawRequest};

/// Query key for the creature kind.
pub const KIND_KEY: &str = "kind";
/// Older links carry the kind under this key.
pub const KIND_ALIAS_KEY: &str = "monsterType";
/// Query key for the eye score.
pub const EYE_KEY: &str = "eyeScore";
/// Query key for the brain score.
pub const BRAIN_KEY: &str = "brainScore";
/// Query key for the bleeding score.
pub const BLEEDING_KEY: &str = "bleedingScore";
/// Query key for the stomach score.
pub const STOMACH_KEY: &str = "stomachScore";

/// Encode a request as a flat `application/x-www-form-urlencoded` query (no leading `?`).
pub fn to_query(req: &GenerationRequest) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(KIND_KEY, req.kind.as_str())
        .append_pair(EYE_KEY, &req.scores.eye.to_string())
        .append_pair(BRAIN_KEY, &req.scores.brain.to_string())
        .append_pair(BLEEDING_KEY, &req.scores.bleeding.to_string())
        .append_pair(STOMACH_KEY, &req.scores.stomach.to_string())
        .finish()
}

/// Read the raw form fields out of a query string. Unknown keys are ignored; on duplicates the
/// first occurrence wins.
pub fn raw_from_query(query: &str) -> RawRequest {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut raw = RawRequest::default();
    let mut seen = [false; 5];

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let (slot, field) = match key.as_ref() {
            KIND_KEY | KIND_ALIAS_KEY => (0, &mut raw.kind),
            EYE_KEY => (1, &mut raw.eye_score),
            BRAIN_KEY => (2, &mut raw.brain_score),
            BLEEDING_KEY => (3, &mut raw.bleeding_score),
            STOMACH_KEY => (4, &mut raw.stomach_score),
            _ => continue,
        };
        if !seen[slot] {
            seen[slot] = true;
            *field = value.into_owned();
        }
    }
    raw
}

/// Decode a share link query.
///
/// Returns `Ok(None)` when the query names no kind (nothing to generate), and a validation error
/// when it names a kind that does not exist.
pub fn from_query(query: &str) -> CardResult<Option<GenerationRequest>> {
    let raw = raw_from_query(query);
    if raw.kind.trim().is_empty() {
        return Ok(None);
    }
    GenerationRequest::from_raw(&raw).map(Some)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/query.rs"]
mod tests;
