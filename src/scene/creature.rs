use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{CardError, CardResult};

/// Creature families with their own art set.
///
/// The declaration order is the index order accepted by [`CreatureKind::parse`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CreatureKind {
    /// `cat`
    Cat,
    /// `demon`
    Demon,
    /// `mummy`
    Mummy,
    /// `lava`
    Lava,
    /// `spider`
    Spider,
    /// `wolf`
    Wolf,
}

impl CreatureKind {
    /// All kinds in index order.
    pub const ALL: [CreatureKind; 6] = [
        CreatureKind::Cat,
        CreatureKind::Demon,
        CreatureKind::Mummy,
        CreatureKind::Lava,
        CreatureKind::Spider,
        CreatureKind::Wolf,
    ];

    /// Lowercase identifier used in asset paths and share links.
    pub fn as_str(self) -> &'static str {
        match self {
            CreatureKind::Cat => "cat",
            CreatureKind::Demon => "demon",
            CreatureKind::Mummy => "mummy",
            CreatureKind::Lava => "lava",
            CreatureKind::Spider => "spider",
            CreatureKind::Wolf => "wolf",
        }
    }

    /// Kind at `idx` in [`CreatureKind::ALL`].
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Parse user input: a case-insensitive name, or a number whose floor is an index `0..=5`.
    ///
    /// Leading/trailing whitespace is ignored. Numeric input that is out of range falls back to
    /// name matching, so it is rejected as well.
    pub fn parse(input: &str) -> CardResult<Self> {
        let s = input.trim().to_ascii_lowercase();

        if !s.is_empty()
            && let Ok(n) = s.parse::<f64>()
            && n.is_finite()
        {
            let idx = n.floor();
            if idx >= 0.0
                && let Some(kind) = Self::from_index(idx as usize)
            {
                return Ok(kind);
            }
        }

        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                CardError::validation(format!(
                    "invalid creature kind '{}': use one of cat, demon, mummy, lava, spider, wolf or 0-5",
                    input.trim()
                ))
            })
    }
}

impl fmt::Display for CreatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreatureKind {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The four grading scores plus one reserved slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ScoreSet {
    /// Drives the head.
    pub eye: i64,
    /// Drives both arms.
    pub brain: i64,
    /// Drives both legs.
    pub bleeding: i64,
    /// Drives the torso.
    pub stomach: i64,
    /// Not read by part resolution; always 0 from the input layer.
    #[serde(default)]
    pub reserved: i64,
}

impl ScoreSet {
    /// Scores with the reserved slot zeroed.
    pub fn new(eye: i64, brain: i64, bleeding: i64, stomach: i64) -> Self {
        Self {
            eye,
            brain,
            bleeding,
            stomach,
            reserved: 0,
        }
    }

    /// Sum of the four named scores (the reserved slot is excluded).
    pub fn total(&self) -> i64 {
        self.eye
            .saturating_add(self.brain)
            .saturating_add(self.bleeding)
            .saturating_add(self.stomach)
    }
}

/// Coerce a raw score field to an integer.
///
/// Empty, unparsable and non-finite input all yield 0; finite numbers are truncated toward zero.
pub fn coerce_score(raw: &str) -> i64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Unvalidated form fields, exactly as typed or read from a link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// Kind name or index.
    pub kind: String,
    /// Eye score text.
    pub eye_score: String,
    /// Brain score text.
    pub brain_score: String,
    /// Bleeding score text.
    pub bleeding_score: String,
    /// Stomach score text.
    pub stomach_score: String,
}

/// Validated, immutable input for one load cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GenerationRequest {
    /// Creature family.
    pub kind: CreatureKind,
    /// Grading scores.
    pub scores: ScoreSet,
}

impl GenerationRequest {
    /// Build a request from already-typed values.
    pub fn new(kind: CreatureKind, scores: ScoreSet) -> Self {
        Self { kind, scores }
    }

    /// Validate raw form input. Only the kind can reject; scores always coerce.
    pub fn from_raw(raw: &RawRequest) -> CardResult<Self> {
        let kind = CreatureKind::parse(&raw.kind)?;
        let scores = ScoreSet::new(
            coerce_score(&raw.eye_score),
            coerce_score(&raw.brain_score),
            coerce_score(&raw.bleeding_score),
            coerce_score(&raw.stomach_score),
        );
        Ok(Self { kind, scores })
    }

    /// Form fields that validate back to this request.
    pub fn to_raw(&self) -> RawRequest {
        RawRequest {
            kind: self.kind.as_str().to_string(),
            eye_score: self.scores.eye.to_string(),
            brain_score: self.scores.brain.to_string(),
            bleeding_score: self.scores.bleeding.to_string(),
            stomach_score: self.scores.stomach.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/creature.rs"]
mod tests;
