use std::fmt;

use crate::resolve::quality::{QualityTier, classify};
use crate::scene::creature::{CreatureKind, ScoreSet};

/// Body parts that make up a creature.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PartKey {
    /// `leftArm`
    LeftArm,
    /// `rightArm`
    RightArm,
    /// `torso`
    Torso,
    /// `head`
    Head,
    /// `leftLeg`
    LeftLeg,
    /// `rightLeg`
    RightLeg,
}

impl PartKey {
    /// Logical grouping order. Not the draw order; see [`DRAW_ORDER`].
    pub const ALL: [PartKey; 6] = [
        PartKey::LeftArm,
        PartKey::RightArm,
        PartKey::Torso,
        PartKey::Head,
        PartKey::LeftLeg,
        PartKey::RightLeg,
    ];

    /// Name used in asset file names.
    pub fn as_str(self) -> &'static str {
        match self {
            PartKey::LeftArm => "leftArm",
            PartKey::RightArm => "rightArm",
            PartKey::Torso => "torso",
            PartKey::Head => "head",
            PartKey::LeftLeg => "leftLeg",
            PartKey::RightLeg => "rightLeg",
        }
    }

    /// Position in [`PartKey::ALL`].
    pub fn index(self) -> usize {
        match self {
            PartKey::LeftArm => 0,
            PartKey::RightArm => 1,
            PartKey::Torso => 2,
            PartKey::Head => 3,
            PartKey::LeftLeg => 4,
            PartKey::RightLeg => 5,
        }
    }

    /// The one score that grades this part.
    pub fn driving_score(self, scores: &ScoreSet) -> i64 {
        match self {
            PartKey::Torso => scores.stomach,
            PartKey::LeftArm | PartKey::RightArm => scores.brain,
            PartKey::Head => scores.eye,
            PartKey::LeftLeg | PartKey::RightLeg => scores.bleeding,
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Back-to-front layer order: limbs, then torso, then head.
pub const DRAW_ORDER: [PartKey; 6] = [
    PartKey::LeftLeg,
    PartKey::RightLeg,
    PartKey::LeftArm,
    PartKey::RightArm,
    PartKey::Torso,
    PartKey::Head,
];

/// Asset path templates.
///
/// Parts live at `{base}/{kind}/{tier}/{tier}-{part}.{ext}`, the per-kind background at
/// `{base}/{kind}/{kind}-finalcard.{ext}` and the shared fallback at `{base}/background.{ext}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Media directory prefix, without a trailing slash.
    pub base: String,
    /// File extension, without the dot.
    pub ext: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            base: "./media".to_string(),
            ext: "png".to_string(),
        }
    }
}

impl AssetPaths {
    /// Path of one graded part image.
    pub fn part(&self, kind: CreatureKind, tier: QualityTier, part: PartKey) -> String {
        format!(
            "{base}/{kind}/{tier}/{tier}-{part}.{ext}",
            base = self.base,
            ext = self.ext
        )
    }

    /// Path of the per-kind card background.
    pub fn background(&self, kind: CreatureKind) -> String {
        format!(
            "{base}/{kind}/{kind}-finalcard.{ext}",
            base = self.base,
            ext = self.ext
        )
    }

    /// Path of the shared fallback background.
    pub fn fallback_background(&self) -> String {
        format!("{}/background.{}", self.base, self.ext)
    }
}

/// One resolved layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPart {
    /// Which part.
    pub part: PartKey,
    /// Grade chosen from the part's driving score.
    pub tier: QualityTier,
    /// Asset path for that grade.
    pub path: String,
}

/// Full path mapping for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedParts {
    /// Kind the paths were resolved for.
    pub kind: CreatureKind,
    /// Per-kind background path (independent of scores).
    pub background: String,
    parts: [ResolvedPart; 6],
}

impl ResolvedParts {
    /// Resolution for `part`.
    pub fn get(&self, part: PartKey) -> &ResolvedPart {
        &self.parts[part.index()]
    }

    /// Parts in logical order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPart> {
        self.parts.iter()
    }
}

/// Resolve with the default `./media/*.png` templates.
pub fn resolve(kind: CreatureKind, scores: &ScoreSet) -> ResolvedParts {
    resolve_with(&AssetPaths::default(), kind, scores)
}

/// Map (kind, scores) to asset paths. Pure; no I/O, never fails.
pub fn resolve_with(paths: &AssetPaths, kind: CreatureKind, scores: &ScoreSet) -> ResolvedParts {
    let parts = PartKey::ALL.map(|part| {
        let tier = classify(part.driving_score(scores));
        ResolvedPart {
            part,
            tier,
            path: paths.part(kind, tier, part),
        }
    });
    ResolvedParts {
        kind,
        background: paths.background(kind),
        parts,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/parts.rs"]
mod tests;
