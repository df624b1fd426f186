use std::fmt;

/// Upper bound (inclusive) of the `bad` band.
pub const BAD_MAX: i64 = 200;
/// Upper bound (inclusive) of the `medium` band.
pub const MEDIUM_MAX: i64 = 399;

/// Discrete art grade selected by a score.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Score `<= 200`.
    Bad,
    /// Score `201..=399`.
    Medium,
    /// Score `>= 400`.
    Good,
}

impl QualityTier {
    /// Directory / file prefix used in asset paths.
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Bad => "bad",
            QualityTier::Medium => "medium",
            QualityTier::Good => "good",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade a score. Total: negative scores are `Bad`.
pub fn classify(score: i64) -> QualityTier {
    if score <= BAD_MAX {
        QualityTier::Bad
    } else if score <= MEDIUM_MAX {
        QualityTier::Medium
    } else {
        QualityTier::Good
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/quality.rs"]
mod tests;
