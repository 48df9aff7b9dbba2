//! Camera identifiers and filename-token normalization.

use serde::{Deserialize, Serialize};

/// One of the (up to six) simultaneous Tesla cameras, or an unrecognized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Camera {
    Front,
    Back,
    LeftRepeater,
    RightRepeater,
    LeftPillar,
    RightPillar,
    /// A filename camera token that didn't match any known camera.
    Unknown,
}

impl Camera {
    /// The six cameras the planner ever arranges into a grid, front-to-back in spec tables.
    pub const ALL: &'static [Camera] = &[
        Camera::Front,
        Camera::Back,
        Camera::LeftRepeater,
        Camera::RightRepeater,
        Camera::LeftPillar,
        Camera::RightPillar,
    ];

    /// Normalize a raw filename camera token per §4.1's exhaustive mapping.
    pub fn normalize(raw: &str) -> Camera {
        match raw {
            "front" => Camera::Front,
            "back" => Camera::Back,
            "left_repeater" | "left" => Camera::LeftRepeater,
            "right_repeater" | "right" => Camera::RightRepeater,
            "left_pillar" => Camera::LeftPillar,
            "right_pillar" => Camera::RightPillar,
            _ => Camera::Unknown,
        }
    }

    /// Canonical filename token (used when synthesizing new filenames, e.g. black-padding
    /// source lists). Note this is not always the inverse of [`Camera::normalize`] — the raw
    /// token `left` also normalizes to `LeftRepeater` but the canonical form is
    /// `left_repeater`. Callers that need bit-exact round trip of an *existing* path should
    /// keep the original raw token around instead of re-deriving it from this.
    pub fn canonical_token(&self) -> &'static str {
        match self {
            Camera::Front => "front",
            Camera::Back => "back",
            Camera::LeftRepeater => "left_repeater",
            Camera::RightRepeater => "right_repeater",
            Camera::LeftPillar => "left_pillar",
            Camera::RightPillar => "right_pillar",
            Camera::Unknown => "unknown",
        }
    }

    /// Whether this camera is horizontally flipped when `mirrorCameras` is set (§4.5.3).
    pub fn is_mirrorable(&self) -> bool {
        matches!(
            self,
            Camera::Back | Camera::LeftRepeater | Camera::RightRepeater
        )
    }
}

impl std::fmt::Display for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_tokens() {
        assert_eq!(Camera::normalize("front"), Camera::Front);
        assert_eq!(Camera::normalize("left"), Camera::LeftRepeater);
        assert_eq!(Camera::normalize("left_repeater"), Camera::LeftRepeater);
        assert_eq!(Camera::normalize("right"), Camera::RightRepeater);
        assert_eq!(Camera::normalize("left_pillar"), Camera::LeftPillar);
        assert_eq!(Camera::normalize("bogus"), Camera::Unknown);
    }

    #[test]
    fn mirrorable_excludes_front_and_pillars() {
        assert!(!Camera::Front.is_mirrorable());
        assert!(!Camera::LeftPillar.is_mirrorable());
        assert!(!Camera::RightPillar.is_mirrorable());
        assert!(Camera::Back.is_mirrorable());
        assert!(Camera::LeftRepeater.is_mirrorable());
        assert!(Camera::RightRepeater.is_mirrorable());
    }
}
