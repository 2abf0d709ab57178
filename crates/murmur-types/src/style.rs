//! Conversational style identifiers.
//!
//! A style is a named tone/voice profile. The prompt fragments, cue patterns
//! and transition adjacency live in the style catalog in `murmur-core`; this
//! module only defines the identifiers and their families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named conversational tone.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStyle {
    #[default]
    Casual,
    Formal,
    Playful,
    Humorous,
    Enthusiastic,
    Analytical,
    Philosophical,
    Technical,
    Precise,
    Empathetic,
    Supportive,
    Skeptical,
}

impl ConversationStyle {
    /// Every style, in catalog order. Detection ties resolve to the earlier entry.
    pub const ALL: [ConversationStyle; 12] = [
        ConversationStyle::Casual,
        ConversationStyle::Formal,
        ConversationStyle::Playful,
        ConversationStyle::Humorous,
        ConversationStyle::Enthusiastic,
        ConversationStyle::Analytical,
        ConversationStyle::Philosophical,
        ConversationStyle::Technical,
        ConversationStyle::Precise,
        ConversationStyle::Empathetic,
        ConversationStyle::Supportive,
        ConversationStyle::Skeptical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStyle::Casual => "casual",
            ConversationStyle::Formal => "formal",
            ConversationStyle::Playful => "playful",
            ConversationStyle::Humorous => "humorous",
            ConversationStyle::Enthusiastic => "enthusiastic",
            ConversationStyle::Analytical => "analytical",
            ConversationStyle::Philosophical => "philosophical",
            ConversationStyle::Technical => "technical",
            ConversationStyle::Precise => "precise",
            ConversationStyle::Empathetic => "empathetic",
            ConversationStyle::Supportive => "supportive",
            ConversationStyle::Skeptical => "skeptical",
        }
    }

    /// Light-hearted styles. Also the "expressive" set biased by exclamation marks.
    pub fn is_playful_family(&self) -> bool {
        matches!(
            self,
            ConversationStyle::Playful | ConversationStyle::Humorous | ConversationStyle::Enthusiastic
        )
    }

    /// Reasoning-heavy styles biased by long messages.
    pub fn is_analytical_family(&self) -> bool {
        matches!(
            self,
            ConversationStyle::Analytical
                | ConversationStyle::Philosophical
                | ConversationStyle::Technical
                | ConversationStyle::Precise
        )
    }

    pub fn is_empathetic_family(&self) -> bool {
        matches!(self, ConversationStyle::Empathetic | ConversationStyle::Supportive)
    }
}

impl fmt::Display for ConversationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ConversationStyle::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == needle)
            .ok_or_else(|| format!("invalid conversation style: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_roundtrip() {
        for style in ConversationStyle::ALL {
            let parsed: ConversationStyle = style.to_string().parse().unwrap();
            assert_eq!(style, parsed);
        }
    }

    #[test]
    fn test_style_parse_is_case_insensitive() {
        assert_eq!(
            " Analytical ".parse::<ConversationStyle>().unwrap(),
            ConversationStyle::Analytical
        );
        assert!("sarcastic".parse::<ConversationStyle>().is_err());
    }

    #[test]
    fn test_families_are_disjoint() {
        for style in ConversationStyle::ALL {
            let memberships = [
                style.is_playful_family(),
                style.is_analytical_family(),
                style.is_empathetic_family(),
            ];
            assert!(memberships.iter().filter(|m| **m).count() <= 1, "{style}");
        }
    }

    #[test]
    fn test_default_is_casual() {
        assert_eq!(ConversationStyle::default(), ConversationStyle::Casual);
        let json = serde_json::to_string(&ConversationStyle::Casual).unwrap();
        assert_eq!(json, "\"casual\"");
    }
}
