//! Control keywords that halt or special-case a description

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKeyword {
    /// `Not` ("Not offered ...")
    Not,
    /// `All` ("All terms")
    All,
    /// `summer` ("... except summer")
    Summer,
    /// `Arrange`, `arranged`, `ARR` in any casing
    Arrange,
    /// Lab and discussion hours
    LabOrDiscussion,
    /// `Times` ("Times vary")
    Times,
    /// Distributive listing
    Dist,
    /// `Varies` or `vary`: offerings are listed per topic elsewhere
    Varies,
    /// `See`, `Section`, `field`, `Identical`: cross references
    CrossReference,
}

/// What the state machine does after a control keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    /// Stop reading tokens; the final flush still runs
    Halt,
    /// Apply the keyword and keep reading
    Continue,
    /// Ignore the token
    Skip,
}

impl ControlKeyword {
    /// Match a cleaned token. Checks run in a fixed order; the first hit wins.
    pub fn match_token(cleaned: &str) -> Option<Self> {
        if cleaned == "Not" {
            return Some(Self::Not);
        }
        if cleaned == "All" {
            return Some(Self::All);
        }
        if cleaned == "summer" {
            return Some(Self::Summer);
        }
        if cleaned == "Arrange" || cleaned == "arranged" || cleaned.eq_ignore_ascii_case("ARR") {
            return Some(Self::Arrange);
        }

        let upper = cleaned.to_uppercase();
        if upper.contains("LAB") || upper.contains("DISCUSSION") {
            return Some(Self::LabOrDiscussion);
        }
        if cleaned.contains("Times") {
            return Some(Self::Times);
        }
        if cleaned.contains("Dist") {
            return Some(Self::Dist);
        }
        if cleaned == "Varies" || cleaned == "vary" {
            return Some(Self::Varies);
        }
        if cleaned == "See"
            || cleaned.contains("Section")
            || cleaned.contains("field")
            || cleaned.contains("Field")
            || cleaned.contains("Identical")
        {
            return Some(Self::CrossReference);
        }

        None
    }

    pub fn effect(self) -> ControlEffect {
        match self {
            Self::All | Self::Summer => ControlEffect::Continue,
            Self::Times => ControlEffect::Skip,
            Self::Not
            | Self::Arrange
            | Self::LabOrDiscussion
            | Self::Dist
            | Self::Varies
            | Self::CrossReference => ControlEffect::Halt,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "Not",
            Self::All => "All",
            Self::Summer => "summer",
            Self::Arrange => "Arrange",
            Self::LabOrDiscussion => "LAB",
            Self::Times => "Times",
            Self::Dist => "Dist",
            Self::Varies => "Varies",
            Self::CrossReference => "See",
        }
    }
}

impl std::fmt::Display for ControlKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
