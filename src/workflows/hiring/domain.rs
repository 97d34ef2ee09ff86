use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned to an application by its collection. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u32);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the candidate is new to the organisation or returning.
///
/// New candidates pass through a reference check after their interview; returning
/// candidates go straight to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationKind {
    New,
    Old,
}

impl ApplicationKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::New, Self::Old]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Old => "Old",
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationKind {
    type Err = UnknownToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownToken::new("application kind", value))
    }
}

/// Position of an application in the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewState {
    Review,
    Interview,
    Waitlist,
    RefCheck,
    Offer,
    Closed,
}

impl ReviewState {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Review,
            Self::Interview,
            Self::Waitlist,
            Self::RefCheck,
            Self::Offer,
            Self::Closed,
        ]
    }

    /// Canonical name. Doubles as the note prefix and the persisted token.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Interview => "Interview",
            Self::Waitlist => "Waitlist",
            Self::RefCheck => "RefCheck",
            Self::Offer => "Offer",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReviewState {
    type Err = UnknownToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownToken::new("review state", value))
    }
}

/// Outcome recorded against an application by the last transition that carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    ReviewCompleted,
    InterviewCompleted,
    ReferenceCheckCompleted,
    OfferCompleted,
}

impl Resolution {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::ReviewCompleted,
            Self::InterviewCompleted,
            Self::ReferenceCheckCompleted,
            Self::OfferCompleted,
        ]
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::ReviewCompleted => "ReviewCompleted",
            Self::InterviewCompleted => "InterviewCompleted",
            Self::ReferenceCheckCompleted => "ReferenceCheckCompleted",
            Self::OfferCompleted => "OfferCompleted",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Resolution {
    type Err = UnknownToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|resolution| resolution.token().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownToken::new("resolution", value))
    }
}

/// Instruction verbs understood by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Accept,
    Reject,
    Standby,
    Reopen,
}

impl Action {
    pub const fn ordered() -> [Self; 4] {
        [Self::Accept, Self::Reject, Self::Standby, Self::Reopen]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
            Self::Standby => "STANDBY",
            Self::Reopen => "REOPEN",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = UnknownToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownToken::new("action", value))
    }
}

/// A token that does not name any variant of the vocabulary it was parsed against.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} '{value}'")]
pub struct UnknownToken {
    pub vocabulary: &'static str,
    pub value: String,
}

impl UnknownToken {
    fn new(vocabulary: &'static str, value: &str) -> Self {
        Self {
            vocabulary,
            value: value.to_string(),
        }
    }
}
