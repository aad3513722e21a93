use crate::error::ZestError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle stage of a spec. Declaration order is the lifecycle order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    Researched,
    Designed,
    Implemented,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::New,
            Status::Researched,
            Status::Designed,
            Status::Implemented,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Researched => "researched",
            Status::Designed => "designed",
            Status::Implemented => "implemented",
        }
    }

    /// Comma-separated list of every status, in lifecycle order.
    pub fn valid_list() -> String {
        Status::all()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse a persisted value; an unknown value is a data-integrity failure
    /// rather than a bad request.
    pub fn from_persisted(s: &str) -> Result<Status, ZestError> {
        s.parse()
            .map_err(|_| ZestError::InvalidCurrentStatus(s.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = ZestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Status::New),
            "researched" => Ok(Status::Researched),
            "designed" => Ok(Status::Designed),
            "implemented" => Ok(Status::Implemented),
            _ => Err(ZestError::InvalidStatus {
                status: s.to_string(),
                valid: Status::valid_list(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SpecRef
// ---------------------------------------------------------------------------

/// How a caller addresses a spec: by id, or through the current pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecRef {
    Current,
    Id(String),
}

impl SpecRef {
    pub const CURRENT_TOKEN: &'static str = "current";
}

impl std::str::FromStr for SpecRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SpecRef::CURRENT_TOKEN {
            Ok(SpecRef::Current)
        } else {
            Ok(SpecRef::Id(crate::paths::normalize_spec_id(s)))
        }
    }
}

impl fmt::Display for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecRef::Current => f.write_str(SpecRef::CURRENT_TOKEN),
            SpecRef::Id(id) => f.write_str(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
