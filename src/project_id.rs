use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Raised if a project ID cannot be parsed from a string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseProjectIdError {
    /// A project ID needs to be a valid integer.
    #[error("invalid value for project id")]
    InvalidValue,
    /// A project ID cannot be empty.
    #[error("empty or missing project id")]
    EmptyValue,
}

/// Represents a project ID.
///
/// This is the numeric project identifier that is part of an endpoint
/// descriptor (the last path segment of a DSN).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Creates a new project ID from its numeric value.
    pub fn new(id: u64) -> ProjectId {
        ProjectId(id)
    }

    /// Returns the numeric value of this project ID.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProjectId {
    fn from(value: u64) -> ProjectId {
        ProjectId(value)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = ParseProjectIdError;

    fn from_str(s: &str) -> Result<ProjectId, ParseProjectIdError> {
        if s.is_empty() {
            return Err(ParseProjectIdError::EmptyValue);
        }
        s.parse()
            .map(ProjectId)
            .map_err(|_| ParseProjectIdError::InvalidValue)
    }
}
