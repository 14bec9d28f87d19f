//! Migration identity, direction, and status types.

use crate::error::CoreError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Positive numeric migration identifier.
///
/// The id is the only ordering key and the primary key of the log table.
/// Values are kept within `1..=i64::MAX` so they bind losslessly as a
/// signed 64-bit database integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationId(u64);

impl MigrationId {
    /// Create an id, returning `None` for zero or values above `i64::MAX`.
    pub fn new(id: u64) -> Option<Self> {
        if id == 0 || id > i64::MAX as u64 {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Value as a signed integer for binding into SQL parameters.
    pub fn as_i64(self) -> i64 {
        // Range is enforced by `new`
        self.0 as i64
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which half of a migration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward-apply
    Up,
    /// Revert
    Down,
}

impl Direction {
    /// Status a migration ends up in after this direction commits.
    pub fn target_status(self) -> MigrationStatus {
        match self {
            Direction::Up => MigrationStatus::Active,
            Direction::Down => MigrationStatus::Inactive,
        }
    }

    /// Token used in artifact names.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(CoreError::InvalidDirection(s.to_string())),
        }
    }
}

/// Whether a migration is currently applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Not applied, or successfully rolled back
    #[default]
    Inactive,
    /// Up half committed with no later down committed
    Active,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Inactive => write!(f, "inactive"),
            MigrationStatus::Active => write!(f, "active"),
        }
    }
}

/// One numbered, paired unit of database change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    /// Numeric identifier and ordering key
    pub id: MigrationId,
    /// Descriptive label taken from the artifact name
    pub name: String,
    /// Locator of the up script, resolved by the artifact source
    pub up_location: String,
    /// Locator of the down script, resolved by the artifact source
    pub down_location: String,
    /// Current applied status
    pub status: MigrationStatus,
}

impl Migration {
    /// Create an inactive migration.
    pub fn new(
        id: MigrationId,
        name: impl Into<String>,
        up_location: impl Into<String>,
        down_location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            up_location: up_location.into(),
            down_location: down_location.into(),
            status: MigrationStatus::Inactive,
        }
    }

    /// A migration is usable only with a name and both halves present.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.up_location.is_empty() && !self.down_location.is_empty()
    }

    /// Locator of the script for `direction`.
    pub fn location(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up_location,
            Direction::Down => &self.down_location,
        }
    }

    /// Whether the migration is applied.
    pub fn is_active(&self) -> bool {
        self.status == MigrationStatus::Active
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
