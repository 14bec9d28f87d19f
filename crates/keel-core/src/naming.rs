//! Migration artifact naming scheme.
//!
//! Artifacts are named `<id>_<name>.<up|down>.sql` (or the underscore form
//! `<id>_<name>_<up|down>.sql`). Anything else at a migration location is
//! ignored by discovery.

use crate::migration::{Direction, MigrationId};
use regex::Regex;
use std::sync::OnceLock;

/// The `(id, direction, name)` triple encoded in an artifact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    /// Numeric migration id
    pub id: MigrationId,
    /// Which half of the migration the artifact holds
    pub direction: Direction,
    /// Free-text label
    pub name: String,
}

static ARTIFACT_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn artifact_name_re() -> &'static Regex {
    ARTIFACT_NAME_RE.get_or_init(|| {
        Regex::new(r"^(\d+)_([\w-]+?)[._](up|down)\.sql$").expect("valid regex literal")
    })
}

/// Parse an artifact name (or a path/asset key ending in one).
///
/// Only the last `/`-separated component is inspected. Returns `None` when
/// the name does not follow the scheme or the id is zero or out of range.
pub fn parse_artifact_name(locator: &str) -> Option<ArtifactName> {
    let file_name = locator
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(locator);

    let caps = artifact_name_re().captures(file_name)?;
    let id = caps[1].parse::<u64>().ok().and_then(MigrationId::new)?;
    let direction = match &caps[3] {
        "up" => Direction::Up,
        _ => Direction::Down,
    };

    Some(ArtifactName {
        id,
        direction,
        name: caps[2].to_string(),
    })
}

/// Render the canonical artifact file name for one half of a migration.
pub fn artifact_file_name(id: MigrationId, name: &str, direction: Direction) -> String {
    format!("{:03}_{}.{}.sql", id.get(), name, direction)
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
