//! Migration discovery: enumerate artifacts, pair up/down halves by id.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, Migration, MigrationId};
use crate::naming::parse_artifact_name;
use crate::registry::MigrationRegistry;
use crate::source::ArtifactSource;
use std::collections::BTreeMap;

/// Halves seen so far for one id.
struct PendingPair {
    name: String,
    up: Option<String>,
    down: Option<String>,
}

/// Build the migration registry from everything `source` can see.
///
/// Artifacts whose names do not follow the naming scheme are logged and
/// skipped. Every id must end up with exactly one up and one down artifact;
/// the first id missing a half fails discovery with
/// [`CoreError::InvalidMigrationPair`]. An empty location yields an empty
/// registry.
pub fn discover_migrations(source: &dyn ArtifactSource) -> CoreResult<MigrationRegistry> {
    log::debug!("Migrations location: {}", source.describe());

    let mut pending: BTreeMap<MigrationId, PendingPair> = BTreeMap::new();

    for locator in source.locate()? {
        let Some(artifact) = parse_artifact_name(&locator) else {
            if locator.ends_with(".sql") {
                log::warn!("Invalid migration file found: {locator}");
            } else {
                log::debug!("Skipping non-migration file: {locator}");
            }
            continue;
        };

        log::debug!("Migration file found: {locator}");

        let pair = pending.entry(artifact.id).or_insert_with(|| PendingPair {
            name: artifact.name.clone(),
            up: None,
            down: None,
        });

        if pair.name != artifact.name {
            log::warn!(
                "Migration {} has mismatched names '{}' and '{}'; using '{}'",
                artifact.id,
                pair.name,
                artifact.name,
                pair.name
            );
        }

        let slot = match artifact.direction {
            Direction::Up => &mut pair.up,
            Direction::Down => &mut pair.down,
        };
        if let Some(first) = slot.as_ref() {
            return Err(CoreError::DuplicateMigration {
                id: artifact.id.get(),
                direction: artifact.direction.to_string(),
                first: first.clone(),
                second: locator,
            });
        }
        *slot = Some(locator);
    }

    let mut registry = MigrationRegistry::new();
    for (id, pair) in pending {
        match (pair.up, pair.down) {
            (Some(up), Some(down)) => {
                registry.insert(Migration::new(id, pair.name, up, down))?;
            }
            (up, down) => {
                let path = up.or(down).unwrap_or_default();
                log::warn!("Invalid migration pair for path: {path}");
                return Err(CoreError::InvalidMigrationPair { id: id.get(), path });
            }
        }
    }

    log::info!("Migration file pairs found: {}", registry.len());
    Ok(registry)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
