//! The set of discovered migrations, keyed by id.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, MigrationId, MigrationStatus};
use std::collections::BTreeMap;

/// Discovered migrations keyed by numeric id.
///
/// Built once by discovery; afterwards only the status of an entry changes.
/// Callers get owned snapshots, never references they could mutate through.
#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    migrations: BTreeMap<MigrationId, Migration>,
}

impl MigrationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a migration, replacing any previous entry with the same id.
    ///
    /// Rejects migrations that fail [`Migration::is_valid`].
    pub fn insert(&mut self, migration: Migration) -> CoreResult<Option<Migration>> {
        if !migration.is_valid() {
            let path = if migration.up_location.is_empty() {
                migration.down_location.clone()
            } else {
                migration.up_location.clone()
            };
            return Err(CoreError::InvalidMigrationPair {
                id: migration.id.get(),
                path,
            });
        }
        Ok(self.migrations.insert(migration.id, migration))
    }

    /// Number of migrations
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether no migrations were discovered
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Look up a migration by id
    pub fn get(&self, id: MigrationId) -> Option<&Migration> {
        self.migrations.get(&id)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: MigrationId) -> bool {
        self.migrations.contains_key(&id)
    }

    /// All ids in ascending order
    pub fn ids(&self) -> Vec<MigrationId> {
        self.migrations.keys().copied().collect()
    }

    /// Migrations with `status` (or all when `None`), ascending by id.
    pub fn list_by_status(&self, status: Option<MigrationStatus>) -> Vec<Migration> {
        self.migrations
            .values()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .cloned()
            .collect()
    }

    /// Count migrations with `status`
    pub fn count(&self, status: MigrationStatus) -> usize {
        self.migrations
            .values()
            .filter(|m| m.status == status)
            .count()
    }

    /// Record a committed status transition. Returns `false` for unknown ids.
    pub fn set_status(&mut self, id: MigrationId, status: MigrationStatus) -> bool {
        match self.migrations.get_mut(&id) {
            Some(migration) => {
                migration.status = status;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
