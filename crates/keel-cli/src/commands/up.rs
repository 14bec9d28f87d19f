//! Up command implementation

use anyhow::{Context, Result};
use keel_core::Direction;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{join_ids, load_project, open_migrator, parse_migration_id};

/// Execute the up command
pub fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;

    if let Some(raw) = args.only {
        let id = parse_migration_id(raw)?;
        migrator
            .apply_migration(id, Direction::Up)
            .with_context(|| format!("Failed to apply migration {}", id))?;
        println!("Applied migration {}", id);
        return Ok(());
    }

    let applied = migrator.migrate().context("Migration failed")?;
    if applied.is_empty() {
        println!("Database is up to date");
    } else {
        println!(
            "Applied {} migration(s): {}",
            applied.len(),
            join_ids(&applied)
        );
    }
    Ok(())
}
