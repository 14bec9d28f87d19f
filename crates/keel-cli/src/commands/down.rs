//! Down command implementation

use anyhow::{Context, Result};
use keel_core::Direction;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{join_ids, load_project, open_migrator, parse_migration_id};

/// Execute the down command
pub fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let mut migrator = open_migrator(&project)?;

    if let Some(raw) = args.only {
        let id = parse_migration_id(raw)?;
        migrator
            .apply_migration(id, Direction::Down)
            .with_context(|| format!("Failed to roll back migration {}", id))?;
        println!("Rolled back migration {}", id);
        return Ok(());
    }

    let reverted = if args.all {
        migrator.rollback_all()
    } else {
        migrator.rollback_n(args.count)
    }
    .context("Rollback failed")?;

    if reverted.is_empty() {
        println!("No active migrations to roll back");
    } else {
        println!(
            "Rolled back {} migration(s): {}",
            reverted.len(),
            join_ids(&reverted)
        );
    }
    Ok(())
}
