//! New command implementation

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use keel_core::{
    artifact_file_name, parse_artifact_name, ArtifactSource, Direction, DirectorySource,
    MigrationId,
};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_project;

/// Execute the new command
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = project.migrations_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create migrations directory {}", dir.display()))?;

    let id = if args.timestamp {
        timestamp_id(Local::now().naive_local())?
    } else {
        next_sequential_id(&dir)?
    };

    let paths = create_pair(&dir, id, &args.name)?;
    for path in &paths {
        println!("Created {}", path.display());
    }
    Ok(())
}

/// One past the highest id already present in `dir`.
pub(crate) fn next_sequential_id(dir: &Path) -> Result<MigrationId> {
    let locators = DirectorySource::new(dir)
        .locate()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    let highest = locators
        .iter()
        .filter_map(|locator| parse_artifact_name(locator))
        .map(|artifact| artifact.id.get())
        .max()
        .unwrap_or(0);
    MigrationId::new(highest + 1)
        .with_context(|| format!("No migration id left after {}", highest))
}

/// Id made of the `YYYYMMDDHHMMSS` digits of `now`.
pub(crate) fn timestamp_id(now: NaiveDateTime) -> Result<MigrationId> {
    let digits = now.format("%Y%m%d%H%M%S").to_string();
    let raw: u64 = digits
        .parse()
        .with_context(|| format!("Invalid timestamp id {}", digits))?;
    MigrationId::new(raw).with_context(|| format!("Invalid timestamp id {}", digits))
}

/// Write empty up and down scripts for `id`, refusing to overwrite.
///
/// Both names are validated and checked for existing files before either
/// file is created.
pub(crate) fn create_pair(dir: &Path, id: MigrationId, name: &str) -> Result<Vec<PathBuf>> {
    let mut planned = Vec::with_capacity(2);
    for direction in [Direction::Up, Direction::Down] {
        let file_name = artifact_file_name(id, name, direction);
        match parse_artifact_name(&file_name) {
            Some(parsed) if parsed.id == id && parsed.name == name => {}
            _ => bail!(
                "Invalid migration name '{}': use letters, digits, '_' or '-'",
                name
            ),
        }

        let path = dir.join(&file_name);
        if path.exists() {
            bail!("Migration file {} already exists", path.display());
        }
        planned.push((direction, path));
    }

    let mut paths = Vec::with_capacity(planned.len());
    for (direction, path) in planned {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writeln!(file, "-- Migration {}: {} ({})", id, name, direction)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
