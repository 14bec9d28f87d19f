//! Status command implementation

use anyhow::{Context, Result};
use keel_core::{MigrationId, MigrationStatus};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{load_project, open_migrator};

#[derive(Debug, Serialize)]
struct StatusReport {
    migrations: Vec<MigrationRow>,
    active: usize,
    inactive: usize,
}

#[derive(Debug, Serialize)]
struct MigrationRow {
    id: MigrationId,
    name: String,
    status: MigrationStatus,
}

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = open_migrator(&project)?;

    let counts = migrator.status_counts();
    let report = StatusReport {
        migrations: migrator
            .migrations()
            .into_iter()
            .map(|m| MigrationRow {
                id: m.id,
                name: m.name,
                status: m.status,
            })
            .collect(),
        active: counts.active,
        inactive: counts.inactive,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize status report")?;
        println!("{}", json);
    } else {
        print_table(&report);
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    if report.migrations.is_empty() {
        println!("No migrations found");
        return;
    }

    let id_width = report
        .migrations
        .iter()
        .map(|m| m.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let name_width = report
        .migrations
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:<id_width$}  {:<name_width$}  STATUS", "ID", "NAME");
    for m in &report.migrations {
        println!("{:<id_width$}  {:<name_width$}  {}", m.id.to_string(), m.name, m.status);
    }
    println!();
    println!("{} active, {} pending", report.active, report.inactive);
}
