//! keel-core - Core library for Keel
//!
//! This crate provides the migration data model, the artifact naming scheme,
//! artifact sources (directory and embedded bundle), discovery and pairing of
//! up/down scripts into a [`MigrationRegistry`], and `keel.yml` parsing.

pub mod config;
pub mod discovery;
pub mod error;
pub mod migration;
pub mod naming;
pub mod registry;
pub mod source;

pub use config::{Config, DbType};
pub use discovery::discover_migrations;
pub use error::{CoreError, CoreResult};
pub use migration::{Direction, Migration, MigrationId, MigrationStatus};
pub use naming::{artifact_file_name, parse_artifact_name, ArtifactName};
pub use registry::MigrationRegistry;
pub use source::{ArtifactSource, DirectorySource, EmbeddedSource};
