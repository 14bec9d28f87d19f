//! keel-migrate - Migration engine for Keel
//!
//! [`Migrator`] applies and reverts numbered up/down SQL scripts one
//! transaction per migration, recording applied ids in a log table so that
//! repeated runs are idempotent.

pub mod error;
pub mod migrator;

pub use error::{MigrateError, MigrateResult};
pub use migrator::{Migrator, StatusCounts};
