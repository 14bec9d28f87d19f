use super::*;
use keel_core::CoreResult;
use keel_db::{DbError, DbResult, DuckDbBackend};
use keel_sql::DuckDbDialect;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scripts held in memory, keyed by file name.
#[derive(Default)]
struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    fn with(mut self, name: &str, sql: &str) -> Self {
        self.files.insert(name.to_string(), sql.to_string());
        self
    }
}

impl ArtifactSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn locate(&self) -> CoreResult<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, locator: &str) -> CoreResult<Vec<u8>> {
        self.files
            .get(locator)
            .map(|sql| sql.as_bytes().to_vec())
            .ok_or_else(|| CoreError::ArtifactRead {
                locator: locator.to_string(),
                message: "missing".to_string(),
            })
    }
}

/// DuckDB backend that counts executed statements and can be told to fail
/// individual steps.
struct InstrumentedDb {
    inner: DuckDbBackend,
    executed: Arc<AtomicUsize>,
    fail_commit: bool,
    fail_probe: bool,
    fail_create: bool,
    fail_rollback: bool,
}

impl InstrumentedDb {
    fn new(executed: Arc<AtomicUsize>) -> Self {
        Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            executed,
            fail_commit: false,
            fail_probe: false,
            fail_create: false,
            fail_rollback: false,
        }
    }
}

impl Database for InstrumentedDb {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        if self.fail_create && sql.starts_with("CREATE TABLE IF NOT EXISTS") {
            return Err(DbError::ExecutionError("create refused".to_string()));
        }
        self.inner.execute(sql)
    }

    fn execute_with(&self, sql: &str, param: &SqlParam) -> DbResult<usize> {
        self.inner.execute_with(sql, param)
    }

    fn row_exists(&self, sql: &str, param: &SqlParam) -> DbResult<bool> {
        if self.fail_probe {
            return Err(DbError::ExecutionError("probe refused".to_string()));
        }
        self.inner.row_exists(sql, param)
    }

    fn begin(&self) -> DbResult<()> {
        self.inner.begin()
    }

    fn commit(&self) -> DbResult<()> {
        if self.fail_commit {
            return Err(DbError::TransactionError {
                operation: "COMMIT".to_string(),
                message: "connection lost".to_string(),
            });
        }
        self.inner.commit()
    }

    fn rollback(&self) -> DbResult<()> {
        // Still end the real transaction so the connection stays usable
        self.inner.rollback()?;
        if self.fail_rollback {
            return Err(DbError::TransactionError {
                operation: "ROLLBACK".to_string(),
                message: "connection lost".to_string(),
            });
        }
        Ok(())
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.inner.query_count(sql)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

fn two_migrations() -> MemorySource {
    MemorySource::default()
        .with("001_init.up.sql", "CREATE TABLE users (id INT);")
        .with("001_init.down.sql", "DROP TABLE users;")
        .with(
            "002_add_col.up.sql",
            "ALTER TABLE users ADD COLUMN email VARCHAR;",
        )
        .with("002_add_col.down.sql", "ALTER TABLE users DROP COLUMN email;")
}

fn three_tables() -> MemorySource {
    let mut source = MemorySource::default();
    for n in 1..=3 {
        source = source
            .with(&format!("00{n}_t{n}.up.sql"), &format!("CREATE TABLE t{n} (id INT);"))
            .with(&format!("00{n}_t{n}.down.sql"), &format!("DROP TABLE t{n};"));
    }
    source
}

fn migrator(source: MemorySource) -> Migrator {
    Migrator::new(
        Box::new(DuckDbBackend::in_memory().unwrap()),
        Box::new(DuckDbDialect::default()),
        Box::new(source),
    )
    .unwrap()
}

fn id(n: u64) -> MigrationId {
    MigrationId::new(n).unwrap()
}

fn ids(ns: &[u64]) -> Vec<MigrationId> {
    ns.iter().map(|&n| id(n)).collect()
}

fn logged_ids(m: &Migrator) -> usize {
    m.db()
        .query_count("SELECT migration_id FROM keel_migrations")
        .unwrap()
}

fn is_logged(m: &Migrator, n: u64) -> bool {
    m.db()
        .row_exists(
            "SELECT migration_id FROM keel_migrations WHERE migration_id = ?",
            &SqlParam::Integer(n as i64),
        )
        .unwrap()
}

fn table_exists(m: &Migrator, table: &str) -> bool {
    m.db()
        .row_exists(
            "SELECT table_name FROM information_schema.tables WHERE table_name = ?",
            &SqlParam::Text(table.to_string()),
        )
        .unwrap()
}

#[test]
fn test_new_creates_log_table_and_discovers() {
    let m = migrator(two_migrations());
    assert!(table_exists(&m, "keel_migrations"));
    assert_eq!(
        m.status_counts(),
        StatusCounts {
            active: 0,
            inactive: 2
        }
    );
    assert_eq!(m.get(id(2)).unwrap().name, "add_col");
}

#[test]
fn test_new_with_empty_source() {
    let m = migrator(MemorySource::default());
    assert!(m.migrations().is_empty());
    assert_eq!(m.status_counts().total(), 0);
}

#[test]
fn test_scenario_migrate_then_rollback_one() {
    let mut m = migrator(two_migrations());
    assert_eq!(m.migrate().unwrap(), ids(&[1, 2]));
    assert!(m.migrations().iter().all(Migration::is_active));
    assert!(is_logged(&m, 1));
    assert!(is_logged(&m, 2));

    assert_eq!(m.rollback_n(1).unwrap(), ids(&[2]));
    assert_eq!(m.get(id(2)).unwrap().status, MigrationStatus::Inactive);
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Active);
    assert!(!is_logged(&m, 2));
    assert!(is_logged(&m, 1));
}

#[test]
fn test_migrate_is_idempotent() {
    let executed = Arc::new(AtomicUsize::new(0));
    let mut m = Migrator::new(
        Box::new(InstrumentedDb::new(executed.clone())),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .unwrap();

    m.migrate().unwrap();
    let after_first = executed.load(Ordering::SeqCst);
    assert!(after_first >= 2);

    assert!(m.migrate().unwrap().is_empty());
    assert_eq!(executed.load(Ordering::SeqCst), after_first);
}

#[test]
fn test_apply_then_revert_round_trip() {
    let mut m = migrator(two_migrations());
    m.apply_migration(id(1), Direction::Up).unwrap();
    assert!(is_logged(&m, 1));
    assert!(table_exists(&m, "users"));

    m.apply_migration(id(1), Direction::Down).unwrap();
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Inactive);
    assert!(!is_logged(&m, 1));
    assert!(!table_exists(&m, "users"));
}

#[test]
fn test_apply_migration_usage_errors() {
    let mut m = migrator(two_migrations());

    let err = m.apply_migration(id(9), Direction::Up).unwrap_err();
    assert!(matches!(err, MigrateError::UnknownMigration(_)));

    let err = m.apply_migration(id(1), Direction::Down).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::InvalidTransition {
            status: MigrationStatus::Inactive,
            ..
        }
    ));

    m.apply_migration(id(1), Direction::Up).unwrap();
    let err = m.apply_migration(id(1), Direction::Up).unwrap_err();
    assert!(matches!(err, MigrateError::InvalidTransition { .. }));
    assert_eq!(logged_ids(&m), 1);
}

#[test]
fn test_rollback_n_larger_than_active_reverts_all() {
    let mut m = migrator(three_tables());
    m.migrate().unwrap();

    assert_eq!(m.rollback_n(10).unwrap(), ids(&[3, 2, 1]));
    assert_eq!(m.status_counts().active, 0);
    assert_eq!(logged_ids(&m), 0);
}

#[test]
fn test_rollback_n_with_nothing_active_is_noop() {
    let mut m = migrator(three_tables());
    assert!(m.rollback_n(2).unwrap().is_empty());
    assert!(m.rollback().unwrap().is_empty());
    assert!(m.rollback_all().unwrap().is_empty());
}

#[test]
fn test_rollback_counts_active_migrations_across_gaps() {
    let mut m = migrator(three_tables());
    m.migrate().unwrap();
    m.apply_migration(id(3), Direction::Down).unwrap();

    // Active = {1, 2}; the top of that stack is 2
    assert_eq!(m.rollback().unwrap(), ids(&[2]));
    assert_eq!(
        m.list_by_status(Some(MigrationStatus::Active))
            .iter()
            .map(|mig| mig.id)
            .collect::<Vec<_>>(),
        ids(&[1])
    );
}

#[test]
fn test_rollback_all() {
    let mut m = migrator(three_tables());
    m.migrate().unwrap();
    assert_eq!(m.rollback_all().unwrap(), ids(&[3, 2, 1]));
    assert!(!table_exists(&m, "t1"));
}

#[test]
fn test_list_by_status_is_ascending() {
    let source = MemorySource::default()
        .with("010_c.up.sql", "SELECT 1;")
        .with("010_c.down.sql", "SELECT 1;")
        .with("002_a.up.sql", "SELECT 1;")
        .with("002_a.down.sql", "SELECT 1;")
        .with("7_b_up.sql", "SELECT 1;")
        .with("7_b_down.sql", "SELECT 1;");
    let m = migrator(source);
    let listed: Vec<_> = m.list_by_status(None).iter().map(|mig| mig.id).collect();
    assert_eq!(listed, ids(&[2, 7, 10]));
}

#[test]
fn test_missing_down_half_fails_construction() {
    let source = two_migrations().with("003_broken.up.sql", "SELECT 1;");
    let err = Migrator::new(
        Box::new(DuckDbBackend::in_memory().unwrap()),
        Box::new(DuckDbDialect::default()),
        Box::new(source),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        MigrateError::Discovery(CoreError::InvalidMigrationPair { id: 3, .. })
    ));
}

#[test]
fn test_failing_second_statement_rolls_back() {
    let source = MemorySource::default()
        .with(
            "001_partial.up.sql",
            "CREATE TABLE kept (id INT);\nINSERT INTO nowhere VALUES (1);\n",
        )
        .with("001_partial.down.sql", "DROP TABLE kept;");
    let mut m = migrator(source);

    let err = m.migrate().unwrap_err();
    match &err {
        MigrateError::Statement {
            index, source, ..
        } => {
            assert_eq!(*index, 2);
            assert!(source.to_string().contains("nowhere"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retry_safe());
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Inactive);
    assert_eq!(logged_ids(&m), 0);
    assert!(!table_exists(&m, "kept"));
}

#[test]
fn test_migrate_stops_at_first_failure() {
    let source = MemorySource::default()
        .with("001_ok.up.sql", "CREATE TABLE ok (id INT);")
        .with("001_ok.down.sql", "DROP TABLE ok;")
        .with("002_bad.up.sql", "CREATE TABLE (;")
        .with("002_bad.down.sql", "SELECT 1;")
        .with("003_never.up.sql", "CREATE TABLE never (id INT);")
        .with("003_never.down.sql", "DROP TABLE never;");
    let mut m = migrator(source);

    let err = m.migrate().unwrap_err();
    assert_eq!(err.migration_id(), Some(id(2)));
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Active);
    assert_eq!(m.get(id(3)).unwrap().status, MigrationStatus::Inactive);
    assert!(!table_exists(&m, "never"));
}

#[test]
fn test_log_write_failure_rolls_back() {
    // The script claims its own log row, so the engine's insert collides
    let source = MemorySource::default()
        .with(
            "001_sneaky.up.sql",
            "CREATE TABLE sneaky (id INT);\nINSERT INTO keel_migrations (migration_id) VALUES (1);",
        )
        .with("001_sneaky.down.sql", "DROP TABLE sneaky;");
    let mut m = migrator(source);

    let err = m.migrate().unwrap_err();
    assert!(matches!(err, MigrateError::LogWrite { .. }));
    assert_eq!(logged_ids(&m), 0);
    assert!(!table_exists(&m, "sneaky"));
}

#[test]
fn test_commit_failure_leaves_status_unchanged() {
    let mut db = InstrumentedDb::new(Arc::new(AtomicUsize::new(0)));
    db.fail_commit = true;
    let mut m = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .unwrap();

    let err = m.migrate().unwrap_err();
    assert!(matches!(err, MigrateError::Commit { .. }));
    assert!(!err.is_retry_safe());
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Inactive);
}

#[test]
fn test_probe_failure_is_bootstrap_error() {
    let mut db = InstrumentedDb::new(Arc::new(AtomicUsize::new(0)));
    db.fail_probe = true;
    let err = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, MigrateError::Bootstrap { .. }));
    assert!(!err.is_retry_safe());
}

#[test]
fn test_create_failure_is_bootstrap_error() {
    let mut db = InstrumentedDb::new(Arc::new(AtomicUsize::new(0)));
    db.fail_create = true;
    let err = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .err()
    .unwrap();
    match &err {
        MigrateError::Bootstrap { table, .. } => assert_eq!(table, "keel_migrations"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retry_safe());
}

#[test]
fn test_failed_rollback_supersedes_statement_error() {
    let mut db = InstrumentedDb::new(Arc::new(AtomicUsize::new(0)));
    db.fail_rollback = true;
    let source = MemorySource::default()
        .with(
            "001_partial.up.sql",
            "CREATE TABLE kept (id INT);\nINSERT INTO nowhere VALUES (1);",
        )
        .with("001_partial.down.sql", "DROP TABLE kept;");
    let mut m = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(source),
    )
    .unwrap();

    let err = m.migrate().unwrap_err();
    match &err {
        MigrateError::TransactionRollback { id: failed, original, .. } => {
            assert_eq!(*failed, id(1));
            assert!(matches!(
                original.as_ref(),
                MigrateError::Statement { index: 2, .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Inactive);
    assert_eq!(logged_ids(&m), 0);
}

#[test]
fn test_log_table_in_other_schema_is_ignored() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE SCHEMA audit").unwrap();
    db.execute("CREATE TABLE audit.keel_migrations (x INT)").unwrap();

    let mut m = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .unwrap();
    assert_eq!(m.migrate().unwrap(), ids(&[1, 2]));
    assert!(is_logged(&m, 2));
}

#[test]
fn test_status_loaded_from_existing_log() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE keel_migrations (migration_id BIGINT PRIMARY KEY)")
        .unwrap();
    db.execute("INSERT INTO keel_migrations VALUES (2)").unwrap();

    let m = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .unwrap();
    assert_eq!(m.get(id(1)).unwrap().status, MigrationStatus::Inactive);
    assert_eq!(m.get(id(2)).unwrap().status, MigrationStatus::Active);
}

#[test]
fn test_unusable_log_table_is_status_lookup_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE keel_migrations (version INT)").unwrap();

    let err = Migrator::new(
        Box::new(db),
        Box::new(DuckDbDialect::default()),
        Box::new(two_migrations()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, MigrateError::StatusLookup { .. }));
}

#[test]
fn test_missing_artifact_is_read_error() {
    struct Forgetful(MemorySource);
    impl ArtifactSource for Forgetful {
        fn describe(&self) -> String {
            self.0.describe()
        }
        fn locate(&self) -> CoreResult<Vec<String>> {
            self.0.locate()
        }
        fn read(&self, locator: &str) -> CoreResult<Vec<u8>> {
            Err(CoreError::ArtifactRead {
                locator: locator.to_string(),
                message: "gone".to_string(),
            })
        }
    }

    let mut m = Migrator::new(
        Box::new(DuckDbBackend::in_memory().unwrap()),
        Box::new(DuckDbDialect::default()),
        Box::new(Forgetful(two_migrations())),
    )
    .unwrap();
    let err = m.migrate().unwrap_err();
    assert!(matches!(err, MigrateError::ArtifactRead { .. }));
    assert!(err.is_retry_safe());
}

#[test]
fn test_unsplittable_script_is_split_error() {
    let source = MemorySource::default()
        .with("001_bad.up.sql", "SELECT 'unterminated")
        .with("001_bad.down.sql", "SELECT 1;");
    let mut m = migrator(source);
    let err = m.migrate().unwrap_err();
    assert!(matches!(err, MigrateError::Split { .. }));
    assert_eq!(logged_ids(&m), 0);
}

#[test]
fn test_empty_script_still_logs() {
    let source = MemorySource::default()
        .with("001_noop.up.sql", "-- nothing yet\n")
        .with("001_noop.down.sql", "");
    let mut m = migrator(source);
    m.migrate().unwrap();
    assert!(is_logged(&m, 1));
    m.rollback().unwrap();
    assert!(!is_logged(&m, 1));
}

#[test]
fn test_custom_log_table() {
    let mut m = Migrator::new(
        Box::new(DuckDbBackend::in_memory().unwrap()),
        Box::new(DuckDbDialect::new("schema_history")),
        Box::new(two_migrations()),
    )
    .unwrap();
    m.migrate().unwrap();
    let db = m.into_database();
    assert_eq!(
        db.query_count("SELECT migration_id FROM schema_history")
            .unwrap(),
        2
    );
}
