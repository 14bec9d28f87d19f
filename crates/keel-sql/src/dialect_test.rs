use super::*;
use sqlparser::parser::Parser;

fn dialects() -> Vec<Box<dyn MigrationDialect>> {
    vec![
        dialect_for(DbType::DuckDb, "schema_log"),
        dialect_for(DbType::Sqlite, "schema_log"),
    ]
}

#[test]
fn test_dialect_for() {
    assert_eq!(dialect_for(DbType::DuckDb, "t").name(), "duckdb");
    assert_eq!(dialect_for(DbType::Sqlite, "t").name(), "sqlite");
}

#[test]
fn test_default_log_table() {
    assert_eq!(DuckDbDialect::default().log_table(), DEFAULT_LOG_TABLE);
    assert_eq!(SqliteDialect::default().log_table(), DEFAULT_LOG_TABLE);
}

#[test]
fn test_quote_ident() {
    let dialect = DuckDbDialect::default();
    assert_eq!(dialect.quote_ident("log"), "\"log\"");
    assert_eq!(dialect.quote_ident("lo\"g"), "\"lo\"\"g\"");
}

#[test]
fn test_log_statements_reference_table() {
    for dialect in dialects() {
        for sql in [
            dialect.create_log_table_statement(),
            dialect.lookup_log_entry_statement(),
            dialect.insert_log_entry_statement(),
            dialect.delete_log_entry_statement(),
        ] {
            assert!(
                sql.contains("\"schema_log\""),
                "{} statement missing table: {sql}",
                dialect.name()
            );
        }
    }
}

#[test]
fn test_log_statements_parse() {
    for dialect in dialects() {
        for sql in [
            dialect.create_log_table_statement(),
            dialect.probe_log_table_statement(),
            dialect.lookup_log_entry_statement(),
            dialect.insert_log_entry_statement(),
            dialect.delete_log_entry_statement(),
        ] {
            let parsed = Parser::parse_sql(dialect.parser_dialect(), &sql);
            assert!(
                parsed.is_ok(),
                "{} failed to parse {sql}: {:?}",
                dialect.name(),
                parsed.err()
            );
        }
    }
}

#[test]
fn test_parameterized_statements_have_one_placeholder() {
    for dialect in dialects() {
        for sql in [
            dialect.probe_log_table_statement(),
            dialect.lookup_log_entry_statement(),
            dialect.insert_log_entry_statement(),
            dialect.delete_log_entry_statement(),
        ] {
            assert_eq!(sql.matches('?').count(), 1, "{sql}");
        }
    }
}

#[test]
fn test_split_statements_uses_dialect() {
    let dialect = SqliteDialect::default();
    let stmts = dialect
        .split_statements("CREATE TABLE a (id INTEGER);\nCREATE INDEX a_id ON a (id);")
        .unwrap();
    assert_eq!(stmts.len(), 2);
}
