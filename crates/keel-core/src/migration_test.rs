use super::*;

#[test]
fn test_migration_id_rejects_zero() {
    assert!(MigrationId::new(0).is_none());
    assert_eq!(MigrationId::new(7).unwrap().get(), 7);
}

#[test]
fn test_migration_id_rejects_values_above_i64() {
    assert!(MigrationId::new(i64::MAX as u64).is_some());
    assert!(MigrationId::new(i64::MAX as u64 + 1).is_none());
}

#[test]
fn test_migration_id_ordering_is_numeric() {
    let a = MigrationId::new(9).unwrap();
    let b = MigrationId::new(10).unwrap();
    assert!(a < b);
    assert_eq!(b.to_string(), "10");
}

#[test]
fn test_direction_from_str() {
    assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
    assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);

    let err = "sideways".parse::<Direction>().unwrap_err();
    assert!(matches!(err, CoreError::InvalidDirection(ref d) if d == "sideways"));
    assert!(err.to_string().contains("[K008]"));
}

#[test]
fn test_direction_target_status() {
    assert_eq!(Direction::Up.target_status(), MigrationStatus::Active);
    assert_eq!(Direction::Down.target_status(), MigrationStatus::Inactive);
}

#[test]
fn test_migration_validity() {
    let id = MigrationId::new(1).unwrap();
    let m = Migration::new(id, "init", "001_init.up.sql", "001_init.down.sql");
    assert!(m.is_valid());
    assert_eq!(m.status, MigrationStatus::Inactive);
    assert_eq!(m.location(Direction::Down), "001_init.down.sql");

    let missing_down = Migration::new(id, "init", "001_init.up.sql", "");
    assert!(!missing_down.is_valid());

    let missing_name = Migration::new(id, "", "a", "b");
    assert!(!missing_name.is_valid());
}

#[test]
fn test_status_display() {
    assert_eq!(MigrationStatus::Active.to_string(), "active");
    assert_eq!(MigrationStatus::default().to_string(), "inactive");
}
