use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from(uuid);
    assert_eq!(id.to_uuid(), uuid);
    assert_eq!(id.as_u128(), uuid.as_u128());
}

#[test]
fn test_typed_id_default_is_zero() {
    assert_eq!(TransferId::default(), TransferId::ZERO);
    assert!(TransferId::default().is_zero());
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str_uuid() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.to_uuid(), uuid);
}

#[test]
fn test_typed_id_from_str_decimal() {
    let id = TransferId::from_str("42").unwrap();
    assert_eq!(id, TransferId(42));
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(AccountId::from_str("invalid").is_err());
}

#[test]
fn test_reserved_ids() {
    assert!(!AccountId::ZERO.is_valid());
    assert!(!AccountId::MAX.is_valid());
    assert!(AccountId::MAX.is_max());
    assert!(AccountId(1).is_valid());
    assert!(AccountId(u128::MAX - 1).is_valid());
}

#[test]
fn test_is_valid_id() {
    assert!(!is_valid_id(0));
    assert!(!is_valid_id(u128::MAX));
    assert!(is_valid_id(7));
}

#[test]
fn test_typed_id_serializes_as_number() {
    let json = serde_json::to_string(&AccountId(9)).unwrap();
    assert_eq!(json, "9");
    let back: AccountId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, AccountId(9));
}
