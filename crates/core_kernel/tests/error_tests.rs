//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::{CalendarDate, DateParseError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("bagsPerTon must be positive");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "bagsPerTon must be positive"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Account not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Account not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let core_error: CoreError = MoneyError::DivisionByZero.into();

    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_core_error_from_date_error() {
    let date_error = CalendarDate::parse("yesterday").unwrap_err();
    let core_error: CoreError = date_error.into();

    assert!(matches!(core_error, CoreError::Date(DateParseError::Malformed(_))));
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}
