// Path: crates/test_utils/src/assertions/mod.rs
//! Assertion utilities for testing

/// Assert that a result is OK and unwrap it
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?} ({})", err, format!($($arg)+)),
        }
    };
}

/// Assert that a result is Err and unwrap the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(err) => err,
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?} ({})", val, format!($($arg)+)),
            Err(err) => err,
        }
    };
}

/// Assert that a validation result holds exactly the given error codes, in order
#[macro_export]
macro_rules! assert_error_codes {
    ($result:expr, [$($code:expr),* $(,)?]) => {
        assert_eq!(
            $result.error_codes(),
            vec![$($code as u32),*],
            "unexpected errors: {:?}",
            $result.errors()
        );
    };
}

/// Assert that a validation result holds the given error code among others
#[macro_export]
macro_rules! assert_has_error_code {
    ($result:expr, $code:expr) => {
        assert!(
            $result.error_codes().contains(&($code as u32)),
            "expected code {} in {:?}",
            $code,
            $result.errors()
        );
    };
}
