//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Receive the next frame from a connection queue, failing after a second
#[macro_export]
macro_rules! next_frame {
    ($rx:expr) => {
        match tokio::time::timeout(std::time::Duration::from_secs(1), $rx.recv()).await {
            Ok(Some(frame)) => frame,
            Ok(None) => panic!("Connection queue closed"),
            Err(_) => panic!("Timed out waiting for a frame"),
        }
    };
}
