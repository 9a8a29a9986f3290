//! Custom assertion macros

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

/// Assert that a JSON result frame reports success
#[macro_export]
macro_rules! assert_frame_ok {
    ($frame:expr, $command:expr) => {{
        let frame: &serde_json::Value = &$frame;
        assert_eq!(frame["command"], $command, "unexpected frame {}", frame);
        assert_eq!(frame["result"], true, "expected success, got {}", frame);
    }};
}

/// Assert that a JSON result frame failed with `code`
#[macro_export]
macro_rules! assert_frame_err {
    ($frame:expr, $command:expr, $code:expr) => {{
        let frame: &serde_json::Value = &$frame;
        assert_eq!(frame["command"], $command, "unexpected frame {}", frame);
        assert_eq!(frame["result"], false, "expected failure, got {}", frame);
        assert_eq!(frame["error"], $code, "unexpected error in {}", frame);
    }};
}
