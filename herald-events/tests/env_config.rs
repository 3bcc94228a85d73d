//! Integration tests for environment-driven dispatcher configuration
//!
//! Kept in its own test binary with a single test, since it mutates the
//! process environment.

use herald_events::*;
use std::env;

fn logging_with(value: Option<&str>) -> (bool, bool) {
    unsafe {
        match value {
            Some(value) => env::set_var(LOG_ENV_VAR, value),
            None => env::remove_var(LOG_ENV_VAR),
        }
    }

    let config = DispatcherConfig::from_env();
    let dispatcher = DispatcherBuilder::from_env().build();
    (config.enable_logging, dispatcher.config().enable_logging)
}

#[test]
fn test_from_env_reads_log_flag() {
    assert_eq!(LOG_ENV_VAR, "HERALD_EVENTS_LOG");

    assert_eq!(logging_with(None), (true, true));
    assert_eq!(logging_with(Some("0")), (false, false));
    assert_eq!(logging_with(Some("false")), (false, false));
    assert_eq!(logging_with(Some("true")), (true, true));
    assert_eq!(logging_with(Some("1")), (true, true));
    // Unparsable values keep the default
    assert_eq!(logging_with(Some("garbage")), (true, true));

    // Cleanup
    unsafe {
        env::remove_var(LOG_ENV_VAR);
    }
}
