// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

#[test]
fn every_key_round_trips_through_strings() {
    for key in ConfigKey::ALL {
        assert_eq!(key.as_str().parse::<ConfigKey>(), Ok(key));
        assert_eq!(key.to_string(), key.as_str());
    }
}

#[test]
fn unknown_key_is_rejected() {
    let err = "retry_jitter".parse::<ConfigKey>().unwrap_err();
    assert_eq!(err, ConfigError::UnknownKey("retry_jitter".to_string()));
}

#[test]
fn defaults_parse_under_their_own_rules() {
    for key in ConfigKey::ALL {
        assert!(key.validate_value(key.default_value()).is_ok());
    }
}

#[parameterized(
    max_retries_zero = { ConfigKey::MaxRetries, "0", true },
    max_retries_negative = { ConfigKey::MaxRetries, "-1", false },
    max_retries_text = { ConfigKey::MaxRetries, "three", false },
    backoff_base_one = { ConfigKey::BackoffBase, "1", true },
    backoff_base_zero = { ConfigKey::BackoffBase, "0", false },
    poll_interval = { ConfigKey::PollIntervalMs, "250", true },
    poll_interval_zero = { ConfigKey::PollIntervalMs, "0", false },
    stale_timeout = { ConfigKey::StaleWorkerTimeoutSeconds, "45", true },
    heartbeat = { ConfigKey::HeartbeatIntervalSeconds, "2", true },
    db_path_blank = { ConfigKey::DbPath, "  ", false },
    db_path_ok = { ConfigKey::DbPath, "/var/lib/q.db", true },
)]
fn value_rules(key: ConfigKey, value: &str, ok: bool) {
    assert_eq!(key.validate_value(value).is_ok(), ok);
}

#[test]
fn settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.max_retries, 3);
    assert_eq!(settings.backoff_base, 2);
    assert_eq!(settings.poll_interval_ms, 500);
    assert_eq!(settings.db_path, DEFAULT_DB_PATH);
    assert_eq!(settings.stale_worker_timeout_seconds, 30);
    assert_eq!(settings.heartbeat_interval_seconds, 5);
}

#[test]
fn settings_from_entries_overrides_defaults() {
    let settings = Settings::from_entries([
        ("max_retries", "7"),
        ("backoff_base", "3"),
        ("heartbeat_interval_seconds", "2"),
    ]);
    assert_eq!(settings.max_retries, 7);
    assert_eq!(settings.backoff_base, 3);
    assert_eq!(settings.heartbeat_interval_seconds, 2);
    // Untouched keys keep defaults.
    assert_eq!(settings.poll_interval_ms, 500);
}

#[test]
fn settings_ignore_unknown_and_invalid_entries() {
    let settings = Settings::from_entries([
        ("max_retries", "not-a-number"),
        ("mystery_key", "1"),
        ("poll_interval_ms", "100"),
    ]);
    assert_eq!(settings.max_retries, 3);
    assert_eq!(settings.poll_interval_ms, 100);
}
