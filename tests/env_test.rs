//! Environment Loader Integration Tests
//!
//! Tests for reading `WANDB_*` variables:
//! - Seeding settings from the environment
//! - Applying the environment at its own rank
//! - Parse errors naming the variable

mod common;

use common::{env_map, init_logging};
use runsettings::{EnvironmentHandler, Error, Key, Settings, Source, SystemEnv};
use serde_json::json;

#[test]
fn test_from_env_seeds_values() {
    init_logging();
    let env = env_map(&[
        ("WANDB_PROJECT", "mnist"),
        ("WANDB_MODE", "offline"),
        ("WANDB_NAME", "baseline"),
        ("WANDB_TAGS", "a, b,c"),
        ("WANDB_DIR", "/scratch"),
        ("WANDB_SILENT", "yes"),
        ("WANDB_HEARTBEAT_SECONDS", "45"),
        ("WANDB__INTERNAL_QUEUE_TIMEOUT", "ignored"),
        ("UNRELATED", "x"),
    ]);

    let settings = Settings::from_env(&env).unwrap();

    assert_eq!(settings.project().as_deref(), Some("mnist"));
    assert_eq!(settings.mode().as_deref(), Some("offline"));
    assert_eq!(settings.run_name().as_deref(), Some("baseline"));
    assert_eq!(
        settings.run_tags(),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert_eq!(settings.root_dir().as_deref(), Some("/scratch"));
    assert_eq!(settings.silent(), Some(true));
    assert_eq!(settings.heartbeat_seconds(), Some(45));
    assert_eq!(settings.internal_queue_timeout(), Some(2.0));
    assert!(settings.is_offline());
}

#[test]
fn test_private_keys_drop_leading_underscore() {
    let env = env_map(&[("WANDB_INTERNAL_QUEUE_TIMEOUT", "0.5"), ("WANDB_CUDA", "1")]);
    let settings = Settings::from_env(&env).unwrap();
    assert_eq!(settings.internal_queue_timeout(), Some(0.5));
    assert_eq!(settings.cuda(), Some(true));
}

#[test]
fn test_apply_env_respects_precedence() {
    init_logging();
    let mut settings = Settings::new([("project", "from-code")]).unwrap();
    settings
        .update([("summary_warnings", 10)], Source::Init)
        .unwrap();

    let env = env_map(&[
        ("WANDB_PROJECT", "from-env"),
        ("WANDB_SAVE_CODE", "false"),
        ("WANDB_SUMMARY_WARNINGS", "3"),
    ]);
    settings.apply_env(&env).unwrap();

    // Regular key set at a higher rank keeps its value
    assert_eq!(settings.project().as_deref(), Some("from-code"));
    // Policy key takes the more general source
    assert_eq!(settings.summary_warnings(), Some(3));
    assert_eq!(settings.source_of(Key::SummaryWarnings), Source::Env);
    // Regular flag at construction rank ignores the environment
    assert_eq!(settings.save_code(), None);
}

#[test]
fn test_apply_env_on_frozen_settings_fails() {
    let mut settings = Settings::default();
    settings.freeze();
    let err = settings
        .apply_env(&env_map(&[("WANDB_ENTITY", "team")]))
        .unwrap_err();
    assert!(err.is_frozen());
}

#[test]
fn test_parse_errors_name_the_variable() {
    let env = env_map(&[("WANDB_SILENT", "perhaps")]);
    let err = Settings::from_env(&env).unwrap_err();
    match err {
        Error::InvalidValue { key, value, reason } => {
            assert_eq!(key, "silent");
            assert_eq!(value, json!("perhaps"));
            assert!(reason.contains("WANDB_SILENT"));
        }
        other => panic!("expected invalid value, got {other:?}"),
    }
}

#[test]
fn test_validation_errors_surface_from_env() {
    let env = env_map(&[("WANDB_MODE", "sideways")]);
    assert!(Settings::from_env(&env).unwrap_err().is_validation_error());
}

#[test]
fn test_custom_prefix() {
    let handler = EnvironmentHandler::new("acme");
    let env = env_map(&[("ACME_ENTITY", "team"), ("WANDB_ENTITY", "other")]);
    let found = handler.overrides(&env).unwrap();
    assert_eq!(found, vec![(Key::Entity, json!("team"))]);
}

#[test]
fn test_system_env_reads_process_environment() {
    let handler = EnvironmentHandler::new("RUNSETTINGS_TEST_UNLIKELY_PREFIX");
    assert!(handler.overrides(&SystemEnv).unwrap().is_empty());
}
