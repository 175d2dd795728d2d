//! Edge Case Integration Tests
//!
//! Tests for boundary conditions:
//! - Unset values and hooks
//! - Frozen properties
//! - Computed names and unknown names in updates
//! - Validation limits

mod common;

use common::default_settings;
use runsettings::validators::project_name;
use runsettings::{COMPUTED, Error, Key, Property, Settings, Source};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Unset values
// =============================================================================

#[test]
fn test_hooks_skip_unset_values() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut prop: Property = Property::string("derived")
        .hook(move |value, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            value
        })
        .build(Source::Settings)
        .unwrap();

    assert_eq!(prop.get(), Value::Null);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    prop.update(json!("set"), Source::Args).unwrap();
    assert_eq!(prop.get(), json!("set"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hooks_run_in_declaration_order() {
    let prop: Property = Property::string("chain")
        .default("a")
        .hook(|value, _| json!(format!("{}b", value.as_str().unwrap_or_default())))
        .hook(|value, _| json!(format!("{}c", value.as_str().unwrap_or_default())))
        .build(Source::Settings)
        .unwrap();
    assert_eq!(prop.get(), json!("abc"));
    assert_eq!(prop.raw_value(), &json!("a"));
}

#[test]
fn test_null_clears_a_value() {
    let mut settings = default_settings();
    settings
        .update([("project", "p")], Source::Override)
        .unwrap();
    settings
        .update([("project", Value::Null)], Source::Override)
        .unwrap();
    assert_eq!(settings.project(), None);
}

// =============================================================================
// Frozen properties
// =============================================================================

#[test]
fn test_frozen_property_rejects_every_source() {
    let mut prop: Property = Property::string("pinned")
        .default("value")
        .frozen()
        .build(Source::Settings)
        .unwrap();
    assert!(prop.is_frozen());

    for source in Source::ALL {
        let err = prop.update(json!("other"), source).unwrap_err();
        assert!(err.is_frozen());
    }
    assert_eq!(prop.get(), json!("value"));
}

#[test]
fn test_freeze_after_build() {
    let mut prop: Property = Property::string("later").build(Source::Base).unwrap();
    prop.update(json!("once"), Source::Args).unwrap();
    prop.freeze();
    assert!(matches!(
        prop.update(json!("twice"), Source::Override),
        Err(Error::Frozen(_))
    ));
}

#[test]
fn test_settings_freeze_does_not_freeze_properties() {
    let mut settings = default_settings();
    settings.freeze();
    settings.unfreeze();
    assert!(settings.update_key(Key::Project, "p", Source::Args).unwrap());
}

// =============================================================================
// Names
// =============================================================================

#[test]
fn test_computed_names_cannot_be_written() {
    let mut settings = default_settings();
    for name in COMPUTED {
        let err = settings
            .update([(*name, json!("x"))], Source::Override)
            .unwrap_err();
        assert_eq!(err, Error::DirectWriteForbidden((*name).to_string()));
    }
}

#[test]
fn test_unknown_names_in_update_apply_nothing() {
    let mut settings = default_settings();
    let err = settings
        .update([("mode", json!("offline")), ("made_up", json!(1))], Source::Override)
        .unwrap_err();
    assert_eq!(err, Error::UnexpectedArguments(vec!["made_up".to_string()]));
    assert_eq!(settings.mode().as_deref(), Some("online"));
}

#[test]
fn test_private_keys_are_addressed_with_underscore() {
    let settings = Settings::new([("_cuda", true)]).unwrap();
    assert_eq!(settings.cuda(), Some(true));
    assert!(Settings::new([("cuda", true)]).is_err());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_project_name_limits() {
    let ok = "p".repeat(128);
    let settings = Settings::new([("project", ok.as_str())]).unwrap();
    assert_eq!(settings.project(), Some(ok));

    assert!(Settings::new([("project", "p".repeat(129))]).is_err());

    let err = Settings::new([("project", "team/project")]).unwrap_err();
    match err {
        Error::InvalidValue { key, reason, .. } => {
            assert_eq!(key, "project");
            assert!(reason.contains("found \"/\""), "{reason}");
        }
        other => panic!("expected invalid value, got {other:?}"),
    }

    let validate = project_name();
    assert!(validate(&json!("a?b%c")).is_err());
}

#[test]
fn test_choice_keys() {
    for (key, good, bad) in [
        ("console", "wrap", "tty"),
        ("anonymous", "must", "maybe"),
        ("problem", "silent", "loud"),
        ("start_method", "spawn", "threadpool"),
    ] {
        assert!(Settings::new([(key, good)]).is_ok(), "{key}={good}");
        let err = Settings::new([(key, bad)]).unwrap_err();
        assert!(err.is_validation_error(), "{key}={bad}");
    }
}

#[test]
fn test_type_mismatch_is_invalid() {
    assert!(Settings::new([("heartbeat_seconds", json!("often"))]).is_err());
    assert!(Settings::new([("run_tags", json!([1, 2]))]).is_err());
    assert!(Settings::new([("quiet", json!("sometimes"))]).is_err());
    assert!(Settings::new([("_start_datetime", json!("yesterday"))]).is_err());
}

#[test]
fn test_magic_accepts_several_kinds() {
    for value in [json!("auto"), json!(true), json!({"keras": {"fit": true}})] {
        assert!(Settings::new([("magic", value.clone())]).is_ok(), "{value}");
    }
    assert!(Settings::new([("magic", json!(3))]).is_err());
}

#[test]
fn test_integer_policies_reject_out_of_range_floats() {
    for key in ["summary_warnings", "meaning_of_life"] {
        let err = Settings::new([(key, json!(1e300))]).unwrap_err();
        assert!(err.is_validation_error(), "{key}");
    }

    let mut settings = default_settings();
    let err = settings
        .update([("summary_warnings", json!(-1e300))], Source::Override)
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(settings.summary_warnings(), Some(5));
}

#[test]
fn test_meaning_of_life_coerces() {
    let mut settings = default_settings();
    settings
        .update([("meaning_of_life", "7")], Source::Base)
        .unwrap();
    assert_eq!(settings.meaning_of_life(), Some(7));
    assert!(
        settings
            .update([("meaning_of_life", "many")], Source::Override)
            .is_err()
    );
    assert_eq!(settings.meaning_of_life(), Some(7));
}
