//! Common test utilities for runsettings integration tests
//!
//! Provides shared fixtures and helper functions.

#![allow(dead_code)]

use runsettings::{Property, Settings, Source};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Once;

static INIT: Once = Once::new();

/// Route `log` output through `env_logger` once per test binary
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// =============================================================================
// Fixtures
// =============================================================================

/// Settings built from schema defaults
pub fn default_settings() -> Settings {
    init_logging();
    Settings::default()
}

/// Settings built with the given starting values
pub fn settings_with(overrides: &[(&str, Value)]) -> Settings {
    init_logging();
    Settings::new(overrides.iter().cloned()).unwrap()
}

/// A standalone string property currently at `source`
pub fn property_at(source: Source, policy: bool) -> Property {
    let builder = Property::string("test").default("initial");
    let builder = if policy { builder.policy() } else { builder };
    builder.build(source).unwrap()
}

/// Fake environment from `(name, value)` pairs
pub fn env_map(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
