//! Environment variable handling for settings
//!
//! Maps `WANDB_*` variables onto schema keys and parses them according to
//! each key's [`ValueKind`](crate::ValueKind).

use crate::config::Source;
use crate::error::{Error, Result};
use crate::settings::{Key, Settings};

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Default prefix of settings environment variables
pub const ENV_PREFIX: &str = "WANDB";

/// Keys whose variable name is not derived from the key name
const EXPLICIT_NAMES: &[(Key, &str)] = &[
    (Key::RunName, "NAME"),
    (Key::RunNotes, "NOTES"),
    (Key::RunTags, "TAGS"),
    (Key::RunJobType, "JOB_TYPE"),
    (Key::RunGroup, "RUN_GROUP"),
    (Key::RootDir, "DIR"),
    (Key::Username, "USERNAME"),
];

/// A source of environment variables
pub trait EnvSource: Send + Sync {
    /// Value of a variable, `None` if unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher + Send + Sync> EnvSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Handles environment variable lookups and parsing
#[derive(Debug, Clone)]
pub struct EnvironmentHandler {
    prefix: String,
}

impl Default for EnvironmentHandler {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

impl EnvironmentHandler {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Get the environment variable name for a setting key
    ///
    /// Format: `{PREFIX}_{KEY}` (uppercase, leading underscore dropped),
    /// except for the handful of keys with historical names such as
    /// `WANDB_NAME` for `run_name`.
    pub fn env_var_name(&self, key: Key) -> String {
        let suffix = EXPLICIT_NAMES
            .iter()
            .find(|(k, _)| *k == key)
            .map_or_else(
                || key.as_str().trim_start_matches('_').to_uppercase(),
                |(_, name)| (*name).to_string(),
            );
        format!("{}_{}", self.prefix.to_uppercase(), suffix)
    }

    /// Find the key a variable name maps to
    pub fn key_for_var(&self, var: &str) -> Option<Key> {
        Key::ALL
            .iter()
            .copied()
            .find(|key| self.env_var_name(*key) == var)
    }

    /// Read and parse every variable that is set in `env`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming the variable if a value cannot
    /// be parsed as the key's kind.
    pub fn overrides(&self, env: &dyn EnvSource) -> Result<Vec<(Key, Value)>> {
        let mut found = Vec::new();
        for key in Key::ALL {
            let var = self.env_var_name(*key);
            let Some(raw) = env.var(&var) else {
                continue;
            };
            let value = key.kind().parse(&raw).map_err(|reason| {
                let original = Value::String(raw.clone());
                Error::invalid(key.as_str(), &original, format!("{var}: {reason}"))
            })?;
            debug!("Read {var} for {key}");
            found.push((*key, value));
        }
        Ok(found)
    }
}

impl Settings {
    /// Build settings with values from the environment as starting values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a variable cannot be parsed or fails
    /// validation.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        Self::new(EnvironmentHandler::default().overrides(env)?)
    }

    /// Offer values from the environment at rank [`Source::Env`].
    ///
    /// Regular keys already set by a higher rank (including the
    /// construction-time [`Source::Settings`]) keep their values; policy keys
    /// take the environment value.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::update`].
    pub fn apply_env(&mut self, env: &dyn EnvSource) -> Result<()> {
        let overrides = EnvironmentHandler::default().overrides(env)?;
        self.update(overrides, Source::Env)
    }
}
