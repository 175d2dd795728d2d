//! The fixed-schema settings store
//!
//! [`Settings`] owns one [`Property`] per [`Key`]. Reads resolve through the
//! property's hook chain with the whole `Settings` as context, so derived
//! paths always reflect the current values of the keys they depend on.
//! Writes go through [`Settings::update`] only.

mod schema;

pub use schema::{DEFAULT_BASE_URL, Key};

use crate::config::{Property, Source};
use crate::error::{Error, Result};
use crate::snapshot::{self, Snapshot};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Names of read-only values computed from other settings
pub const COMPUTED: &[&str] = &[
    "is_local",
    "wandb_dir",
    "is_offline",
    "is_noop",
    "run_mode",
    "timespec",
    "console_mode",
];

/// Directory name for run data under `root_dir`
const STAGE_DIR: &str = "wandb";

/// How console output of a run is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsConsole {
    Off,
    Wrap,
    Redirect,
}

/// Settings for the tracking client.
///
/// # Example
///
/// ```
/// use runsettings::{Settings, Source};
/// use serde_json::json;
///
/// let mut settings = Settings::new([("project", json!("demo"))])?;
/// assert_eq!(settings.project().as_deref(), Some("demo"));
///
/// // Args outranks the construction-time value, Env does not
/// settings.update([("project", json!("from-args"))], Source::Args)?;
/// settings.update([("project", json!("ignored"))], Source::Env)?;
/// assert_eq!(settings.project().as_deref(), Some("from-args"));
/// # Ok::<(), runsettings::Error>(())
/// ```
///
/// Values cannot be assigned directly:
///
/// ```compile_fail
/// let mut settings = runsettings::Settings::default();
/// settings.mode = Some("offline".to_string());
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    properties: Vec<Property<Settings>>,
    frozen: bool,
}

impl Settings {
    /// Build settings from the schema, with `overrides` as starting values.
    ///
    /// Every property is created at rank [`Source::Settings`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedArguments`] listing every override key that is not
    ///   in the schema
    /// - [`Error::InvalidValue`] if an override fails validation
    pub fn new<I, K, V>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut starting: Vec<Option<Value>> = vec![None; Key::ALL.len()];
        let mut unexpected = Vec::new();

        for (name, value) in overrides {
            match name.as_ref().parse::<Key>() {
                Ok(key) => starting[key.index()] = Some(value.into()),
                Err(_) => unexpected.push(name.as_ref().to_string()),
            }
        }
        if !unexpected.is_empty() {
            return Err(Error::UnexpectedArguments(unexpected));
        }

        let properties = Key::ALL
            .iter()
            .zip(starting)
            .map(|(key, value)| {
                let decl = schema::declare(*key);
                let decl = match value {
                    Some(value) => decl.default(value),
                    None => decl,
                };
                decl.build(Source::Settings)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            properties,
            frozen: false,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolved value of a key (`null` when unset)
    #[must_use]
    pub fn get(&self, key: Key) -> Value {
        self.property(key).value(self)
    }

    /// Resolved value of a key, deserialized into `T`.
    ///
    /// Returns `None` when the value is unset or has a different shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: Key) -> Option<T> {
        match self.get(key) {
            Value::Null => None,
            value => serde_json::from_value(value).ok(),
        }
    }

    /// Resolved value of a key or computed value by name
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        if let Ok(key) = name.parse::<Key>() {
            return Some(self.get(key));
        }
        let computed = match name {
            "is_local" => Value::Bool(self.is_local()),
            "wandb_dir" => Value::String(self.wandb_dir().to_string_lossy().into_owned()),
            "is_offline" => Value::Bool(self.is_offline()),
            "is_noop" => Value::Bool(self.is_noop()),
            "run_mode" => Value::String(self.run_mode().to_string()),
            "timespec" => Value::String(self.timespec()),
            "console_mode" => serde_json::to_value(self.console_mode()).unwrap_or(Value::Null),
            _ => return None,
        };
        Some(computed)
    }

    /// Rank of the source that last set a key
    #[must_use]
    pub fn source_of(&self, key: Key) -> Source {
        self.property(key).source()
    }

    /// Whether a key uses inverted (policy) precedence
    #[must_use]
    pub fn is_policy(&self, key: Key) -> bool {
        self.property(key).is_policy()
    }

    /// Help text declared for a key
    #[must_use]
    pub fn help(&self, key: Key) -> Option<&str> {
        self.property(key).help()
    }

    pub(crate) fn property(&self, key: Key) -> &Property<Settings> {
        &self.properties[key.index()]
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Offer new values from `source`, key by key.
    ///
    /// All names are checked before anything is applied. Keys are then
    /// applied in iteration order with the precedence rules of
    /// [`Property::update`]; an error at one key does not undo keys applied
    /// before it.
    ///
    /// # Errors
    ///
    /// - [`Error::Frozen`] if the settings are frozen
    /// - [`Error::DirectWriteForbidden`] if a name refers to a computed value
    /// - [`Error::UnexpectedArguments`] listing every unknown name
    /// - [`Error::InvalidValue`] from the first key whose value is rejected
    pub fn update<I, K, V>(&mut self, values: I, source: Source) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        if self.frozen {
            return Err(Error::Frozen("Settings".to_string()));
        }

        let mut resolved = Vec::new();
        let mut unexpected = Vec::new();
        for (name, value) in values {
            let name = name.as_ref();
            if COMPUTED.contains(&name) {
                return Err(Error::DirectWriteForbidden(name.to_string()));
            }
            match name.parse::<Key>() {
                Ok(key) => resolved.push((key, value.into())),
                Err(_) => unexpected.push(name.to_string()),
            }
        }
        if !unexpected.is_empty() {
            return Err(Error::UnexpectedArguments(unexpected));
        }

        for (key, value) in resolved {
            self.apply(key, value, source)?;
        }
        Ok(())
    }

    /// Offer a new value for a single key from `source`.
    ///
    /// Returns whether the value was applied.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::update`].
    pub fn update_key(
        &mut self,
        key: Key,
        value: impl Into<Value>,
        source: Source,
    ) -> Result<bool> {
        if self.frozen {
            return Err(Error::Frozen("Settings".to_string()));
        }
        self.apply(key, value.into(), source)
    }

    fn apply(&mut self, key: Key, value: Value, source: Source) -> Result<bool> {
        let applied = self.properties[key.index()].update(value, source)?;
        if applied {
            debug!("Updated {key} from {source}");
        }
        Ok(applied)
    }

    /// Apply updates at a fixed source rank
    ///
    /// ```
    /// use runsettings::{Settings, Source};
    /// use serde_json::json;
    ///
    /// let mut settings = Settings::default();
    /// settings
    ///     .with_source(Source::Args)
    ///     .apply("project", json!("pizza"))?
    ///     .apply("entity", json!("team"))?;
    /// assert_eq!(settings.entity().as_deref(), Some("team"));
    /// # Ok::<(), runsettings::Error>(())
    /// ```
    pub fn with_source(&mut self, source: Source) -> SourceScope<'_> {
        SourceScope {
            settings: self,
            source,
        }
    }

    /// Reject all further updates until [`unfreeze`](Self::unfreeze)
    pub fn freeze(&mut self) {
        if !self.frozen {
            info!("Settings frozen");
        }
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        if self.frozen {
            info!("Settings unfrozen");
        }
        self.frozen = false;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Detached copy of every key's resolved value
    #[must_use]
    pub fn make_static(&self) -> Snapshot {
        Key::ALL
            .iter()
            .map(|key| (key.as_str().to_string(), self.get(*key)))
            .collect()
    }

    /// Like [`make_static`](Self::make_static), with secrets masked
    #[must_use]
    pub fn make_static_redacted(&self) -> Snapshot {
        snapshot::redact(
            &self.make_static(),
            snapshot::DEFAULT_UNSAFE_KEYS,
            snapshot::REDACTED,
        )
    }

    // =========================================================================
    // Computed values
    // =========================================================================

    /// Whether the client talks to a self-hosted server
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.base_url().is_some_and(|url| url != DEFAULT_BASE_URL)
    }

    /// Directory holding all run data
    #[must_use]
    pub fn wandb_dir(&self) -> PathBuf {
        let root = self.root_dir().unwrap_or_else(|| ".".to_string());
        PathBuf::from(root).join(STAGE_DIR)
    }

    /// Whether runs are recorded locally only
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.disabled().unwrap_or(false)
            || matches!(self.mode().as_deref(), Some("dryrun" | "offline"))
    }

    /// Whether the client is disabled entirely
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.mode().as_deref() == Some("disabled")
    }

    /// Prefix of run directory names
    #[must_use]
    pub fn run_mode(&self) -> &'static str {
        if self.is_offline() {
            "offline-run"
        } else {
            "run"
        }
    }

    /// Run start time as `YYYYMMDD_HHMMSS`, empty when unknown
    #[must_use]
    pub fn timespec(&self) -> String {
        let format = format_description!("[year][month][day]_[hour][minute][second]");
        self.start_datetime()
            .and_then(|s| OffsetDateTime::parse(&s, &Rfc3339).ok())
            .and_then(|dt| dt.format(&format).ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn console_mode(&self) -> SettingsConsole {
        match self.console().as_deref() {
            Some("wrap") => SettingsConsole::Wrap,
            Some("auto" | "redirect") => SettingsConsole::Redirect,
            _ => SettingsConsole::Off,
        }
    }

    /// Directory of the current run: `<wandb_dir>/<run_mode>-<timespec>-<run_id>`
    pub(crate) fn run_dir(&self) -> PathBuf {
        self.wandb_dir().join(format!(
            "{}-{}-{}",
            self.run_mode(),
            self.timespec(),
            self.run_id().unwrap_or_default()
        ))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(std::iter::empty::<(&str, Value)>())
            .expect("schema defaults pass their own validators")
    }
}

// =============================================================================
// Scoped source
// =============================================================================

/// Applies updates to [`Settings`] at a fixed source rank
pub struct SourceScope<'a> {
    settings: &'a mut Settings,
    source: Source,
}

impl SourceScope<'_> {
    /// Offer one value by name at this scope's rank
    ///
    /// # Errors
    ///
    /// Same as [`Settings::update`].
    pub fn apply(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.settings.update([(name, value.into())], self.source)?;
        Ok(self)
    }

    /// Rank this scope applies updates at
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }
}
