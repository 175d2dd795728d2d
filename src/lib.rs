//! # runsettings - layered run settings
//!
//! A configuration store for an experiment-tracking client. Every recognized
//! key is a [`Property`] that remembers which [`Source`] last set it, so values
//! coming from the environment, project files, code and command line resolve
//! by precedence instead of call order.
//!
//! ## Features
//!
//! - **Precedence**: each write names its source; lower-ranked writes are ignored
//! - **Policies**: a few keys flip the rule so that the more general source wins
//! - **Validation**: preprocessors and validators run before a value is stored
//! - **Hooks**: derived values are computed on read from the live settings
//! - **Freezing**: lock the whole store, or single keys, against further writes
//! - **Snapshots**: detached copies, with secret redaction
//!
//! ## Quick Start
//!
//! ```rust
//! use runsettings::{Key, Settings, Source};
//! use serde_json::json;
//!
//! # fn example() -> runsettings::Result<()> {
//! let mut settings = Settings::new([("project", json!("mnist")), ("mode", json!("offline"))])?;
//! assert_eq!(settings.project().as_deref(), Some("mnist"));
//! assert!(settings.is_offline());
//!
//! // A command line value outranks the construction-time value
//! settings.update([("project", "cifar")], Source::Args)?;
//! assert_eq!(settings.get(Key::Project), json!("cifar"));
//!
//! // A value from the environment does not
//! settings.update([("project", "imagenet")], Source::Env)?;
//! assert_eq!(settings.get(Key::Project), json!("cifar"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Policies
//!
//! Keys such as `summary_warnings` are policies: a broader source (an
//! organization wide setting, say) takes priority over a narrower one.
//!
//! ```rust
//! use runsettings::{Settings, Source};
//!
//! # fn example() -> runsettings::Result<()> {
//! let mut settings = Settings::default();
//! settings.update([("summary_warnings", 3)], Source::Entity)?;
//! settings.update([("summary_warnings", 50)], Source::Args)?;
//! assert_eq!(settings.summary_warnings(), Some(3));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Snapshots
//!
//! ```rust
//! use runsettings::Settings;
//! use serde_json::json;
//!
//! # fn example() -> runsettings::Result<()> {
//! let settings = Settings::new([("api_key", "secret")])?;
//! let snapshot = settings.make_static_redacted();
//! assert_eq!(snapshot["api_key"], json!("***REDACTED***"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Core modules
mod docs;
mod error;
mod settings;

// Grouped modules
pub mod config;
pub mod snapshot;

#[cfg(feature = "env")]
pub mod env;

// Re-exports from core
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use settings::{COMPUTED, DEFAULT_BASE_URL, Key, Settings, SettingsConsole, SourceScope};
pub use snapshot::Snapshot;

// Re-exports from config
pub use config::{Property, PropertyBuilder, Source, ValueKind, validators};

#[cfg(feature = "env")]
pub use env::{ENV_PREFIX, EnvSource, EnvironmentHandler, SystemEnv};
