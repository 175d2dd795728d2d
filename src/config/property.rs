//! A single named setting with provenance
//!
//! # Overview
//!
//! A [`Property`] stores one raw value together with the [`Source`] rank that
//! set it. Three function chains shape the value:
//!
//! - **Preprocessors** run on every incoming value before validation.
//! - **Validators** run after preprocessing. The first failure rejects the
//!   value and nothing is stored.
//! - **Hooks** run on every read. They receive the owning object, so a
//!   property can derive its value from live sibling state.
//!
//! Unset values (`null`) skip all three chains.
//!
//! # Precedence
//!
//! [`Property::update`] is the only mutation path. An update is applied when
//! its source is [`Source::Override`], or when the current value was not set
//! by an override and the new rank is at least the current rank (regular
//! properties) or at most the current rank (policies). Anything else is
//! ignored without error.
//!
//! ```
//! use runsettings::{Property, Source};
//! use serde_json::json;
//!
//! let mut project: Property = Property::string("project").build(Source::Project)?;
//! assert!(project.update(json!("pizza"), Source::Env)?);
//! assert!(!project.update(json!("ignored"), Source::Base)?);
//! assert_eq!(project.get(), json!("pizza"));
//! # Ok::<(), runsettings::Error>(())
//! ```
//!
//! The stored value is private; there is no way to assign it other than
//! through `update`:
//!
//! ```compile_fail
//! use runsettings::{Property, Source};
//!
//! let mut project: Property = Property::string("project").build(Source::Project).unwrap();
//! project.raw_value = serde_json::json!("pizza");
//! ```

use crate::config::source::Source;
use crate::config::validators::{Hook, Preprocessor, Validator, ValueKind};
use crate::error::{Error, Result};

use log::debug;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Property
// =============================================================================

/// A single setting value with its source rank and function chains.
///
/// `C` is the context type hooks receive on read. Standalone properties use
/// `()`; properties owned by [`Settings`](crate::Settings) use `Settings`.
pub struct Property<C: ?Sized = ()> {
    name: String,
    raw_value: Value,
    source: Source,
    is_policy: bool,
    frozen: bool,
    kind: ValueKind,
    help: Option<String>,
    preprocessors: Vec<Preprocessor>,
    validators: Vec<Validator>,
    hooks: Vec<Hook<C>>,
}

impl<C: ?Sized> Property<C> {
    /// Start declaring a property with no type constraint
    pub fn builder(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::Any)
    }

    /// Start declaring a string property
    pub fn string(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::String)
    }

    /// Start declaring a boolean property
    pub fn boolean(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::Bool)
    }

    /// Start declaring an integer property
    pub fn integer(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::Int)
    }

    /// Start declaring a numeric property (integer or float)
    pub fn number(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::Number)
    }

    /// Start declaring a list-of-strings property
    pub fn string_list(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::StringList)
    }

    /// Start declaring a list property
    pub fn list(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::List)
    }

    /// Start declaring an object property
    pub fn object(name: impl Into<String>) -> PropertyBuilder<C> {
        PropertyBuilder::new(name, ValueKind::Object)
    }

    /// Resolved value: the raw value passed through the hook chain.
    ///
    /// Unset values are returned as `null` without running hooks. Hooks may
    /// read live state from `ctx`, so two reads can differ even when the raw
    /// value has not changed.
    pub fn value(&self, ctx: &C) -> Value {
        if self.raw_value.is_null() {
            return Value::Null;
        }
        self.hooks
            .iter()
            .fold(self.raw_value.clone(), |value, hook| hook(value, ctx))
    }

    /// Offer a new value from `source`.
    ///
    /// Returns `Ok(true)` if the value was stored, `Ok(false)` if precedence
    /// rules ignored it.
    ///
    /// # Errors
    ///
    /// - [`Error::Frozen`] if the property is frozen
    /// - [`Error::InvalidValue`] if preprocessing or validation fails; the
    ///   previous value and source are kept
    pub fn update(&mut self, value: Value, source: Source) -> Result<bool> {
        if self.frozen {
            return Err(Error::Frozen(format!("Property {}", self.name)));
        }

        if !self.accepts(source) {
            debug!(
                "Ignoring update of {} from {source}: value was set by {}",
                self.name, self.source
            );
            return Ok(false);
        }

        self.raw_value = self.prepare(value)?;
        self.source = source;
        Ok(true)
    }

    fn accepts(&self, source: Source) -> bool {
        if source == Source::Override {
            return true;
        }
        if self.source == Source::Override {
            return false;
        }
        if self.is_policy {
            source <= self.source
        } else {
            source >= self.source
        }
    }

    fn prepare(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }

        let original = value.clone();
        let value = self
            .preprocessors
            .iter()
            .try_fold(value, |value, preprocess| preprocess(value))
            .map_err(|reason| Error::invalid(&self.name, &original, reason))?;

        if value.is_null() {
            return Ok(value);
        }

        self.kind
            .check(&value)
            .map_err(|reason| Error::invalid(&self.name, &value, reason))?;
        for validator in &self.validators {
            validator(&value).map_err(|reason| Error::invalid(&self.name, &value, reason))?;
        }

        Ok(value)
    }

    /// Freeze the property; further updates fail
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored value before hooks
    pub fn raw_value(&self) -> &Value {
        &self.raw_value
    }

    /// Rank of the last accepted update
    pub fn source(&self) -> Source {
        self.source
    }

    /// Whether precedence is inverted for this property
    pub fn is_policy(&self) -> bool {
        self.is_policy
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Whether any hook derives this property on read
    pub fn has_hooks(&self) -> bool {
        !self.hooks.is_empty()
    }
}

impl Property<()> {
    /// Resolved value for a standalone property
    pub fn get(&self) -> Value {
        self.value(&())
    }
}

impl<C: ?Sized> Clone for Property<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            raw_value: self.raw_value.clone(),
            source: self.source,
            is_policy: self.is_policy,
            frozen: self.frozen,
            kind: self.kind,
            help: self.help.clone(),
            preprocessors: self.preprocessors.clone(),
            validators: self.validators.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Property<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("raw_value", &self.raw_value)
            .field("source", &self.source)
            .field("is_policy", &self.is_policy)
            .field("frozen", &self.frozen)
            .field("kind", &self.kind)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Declaration of a property, turned into a [`Property`] by [`build`](Self::build)
pub struct PropertyBuilder<C: ?Sized = ()> {
    name: String,
    value: Value,
    kind: ValueKind,
    help: Option<String>,
    is_policy: bool,
    frozen: bool,
    preprocessors: Vec<Preprocessor>,
    validators: Vec<Validator>,
    hooks: Vec<Hook<C>>,
}

impl<C: ?Sized> PropertyBuilder<C> {
    fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
            kind,
            help: None,
            is_policy: false,
            frozen: false,
            preprocessors: Vec::new(),
            validators: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Name of the property being declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared initial value
    pub fn initial_value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Set the initial value
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Append a preprocessor to the chain
    #[must_use]
    pub fn preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessors.push(preprocessor);
        self
    }

    /// Append a validator to the chain
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Append a read-time hook to the chain
    #[must_use]
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value, &C) -> Value + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Invert precedence: the lowest rank wins
    #[must_use]
    pub fn policy(mut self) -> Self {
        self.is_policy = true;
        self
    }

    /// Freeze the property right after construction
    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Build the property at the given source rank.
    ///
    /// The initial value is preprocessed and validated first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the initial value is rejected.
    pub fn build(self, source: Source) -> Result<Property<C>> {
        let mut property = Property {
            name: self.name,
            raw_value: Value::Null,
            source,
            is_policy: self.is_policy,
            frozen: false,
            kind: self.kind,
            help: self.help,
            preprocessors: self.preprocessors,
            validators: self.validators,
            hooks: self.hooks,
        };
        property.raw_value = property.prepare(self.value)?;
        property.frozen = self.frozen;
        Ok(property)
    }
}

// =============================================================================
// Tests
// =============================================================================
