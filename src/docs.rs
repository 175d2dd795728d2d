//! Documentation generator for the settings schema
//!
//! Generates a Markdown reference from the declared keys and their defaults.

use crate::config::ValueKind;
use crate::settings::{Key, Settings};

use serde_json::Value;
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Whether to include keys starting with an underscore
    pub show_private: bool,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_private: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn hide_private(mut self) -> Self {
        self.show_private = false;
        self
    }
}

/// Generate a Markdown reference of every settings key and its default
#[must_use]
pub fn generate_docs(config: DocsConfig) -> String {
    let defaults = Settings::default();
    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| "Settings Reference".to_string());
    writeln!(output, "# {title}\n").unwrap();

    if let Some(desc) = config.description {
        writeln!(output, "{desc}\n").unwrap();
    }

    let mut keys: Vec<Key> = Key::ALL
        .iter()
        .copied()
        .filter(|key| config.show_private || !key.is_private())
        .collect();
    keys.sort_by_key(|key| key.as_str());

    for key in keys {
        format_setting(&mut output, &defaults, key);
    }

    output
}

fn format_setting(out: &mut String, defaults: &Settings, key: Key) {
    let property = defaults.property(key);

    writeln!(out, "### `{key}`\n").unwrap();

    let mut badges = Vec::new();
    if property.is_policy() {
        badges.push("Policy");
    }
    if property.has_hooks() {
        badges.push("Derived");
    }
    if key.is_private() {
        badges.push("Private");
    }
    if !badges.is_empty() {
        writeln!(out, "{}\n", badges.join(" • ")).unwrap();
    }

    if let Some(help) = property.help() {
        writeln!(out, "{help}\n").unwrap();
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    writeln!(out, "| **Type** | {} |", format_kind(property.kind())).unwrap();
    writeln!(
        out,
        "| **Default** | `{}` |",
        format_value(property.raw_value())
    )
    .unwrap();
    out.push('\n');
    out.push_str("---\n\n");
}

fn format_kind(kind: ValueKind) -> &'static str {
    kind.label()
}

fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) => format!("\"{s}\""),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        _ => v.to_string(),
    }
}
