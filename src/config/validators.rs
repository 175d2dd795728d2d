//! Value kinds and the built-in preprocessor/validator library
//!
//! Every property carries a [`ValueKind`]. The kind contributes the first
//! validator of the chain (a type check) and tells the environment loader how
//! to parse a raw variable. The remaining functions here are reusable chain
//! links for schema declarations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

/// A value transform applied before validation. May reject the value.
pub type Preprocessor = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// A predicate over a preprocessed value. `Err` carries the reason.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A read-time transform. Receives the raw value and the owning object so it
/// can derive from sibling values.
pub type Hook<C> = Arc<dyn Fn(Value, &C) -> Value + Send + Sync>;

// =============================================================================
// Value Kinds
// =============================================================================

/// Type of value a property holds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Text
    String,
    /// Boolean toggle
    Bool,
    /// Whole number
    Int,
    /// Any number, whole or fractional
    Number,
    /// List of strings
    StringList,
    /// List of arbitrary values
    List,
    /// JSON object
    Object,
    /// No type constraint
    #[default]
    Any,
}

impl ValueKind {
    /// Check that a value has this kind
    ///
    /// # Errors
    ///
    /// Returns a description of the expected kind if the value does not match.
    pub fn check(self, value: &Value) -> Result<(), String> {
        let ok = match self {
            ValueKind::String => value.is_string(),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Int => value.is_i64() || value.is_u64(),
            ValueKind::Number => value.is_number(),
            ValueKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ValueKind::List => value.is_array(),
            ValueKind::Object => value.is_object(),
            ValueKind::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("Value must be {}", self.describe()))
        }
    }

    /// Parse a raw environment string into a value of this kind
    ///
    /// # Errors
    ///
    /// Returns a reason if the string cannot represent this kind.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            ValueKind::String => Ok(Value::String(raw.to_string())),
            ValueKind::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("'{raw}' is not a boolean")),
            ValueKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("'{raw}' is not an integer: {e}")),
            ValueKind::Number => {
                let trimmed = raw.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(Value::from(n));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{raw}' is not a number"))
            }
            ValueKind::StringList | ValueKind::List => Ok(Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )),
            ValueKind::Object => {
                serde_json::from_str(raw).map_err(|e| format!("'{raw}' is not JSON: {e}"))
            }
            ValueKind::Any => Ok(serde_json::from_str(raw).unwrap_or_else(|_| {
                parse_bool(raw).map_or_else(|| Value::String(raw.to_string()), Value::Bool)
            })),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ValueKind::String => "a string",
            ValueKind::Bool => "a boolean",
            ValueKind::Int => "an integer",
            ValueKind::Number => "a number",
            ValueKind::StringList => "a list of strings",
            ValueKind::List => "a list",
            ValueKind::Object => "an object",
            ValueKind::Any => "any value",
        }
    }

    /// Human-readable name used in generated docs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Bool => "Boolean",
            ValueKind::Int => "Integer",
            ValueKind::Number => "Number",
            ValueKind::StringList => "List (Strings)",
            ValueKind::List => "List",
            ValueKind::Object => "Object",
            ValueKind::Any => "Any",
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Accept only one of a fixed set of strings
pub fn one_of(choices: &'static [&'static str]) -> Validator {
    Arc::new(move |value: &Value| {
        let s = value.as_str().unwrap_or_default();
        if choices.contains(&s) {
            Ok(())
        } else {
            Err(format!("'{s}' not in {choices:?}"))
        }
    })
}

/// Accept any of several kinds
pub fn any_kind(kinds: &'static [ValueKind]) -> Validator {
    Arc::new(move |value: &Value| {
        if kinds.iter().any(|kind| kind.check(value).is_ok()) {
            Ok(())
        } else {
            let names: Vec<&str> = kinds.iter().map(|k| k.label()).collect();
            Err(format!("Value must be one of: {}", names.join(", ")))
        }
    })
}

const MAX_PROJECT_LEN: usize = 128;
const PROJECT_INVALID_CHARS: &str = r"/\#?%:";

static PROJECT_INVALID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[/\\#?%:]").expect("project character class is a valid regex")
});

/// Project names are at most 128 characters and avoid path/URL separators
pub fn project_name() -> Validator {
    Arc::new(|value: &Value| {
        let name = value.as_str().unwrap_or_default();
        if name.chars().count() > MAX_PROJECT_LEN {
            return Err(format!(
                "Invalid project name \"{name}\": exceeded {MAX_PROJECT_LEN} characters"
            ));
        }
        let mut found: Vec<&str> = PROJECT_INVALID_RE
            .find_iter(name)
            .map(|m| m.as_str())
            .collect();
        found.sort_unstable();
        found.dedup();
        if found.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Invalid project name \"{name}\": cannot contain characters \"{}\", found \"{}\"",
                PROJECT_INVALID_CHARS
                    .chars()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(","),
                found.join(",")
            ))
        }
    })
}

/// Timestamps must be RFC 3339
pub fn rfc3339() -> Validator {
    Arc::new(|value: &Value| {
        let s = value.as_str().unwrap_or_default();
        time::OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map(|_| ())
            .map_err(|e| format!("'{s}' is not an RFC 3339 timestamp: {e}"))
    })
}

// =============================================================================
// Preprocessors
// =============================================================================

/// Strip trailing slashes from a URL-ish string
pub fn trim_trailing_slash() -> Preprocessor {
    Arc::new(|value: Value| {
        Ok(match value {
            Value::String(s) => Value::String(s.trim_end_matches('/').to_string()),
            other => Value::String(stringify(&other).trim_end_matches('/').to_string()),
        })
    })
}

const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Coerce numbers, booleans and numeric strings to an integer
pub fn to_int() -> Preprocessor {
    Arc::new(|value: Value| match &value {
        Value::Number(n) if n.is_i64() => Ok(value),
        Value::Number(n) => {
            let f = n.as_f64().map(f64::trunc).unwrap_or(f64::NAN);
            // i64::MAX is not representable as f64; 2^63 is the exclusive bound
            if f >= -I64_LIMIT && f < I64_LIMIT {
                Ok(Value::from(f as i64))
            } else {
                Err(format!("{n} is out of range for an integer"))
            }
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| format!("'{s}' cannot be converted to an integer: {e}")),
        other => Err(format!("{other} cannot be converted to an integer")),
    })
}

/// Render any scalar as a string
pub fn to_string() -> Preprocessor {
    Arc::new(|value: Value| Ok(Value::String(stringify(&value))))
}

/// Accept "true"/"false" style strings for boolean flags
///
/// Non-boolean strings pass through unchanged so the type check reports them.
pub fn str_as_bool() -> Preprocessor {
    Arc::new(|value: Value| {
        Ok(match &value {
            Value::String(s) => parse_bool(s).map_or(value, Value::Bool),
            _ => value,
        })
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_checks() {
        assert!(ValueKind::String.check(&json!("x")).is_ok());
        assert!(ValueKind::String.check(&json!(1)).is_err());
        assert!(ValueKind::Int.check(&json!(5)).is_ok());
        assert!(ValueKind::Int.check(&json!(5.5)).is_err());
        assert!(ValueKind::Number.check(&json!(5.5)).is_ok());
        assert!(ValueKind::StringList.check(&json!(["a", "b"])).is_ok());
        assert!(ValueKind::StringList.check(&json!(["a", 1])).is_err());
        assert!(ValueKind::Any.check(&json!({"k": 1})).is_ok());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ValueKind::Bool.parse("TRUE").unwrap(), json!(true));
        assert_eq!(ValueKind::Bool.parse("0").unwrap(), json!(false));
        assert!(ValueKind::Bool.parse("maybe").is_err());
        assert_eq!(ValueKind::Int.parse(" 42 ").unwrap(), json!(42));
        assert_eq!(ValueKind::Number.parse("2.5").unwrap(), json!(2.5));
        assert_eq!(
            ValueKind::StringList.parse("foo, bar,").unwrap(),
            json!(["foo", "bar"])
        );
        assert_eq!(ValueKind::String.parse("123").unwrap(), json!("123"));
        assert_eq!(ValueKind::Any.parse("{\"a\": 1}").unwrap(), json!({"a": 1}));
        assert_eq!(ValueKind::Any.parse("false").unwrap(), json!(false));
        assert_eq!(ValueKind::Any.parse("hello").unwrap(), json!("hello"));
    }

    #[test]
    fn test_one_of() {
        let v = one_of(&["fatal", "warn", "silent"]);
        assert!(v(&json!("warn")).is_ok());
        let err = v(&json!("loud")).unwrap_err();
        assert!(err.contains("loud"));
    }

    #[test]
    fn test_project_name() {
        let v = project_name();
        assert!(v(&json!("my-project_1")).is_ok());
        let err = v(&json!("a/b:c")).unwrap_err();
        assert!(err.contains("found \"/,:\""));
        assert!(v(&json!("x".repeat(129))).unwrap_err().contains("128"));
        assert!(v(&json!("x".repeat(128))).is_ok());
    }

    #[test]
    fn test_rfc3339() {
        let v = rfc3339();
        assert!(v(&json!("2021-03-04T05:06:07Z")).is_ok());
        assert!(v(&json!("yesterday")).is_err());
    }

    #[test]
    fn test_preprocessors() {
        let trim = trim_trailing_slash();
        assert_eq!(trim(json!("http://host.com///")).unwrap(), json!("http://host.com"));
        assert_eq!(trim(json!("//http://host.com//")).unwrap(), json!("//http://host.com"));

        let int = to_int();
        assert_eq!(int(json!("42")).unwrap(), json!(42));
        assert_eq!(int(json!(7.9)).unwrap(), json!(7));
        assert_eq!(int(json!(true)).unwrap(), json!(1));
        assert!(int(json!("forty")).is_err());

        let s = to_string();
        assert_eq!(s(json!(123)).unwrap(), json!("123"));

        let b = str_as_bool();
        assert_eq!(b(json!("false")).unwrap(), json!(false));
        assert_eq!(b(json!("maybe")).unwrap(), json!("maybe"));
        assert_eq!(b(json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn test_to_int_rejects_out_of_range() {
        let int = to_int();
        assert!(int(json!(1e300)).is_err());
        assert!(int(json!(-1e300)).is_err());
        assert!(int(json!(9_223_372_036_854_775_808.0)).is_err());
        assert!(int(json!(u64::MAX)).is_err());
        assert_eq!(int(json!(i64::MAX)).unwrap(), json!(i64::MAX));
        assert_eq!(int(json!(-9_223_372_036_854_775_808.0)).unwrap(), json!(i64::MIN));
    }
}
