//! Point-in-time copies of resolved settings

use serde_json::Value;
use std::collections::HashMap;

/// A detached mapping from key name to resolved value
pub type Snapshot = HashMap<String, Value>;

/// Replacement written over secret values by default
pub const REDACTED: &str = "***REDACTED***";

/// Keys masked by [`Settings::make_static_redacted`](crate::Settings::make_static_redacted)
pub const DEFAULT_UNSAFE_KEYS: &[&str] = &["api_key"];

/// Copy of `snapshot` with every key in `unsafe_keys` replaced by `replacement`
///
/// Keys listed in `unsafe_keys` but absent from `snapshot` are not added.
///
/// ```
/// use runsettings::snapshot::{redact, Snapshot, REDACTED};
/// use serde_json::json;
///
/// let snapshot: Snapshot = [
///     ("this".to_string(), json!(2)),
///     ("api_key".to_string(), json!("secret")),
/// ]
/// .into_iter()
/// .collect();
/// let redacted = redact(&snapshot, &["api_key"], REDACTED);
/// assert_eq!(redacted["api_key"], json!("***REDACTED***"));
/// assert_eq!(redacted["this"], json!(2));
/// ```
#[must_use]
pub fn redact<S: std::hash::BuildHasher>(
    snapshot: &HashMap<String, Value, S>,
    unsafe_keys: &[&str],
    replacement: &str,
) -> Snapshot {
    snapshot
        .iter()
        .map(|(key, value)| {
            let value = if unsafe_keys.contains(&key.as_str()) {
                Value::String(replacement.to_string())
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(entries: &[(&str, Value)]) -> Snapshot {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_redact_default_key() {
        let redacted = redact(
            &snapshot(&[("this", json!(2)), ("that", json!(9)), ("api_key", json!("secret"))]),
            DEFAULT_UNSAFE_KEYS,
            REDACTED,
        );
        assert_eq!(
            redacted,
            snapshot(&[("this", json!(2)), ("that", json!(9)), ("api_key", json!(REDACTED))])
        );
    }

    #[test]
    fn test_redact_custom_keys_and_replacement() {
        let redacted = redact(
            &snapshot(&[("ok", json!("keep")), ("unsafe", json!(9)), ("bad", json!("secret"))]),
            &["unsafe", "bad"],
            "OMIT",
        );
        assert_eq!(
            redacted,
            snapshot(&[("ok", json!("keep")), ("unsafe", json!("OMIT")), ("bad", json!("OMIT"))])
        );
    }

    #[test]
    fn test_redact_nothing_to_do() {
        let clean = snapshot(&[("all", json!("keep")), ("good", json!(9))]);
        assert_eq!(redact(&clean, DEFAULT_UNSAFE_KEYS, REDACTED), clean);
        assert!(redact(&Snapshot::new(), DEFAULT_UNSAFE_KEYS, REDACTED).is_empty());
    }
}
