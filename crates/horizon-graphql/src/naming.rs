//! Field naming policies.
//!
//! A [`NamingPolicy`] maps between the field names used on the Rust side
//! (struct fields, projection keys) and the keys that appear on the wire.
//! The same policy instance is used to serialize request variables, to parse
//! a response and to project its fields, so the three always agree.
//!
//! Two policies ship with the crate:
//!
//! - [`CamelCaseNaming`] (the default): `appears_in` ↔ `appearsIn`.
//! - [`ExactNaming`]: keys are used verbatim in both directions.
//!
//! Custom policies implement the trait and are injected through
//! [`JsonSettings`](crate::JsonSettings).

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Maps Rust-side field names to wire keys and back.
pub trait NamingPolicy: Send + Sync + fmt::Debug {
    /// Convert a Rust-side field name into the key used on the wire.
    fn to_wire(&self, name: &str) -> String;

    /// Convert a wire key into the Rust-side field name.
    fn from_wire(&self, key: &str) -> String;
}

/// A shareable, type-erased naming policy.
pub type SharedNaming = Arc<dyn NamingPolicy>;

/// The policy used when none is configured.
pub fn default_naming() -> SharedNaming {
    Arc::new(CamelCaseNaming)
}

/// Identity mapping: wire keys and Rust names are the same string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactNaming;

impl NamingPolicy for ExactNaming {
    fn to_wire(&self, name: &str) -> String {
        name.to_string()
    }

    fn from_wire(&self, key: &str) -> String {
        key.to_string()
    }
}

/// `snake_case` on the Rust side, `camelCase` on the wire.
///
/// Leading underscores are kept as-is so introspection keys such as
/// `__typename` survive both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamelCaseNaming;

impl NamingPolicy for CamelCaseNaming {
    fn to_wire(&self, name: &str) -> String {
        let (prefix, rest) = split_leading_underscores(name);
        let mut out = String::with_capacity(name.len());
        out.push_str(prefix);

        let mut segments = rest.split('_').filter(|s| !s.is_empty());
        if let Some(first) = segments.next() {
            out.push_str(first);
        }
        for segment in segments {
            let mut chars = segment.chars();
            if let Some(c) = chars.next() {
                out.extend(c.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    }

    fn from_wire(&self, key: &str) -> String {
        let (prefix, rest) = split_leading_underscores(key);
        let mut out = String::with_capacity(key.len() + 4);
        out.push_str(prefix);

        let chars: Vec<char> = rest.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            if c.is_uppercase() {
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    None | Some('_') => false,
                    Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                    Some(_) => false,
                };
                if boundary {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn split_leading_underscores(s: &str) -> (&str, &str) {
    let idx = s.len() - s.trim_start_matches('_').len();
    s.split_at(idx)
}

/// Rewrite every object key in `value` (recursively) through `map`.
pub(crate) fn rename_keys(value: Value, map: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(k, v)| (map(&k), rename_keys(v, map)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rename_keys(v, map)).collect())
        }
        other => other,
    }
}
