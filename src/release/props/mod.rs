//! Property context handed to the template engine.
//!
//! A [`PropertyContext`] is an ordered, flat namespace of string keys. Scopes
//! are layered into it one after another: project, distribution, release
//! service, artifacts, packager. Keys keep the position of their first
//! insertion so rendered listings are stable from run to run.

pub mod keys;

use serde::Serialize;
use serde_json::{Map, Value};

/// How [`PropertyContext::merge`] treats keys that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Existing keys win; only absent keys are copied.
    KeepExisting,
    /// Incoming keys replace existing values.
    Overwrite,
}

/// Ordered key/value namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyContext {
    entries: Map<String, Value>,
}

impl PropertyContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Sets `key` only when it is not present yet.
    ///
    /// Returns `true` when the value was stored.
    pub fn put_if_absent(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Copies every entry of `other` into this context.
    pub fn merge(&mut self, other: &PropertyContext, mode: MergeMode) {
        for (key, value) in &other.entries {
            match mode {
                MergeMode::KeepExisting => {
                    self.put_if_absent(key.clone(), value.clone());
                }
                MergeMode::Overwrite => self.put(key.clone(), value.clone()),
            }
        }
    }

    /// Shorthand for an overwriting [`merge`](Self::merge).
    pub fn put_all(&mut self, other: &PropertyContext) {
        self.merge(other, MergeMode::Overwrite);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the value of `key` when it holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Returns the value of `key` rendered as text, or an empty string.
    ///
    /// Numbers and booleans are rendered with their JSON representation.
    pub fn text(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Interprets `key` as a flag. Accepts booleans and the string `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Borrows the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Converts into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

impl From<Map<String, Value>> for PropertyContext {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = PropertyContext::new();
        for (key, value) in iter {
            props.put(key, value);
        }
        props
    }
}

impl IntoIterator for PropertyContext {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Upper-cases the first character of `s`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns a `lower-hyphen` name into `CamelCase`.
///
/// Underscores and dots also split words, so `my-app.cli` becomes `MyAppCli`.
pub fn class_name(s: &str) -> String {
    s.split(['-', '_', '.', ' '])
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// Turns `CamelCase` into `camel-case`.
pub fn hyphenated(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' || c == ' ' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

/// Replaces dots and dashes with underscores.
pub fn underscore(s: &str) -> String {
    s.replace(['.', '-'], "_")
}

/// Replaces dots and underscores with dashes.
pub fn dash(s: &str) -> String {
    s.replace(['.', '_'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_if_absent_never_clobbers() {
        let mut props = PropertyContext::new();
        props.put("artifactName", "narrow");
        assert!(!props.put_if_absent("artifactName", "wide"));
        assert!(props.put_if_absent("artifactOs", "osx"));
        assert_eq!(props.text("artifactName"), "narrow");
        assert_eq!(props.text("artifactOs"), "osx");
    }

    #[test]
    fn narrow_then_wide_keeps_narrow_values() {
        let narrow: PropertyContext = [("a", "1"), ("b", "2")].into_iter().collect();
        let wide: PropertyContext = [("b", "wide"), ("c", "3")].into_iter().collect();

        let mut merged = PropertyContext::new();
        merged.merge(&narrow, MergeMode::KeepExisting);
        merged.merge(&wide, MergeMode::KeepExisting);

        for (key, value) in narrow.iter() {
            assert_eq!(merged.get(key), Some(value));
        }
        assert_eq!(merged.text("c"), "3");
    }

    #[test]
    fn overwrite_merge_replaces_and_keeps_order() {
        let mut props: PropertyContext = [("x", "1"), ("y", "2")].into_iter().collect();
        let later: PropertyContext = [("y", "3"), ("z", "4")].into_iter().collect();
        props.put_all(&later);

        let keys: Vec<_> = props.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
        assert_eq!(props.text("y"), "3");
    }

    #[test]
    fn text_renders_scalars() {
        let mut props = PropertyContext::new();
        props.put("size", 42u64);
        props.put("snapshot", false);
        assert_eq!(props.text("size"), "42");
        assert_eq!(props.text("snapshot"), "false");
        assert_eq!(props.text("missing"), "");
    }

    #[test]
    fn name_helpers() {
        assert_eq!(capitalize("osx"), "Osx");
        assert_eq!(class_name("my-cool-app"), "MyCoolApp");
        assert_eq!(hyphenated("MyCoolApp"), "my-cool-app");
        assert_eq!(underscore("1.2.3-rc"), "1_2_3_rc");
        assert_eq!(dash("1.2_3"), "1-2-3");
    }
}
