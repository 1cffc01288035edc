use std::fmt;

use serde::{Deserialize, Serialize};

/// The reserved namespace that is kept when attributes are stripped.
pub const DEFAULT_NAMESPACE: &str = "android";

/// An attribute name in its stored (namespace-stripped) form.
///
/// Attributes in the reserved [`DEFAULT_NAMESPACE`] keep their prefix; any
/// other namespace prefix is dropped, so `app:imageUrl` and `imageUrl` are the
/// same attribute while `android:text` stays distinct from `text`.
///
/// # Examples
///
/// ```
/// use attrbind_core::AttributeName;
///
/// assert_eq!(AttributeName::new("app:imageUrl").as_str(), "imageUrl");
/// assert_eq!(AttributeName::new("android:text").as_str(), "android:text");
/// assert_eq!(AttributeName::new("android:text").default_setter(), "setText");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeName(String);

impl AttributeName {
    /// Strip `raw` into its stored form.
    pub fn new(raw: &str) -> Self {
        if raw.starts_with(DEFAULT_NAMESPACE) && raw[DEFAULT_NAMESPACE.len()..].starts_with(':') {
            return AttributeName(raw.to_string());
        }
        match raw.find(':') {
            Some(colon) => AttributeName(raw[colon + 1..].to_string()),
            None => AttributeName(raw.to_string()),
        }
    }

    /// Whether stripping `raw` drops a non-default namespace.
    pub fn has_ignored_namespace(raw: &str) -> bool {
        raw.contains(':') && !raw.starts_with(&format!("{DEFAULT_NAMESPACE}:"))
    }

    /// The stored form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name with any namespace removed (`android:text` -> `text`).
    pub fn local_name(&self) -> &str {
        match self.0.find(':') {
            Some(colon) => &self.0[colon + 1..],
            None => &self.0,
        }
    }

    /// The conventional setter name: `"set"` followed by the capitalized local name.
    pub fn default_setter(&self) -> String {
        let local = self.local_name();
        let mut chars = local.chars();
        match chars.next() {
            Some(first) => {
                let mut setter = String::with_capacity(local.len() + 3);
                setter.push_str("set");
                setter.extend(first.to_uppercase());
                setter.push_str(chars.as_str());
                setter
            }
            None => "set".to_string(),
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttributeName {
    fn from(raw: &str) -> Self {
        AttributeName::new(raw)
    }
}
