//! Generation requests and their canonical cache keys.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ContentCategory;

/// A scalar request parameter.
///
/// Serializes untagged, so `{"level": 3, "location": "Docks"}` maps directly
/// onto `Integer(3)` and `Text("Docks")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Short name of the value's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flag",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }

    /// Parse a command-line style value: integers, then numbers, then
    /// `true`/`false`, otherwise text.
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            Self::Integer(i)
        } else if let Ok(n) = raw.parse::<f64>() {
            Self::Number(n)
        } else if let Ok(b) = raw.parse::<bool>() {
            Self::Flag(b)
        } else {
            Self::Text(raw.to_string())
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// A request for one piece of generated content.
///
/// Parameters are kept sorted by name, so two requests built with the same
/// pairs in a different order are equal and share a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    category: ContentCategory,
    #[serde(default)]
    parameters: BTreeMap<String, ParamValue>,
}

impl GenerationRequest {
    /// Create a request with no parameters.
    pub fn new(category: ContentCategory) -> Self {
        Self {
            category,
            parameters: BTreeMap::new(),
        }
    }

    /// Create a request from an existing parameter map.
    pub fn with_parameters(
        category: ContentCategory,
        parameters: impl IntoIterator<Item = (String, ParamValue)>,
    ) -> Self {
        Self {
            category,
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Add (or overwrite) a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn category(&self) -> ContentCategory {
        self.category
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    /// Look up one parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Deterministic cache key: `<category>:<k1>:<v1>|<k2>:<v2>...` with
    /// parameters in sorted order.
    ///
    /// `\`, `:` and `|` inside names and values are backslash-escaped so
    /// that distinct parameter sets never produce the same key.
    pub fn cache_key(&self) -> String {
        let pairs: Vec<String> = self
            .parameters
            .iter()
            .map(|(k, v)| format!("{}:{}", escape(k), escape(&v.to_string())))
            .collect();
        format!("{}:{}", self.category, pairs.join("|"))
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
