//! Typed parameter schema for content templates.

use serde::{Deserialize, Serialize};

use crate::types::ParamValue;

/// Expected kind of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Any scalar, rendered with its display form.
    Text,
    Integer,
    /// Integer or floating-point.
    Number,
    Flag,
}

impl ParamKind {
    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::Text, _) => true,
            (Self::Integer, ParamValue::Integer(_)) => true,
            (Self::Number, ParamValue::Integer(_) | ParamValue::Number(_)) => true,
            (Self::Flag, ParamValue::Flag(_)) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Flag => "flag",
        }
    }
}

/// One named, typed template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    /// Value used when an optional parameter is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    /// A parameter that falls back to `default` when absent.
    pub fn optional(
        name: impl Into<String>,
        kind: ParamKind,
        default: impl Into<ParamValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: Some(default.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_accepts_any_scalar() {
        assert!(ParamKind::Text.accepts(&ParamValue::Integer(3)));
        assert!(ParamKind::Text.accepts(&ParamValue::Flag(true)));
    }

    #[test]
    fn number_accepts_integers() {
        assert!(ParamKind::Number.accepts(&ParamValue::Integer(3)));
        assert!(ParamKind::Number.accepts(&ParamValue::Number(0.5)));
        assert!(!ParamKind::Number.accepts(&ParamValue::Text("3".into())));
    }

    #[test]
    fn integer_rejects_floats() {
        assert!(!ParamKind::Integer.accepts(&ParamValue::Number(1.5)));
    }
}
