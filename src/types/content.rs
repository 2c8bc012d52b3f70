//! Content returned by the gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ContentCategory;

/// A piece of game content, generated or substituted.
///
/// `generated` is the only reliable way to tell backend output from static
/// fallback content: the gateway sets it solely on validated backend results
/// (including those later served from the cache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub category: ContentCategory,
    pub generated: bool,
    pub body: Value,
}

impl Content {
    /// Content produced by the generation backend.
    pub fn generated(category: ContentCategory, body: Value) -> Self {
        Self {
            category,
            generated: true,
            body,
        }
    }

    /// Static substitute content.
    pub fn fallback(category: ContentCategory, body: Value) -> Self {
        Self {
            category,
            generated: false,
            body,
        }
    }

    /// Whether this content came from the backend.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Look up a top-level field of the body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}
