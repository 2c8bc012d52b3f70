//! Static fallback content.
//!
//! Used whenever generation is disabled, the circuit is open, the queue is
//! full or the backend fails. Every category has exactly one fixed object,
//! so the same category always yields identical content.

use serde_json::{Value, json};

use crate::types::{Content, ContentCategory};

/// Deterministic substitute content per category.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    pub fn new() -> Self {
        Self
    }

    /// Fallback content for a category. Never marked as generated.
    pub fn fallback(&self, category: ContentCategory) -> Content {
        Content::fallback(category, body(category))
    }

    /// Fallback body for a category given by name.
    ///
    /// Unsupported names yield `{"error": "no fallback available"}` rather
    /// than an error.
    pub fn fallback_by_name(&self, name: &str) -> Value {
        match name.parse::<ContentCategory>() {
            Ok(category) => body(category),
            Err(_) => json!({ "error": "no fallback available" }),
        }
    }
}

fn body(category: ContentCategory) -> Value {
    match category {
        ContentCategory::Npc => json!({
            "name": "Mysterious Stranger",
            "race": "human",
            "personality": "reserved and watchful",
            "appearance": "A hooded figure in a travel-worn cloak.",
            "dialogue": [
                "Greetings, traveler.",
                "These roads are not as safe as they once were.",
                "Safe travels."
            ],
            "secret": "Knows more than they let on.",
            "fallback": true
        }),
        ContentCategory::Quest => json!({
            "title": "A Simple Errand",
            "description": "A local needs a package delivered to the next town.",
            "objectives": ["Collect the package", "Deliver it safely"],
            "reward": "25 gold pieces",
            "twist": "None",
            "fallback": true
        }),
        ContentCategory::Monster => json!({
            "name": "Feral Wolf",
            "description": "A gaunt wolf with matted fur and hungry eyes.",
            "abilities": ["Bite", "Pack howl"],
            "weakness": "Fire",
            "health": 20,
            "fallback": true
        }),
        ContentCategory::Item => json!({
            "name": "Worn Dagger",
            "description": "A simple dagger with a chipped blade.",
            "rarity": "common",
            "value": 5,
            "effect": "None",
            "fallback": true
        }),
        ContentCategory::Room => json!({
            "name": "Empty Chamber",
            "description": "A bare stone room. Dust covers the floor.",
            "exits": ["north", "south"],
            "features": ["cracked pillar"],
            "fallback": true
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_deterministic() {
        let provider = FallbackProvider::new();
        for category in ContentCategory::ALL {
            let a = serde_json::to_vec(&provider.fallback(category)).unwrap();
            let b = serde_json::to_vec(&provider.fallback(category)).unwrap();
            assert_eq!(a, b, "fallback for {category} changed between calls");
        }
    }

    #[test]
    fn fallback_is_not_generated() {
        let content = FallbackProvider::new().fallback(ContentCategory::Npc);
        assert!(!content.is_generated());
        assert_eq!(content.category, ContentCategory::Npc);
    }

    #[test]
    fn unknown_name_yields_error_object() {
        let body = FallbackProvider::new().fallback_by_name("spaceship");
        assert_eq!(body, json!({ "error": "no fallback available" }));
    }

    #[test]
    fn known_name_matches_category_fallback() {
        let provider = FallbackProvider::new();
        assert_eq!(
            provider.fallback_by_name("quest"),
            provider.fallback(ContentCategory::Quest).body
        );
    }
}
