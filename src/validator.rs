//! Advisory validation of generated content.

use std::sync::Arc;

use tracing::warn;

use crate::templates::TemplateRegistry;
use crate::types::{Content, ContentCategory};

/// Checks generated content for its category's required fields.
///
/// Validation never rejects: missing fields are logged and the content is
/// returned unchanged.
#[derive(Debug, Clone)]
pub struct Validator {
    templates: Arc<TemplateRegistry>,
}

impl Validator {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self { templates }
    }

    /// Return `content` unchanged, logging any missing required fields.
    pub fn validate(&self, category: ContentCategory, content: Content) -> Content {
        let missing = self.missing_fields(category, &content);
        if !missing.is_empty() {
            warn!(
                category = %category,
                missing = ?missing,
                "generated content is missing required fields"
            );
        }
        content
    }

    /// Required fields absent from the content body.
    pub fn missing_fields<'a>(
        &'a self,
        category: ContentCategory,
        content: &Content,
    ) -> Vec<&'a str> {
        self.templates
            .required_fields(category)
            .iter()
            .filter(|field| content.field(field.as_str()).is_none())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(Arc::new(TemplateRegistry::with_defaults()))
    }

    #[test]
    fn complete_content_has_no_missing_fields() {
        let content = Content::generated(
            ContentCategory::Npc,
            json!({ "name": "Ada", "race": "elf", "personality": "curious" }),
        );
        assert!(validator().missing_fields(ContentCategory::Npc, &content).is_empty());
    }

    #[test]
    fn missing_fields_are_reported_not_stripped() {
        let content = Content::generated(ContentCategory::Npc, json!({ "name": "Ada" }));
        let v = validator();
        assert_eq!(v.missing_fields(ContentCategory::Npc, &content), vec!["race", "personality"]);

        let validated = v.validate(ContentCategory::Npc, content.clone());
        assert_eq!(validated, content);
    }

    #[test]
    fn non_object_body_is_returned_unchanged() {
        let content = Content::generated(ContentCategory::Room, json!("just text"));
        let validated = validator().validate(ContentCategory::Room, content.clone());
        assert_eq!(validated, content);
    }
}
