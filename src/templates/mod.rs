//! Content template registry.
//!
//! Each [`ContentCategory`] maps to a [`ContentTemplate`]: a system
//! instruction, a body with `{name}` placeholders, a typed parameter schema
//! and the fields a well-formed response should carry.
//!
//! Parameters are checked against the schema before anything is
//! substituted, and substitution is a single pass over the template, so a
//! value that itself contains `{...}` is inserted literally and never
//! expanded.

mod defaults;
mod schema;

pub use schema::{ParamKind, ParamSpec};

use std::collections::HashMap;

use tracing::debug;

use crate::types::{ContentCategory, GenerationRequest, ParamValue};
use crate::{GatewayError, Result};

/// Instruction template for one content category.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTemplate {
    pub category: ContentCategory,
    pub system_instruction: String,
    pub body_template: String,
    pub params: Vec<ParamSpec>,
    /// Fields the validator expects in generated content.
    pub required_fields: Vec<String>,
}

/// A template rendered for a specific request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub prompt: String,
}

impl ContentTemplate {
    /// Create a template with no parameters or required fields.
    pub fn new(
        category: ContentCategory,
        system_instruction: impl Into<String>,
        body_template: impl Into<String>,
    ) -> Self {
        Self {
            category,
            system_instruction: system_instruction.into(),
            body_template: body_template.into(),
            params: Vec::new(),
            required_fields: Vec::new(),
        }
    }

    /// Declare a parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Set the fields expected in generated content.
    pub fn required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every placeholder in the body names a declared parameter.
    pub fn check(&self) -> Result<()> {
        for segment in parse(&self.body_template) {
            let Segment::Placeholder(name) = segment else {
                continue;
            };
            if !self.params.iter().any(|p| p.name == name) {
                return Err(GatewayError::Configuration(format!(
                    "{} template uses undeclared placeholder `{{{name}}}`",
                    self.category
                )));
            }
        }
        Ok(())
    }

    /// Validate `request` against the parameter schema and resolve defaults.
    pub fn resolve<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Result<HashMap<&'a str, &'a ParamValue>> {
        let mut values = HashMap::with_capacity(self.params.len());
        for spec in &self.params {
            let value = match (request.get(&spec.name), &spec.default) {
                (Some(v), _) => v,
                (None, Some(default)) => default,
                (None, None) if spec.required => {
                    return Err(self.invalid(format!("missing required parameter `{}`", spec.name)));
                }
                (None, None) => continue,
            };
            if !spec.kind.accepts(value) {
                return Err(self.invalid(format!(
                    "parameter `{}` expects {}, got {}",
                    spec.name,
                    spec.kind.as_str(),
                    value.kind_name()
                )));
            }
            values.insert(spec.name.as_str(), value);
        }

        for name in request.parameters().keys() {
            if !self.params.iter().any(|p| &p.name == name) {
                debug!(category = %self.category, param = %name, "ignoring undeclared parameter");
            }
        }
        Ok(values)
    }

    /// Render the prompt for `request`.
    pub fn render(&self, request: &GenerationRequest) -> Result<RenderedPrompt> {
        let values = self.resolve(request)?;
        let mut prompt = String::with_capacity(self.body_template.len());
        for segment in parse(&self.body_template) {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = values.get(name) {
                        prompt.push_str(&value.to_string());
                    }
                }
            }
        }
        Ok(RenderedPrompt {
            system: self.system_instruction.clone(),
            prompt,
        })
    }

    fn invalid(&self, message: String) -> GatewayError {
        GatewayError::InvalidParameters {
            category: self.category.to_string(),
            message,
        }
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal text and `{identifier}` placeholders.
///
/// Braces that do not enclose an identifier (such as JSON examples in the
/// instruction text) are kept as literal text.
fn parse(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|name| is_identifier(name));
        match placeholder {
            Some(name) => {
                if open > 0 {
                    segments.push(Segment::Literal(&rest[..open]));
                }
                segments.push(Segment::Placeholder(name));
                rest = &after[name.len() + 1..];
            }
            None => {
                segments.push(Segment::Literal(&rest[..=open]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps each category to its template.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<ContentCategory, ContentTemplate>,
}

impl TemplateRegistry {
    /// An empty registry. Every lookup fails until templates are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in template for every category.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for template in defaults::builtin_templates() {
            registry.templates.insert(template.category, template);
        }
        registry
    }

    /// Add or replace the template for its category.
    ///
    /// Fails if the body uses a placeholder the schema does not declare.
    pub fn register(&mut self, template: ContentTemplate) -> Result<()> {
        template.check()?;
        self.templates.insert(template.category, template);
        Ok(())
    }

    /// Template for `category`, or `UnknownCategory` if none is registered.
    pub fn get(&self, category: ContentCategory) -> Result<&ContentTemplate> {
        self.templates
            .get(&category)
            .ok_or_else(|| GatewayError::UnknownCategory(category.to_string()))
    }

    /// Look up and render the template for a request.
    pub fn render(&self, request: &GenerationRequest) -> Result<RenderedPrompt> {
        self.get(request.category())?.render(request)
    }

    /// Check a request against its template without rendering it.
    pub fn validate(&self, request: &GenerationRequest) -> Result<()> {
        self.get(request.category())?.resolve(request).map(|_| ())
    }

    /// Fields expected in generated content for `category`. Empty if the
    /// category has no template.
    pub fn required_fields(&self, category: ContentCategory) -> &[String] {
        self.templates
            .get(&category)
            .map(|t| t.required_fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: ContentCategory) -> bool {
        self.templates.contains_key(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> ContentTemplate {
        ContentTemplate::new(
            ContentCategory::Npc,
            "system",
            "Greet {name} from {town}. Reply as {\"text\": \"...\"}",
        )
        .param(ParamSpec::required("name", ParamKind::Text))
        .param(ParamSpec::optional("town", ParamKind::Text, "Hollowmere"))
    }

    #[test]
    fn render_substitutes_and_applies_defaults() {
        let request = GenerationRequest::new(ContentCategory::Npc).param("name", "Ada");
        let rendered = greeting().render(&request).unwrap();
        assert_eq!(
            rendered.prompt,
            "Greet Ada from Hollowmere. Reply as {\"text\": \"...\"}"
        );
        assert_eq!(rendered.system, "system");
    }

    #[test]
    fn braces_in_values_are_not_expanded() {
        let request = GenerationRequest::new(ContentCategory::Npc)
            .param("name", "{town}")
            .param("town", "Dunmoor");
        let rendered = greeting().render(&request).unwrap();
        assert!(rendered.prompt.starts_with("Greet {town} from Dunmoor."));
    }

    #[test]
    fn check_rejects_undeclared_placeholder() {
        let template = ContentTemplate::new(ContentCategory::Room, "s", "A room in {area}");
        assert!(matches!(template.check(), Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn parse_keeps_non_identifier_braces() {
        let segments = parse("{ \"a\": 1 } {x} {}");
        let placeholders: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(p) => Some(*p),
                Segment::Literal(_) => None,
            })
            .collect();
        assert_eq!(placeholders, vec!["x"]);
    }

    #[test]
    fn builtin_templates_are_consistent() {
        for template in defaults::builtin_templates() {
            template.check().unwrap();
            assert!(!template.required_fields.is_empty());
        }
        let registry = TemplateRegistry::with_defaults();
        for category in ContentCategory::ALL {
            assert!(registry.contains(category));
        }
    }
}
